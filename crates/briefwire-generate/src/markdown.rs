//! Markdown → HTML rendering for history entry bodies.
//!
//! Backend output is untrusted, so raw HTML in the markdown is re-emitted
//! as escaped text instead of passing through to the rendered body. Inert
//! markup may look ugly in a report; script injection is worse.

/// Render markdown to HTML with raw HTML neutralized.
pub fn render_markdown(markdown: &str) -> String {
    use pulldown_cmark::{Event, Options, Parser, html};

    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        // Downgrade raw HTML to text; push_html escapes text events.
        Event::Html(raw) => Event::Text(raw),
        Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_and_lists() {
        let html = render_markdown("## Snapshot\n\n- first\n- second\n");
        assert!(html.contains("<h2>Snapshot</h2>"));
        assert!(html.contains("<li>first</li>"));
        assert!(html.contains("<li>second</li>"));
    }

    #[test]
    fn renders_tables() {
        let html = render_markdown("| a | b |\n| - | - |\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn escapes_block_html() {
        let html = render_markdown("<script>alert(1)</script>\n\ntext\n");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn escapes_inline_html() {
        let html = render_markdown("before <b onclick=\"x()\">bold</b> after\n");
        assert!(!html.contains("<b onclick"));
        assert!(html.contains("&lt;b onclick="));
    }

    #[test]
    fn plain_text_becomes_paragraph() {
        assert_eq!(render_markdown("just text"), "<p>just text</p>\n");
    }
}
