//! Response-shape probing for heterogeneous backend payloads.
//!
//! Gateways disagree on where generated text lives. Each probe below knows
//! one shape; [`extract_content`] walks them in order and takes the first
//! hit. Order matters: flat fields win over list shapes so a payload that
//! carries both resolves deterministically.

use serde_json::Value;

type Probe = fn(&Value) -> Option<String>;

const PROBES: &[Probe] = &[
    bare_string,
    output_field,
    response_field,
    outputs_list,
    choices_list,
    content_blocks,
];

/// Pull generated text out of a backend response, whatever its shape.
///
/// Returns an empty string when no probe matches; callers treat that as
/// "no usable output" and fall back.
pub fn extract_content(response: &Value) -> String {
    PROBES
        .iter()
        .find_map(|probe| probe(response))
        .unwrap_or_default()
}

/// The whole response is a plain string.
fn bare_string(response: &Value) -> Option<String> {
    response.as_str().map(String::from)
}

/// `{ "output": "…" }`
fn output_field(response: &Value) -> Option<String> {
    response.get("output")?.as_str().map(String::from)
}

/// `{ "response": "…" }`
fn response_field(response: &Value) -> Option<String> {
    response.get("response")?.as_str().map(String::from)
}

/// `{ "outputs": ["…", { "content": "…" }, …] }` — usable items joined
/// with newlines. Falls through when no item carries text.
fn outputs_list(response: &Value) -> Option<String> {
    let outputs = response.get("outputs")?.as_array()?;
    let parts: Vec<&str> = outputs
        .iter()
        .filter_map(|item| {
            item.as_str()
                .or_else(|| item.get("content")?.as_str())
                .filter(|text| !text.is_empty())
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// OpenAI-style `{ "choices": [{ "text": … }] }` or
/// `{ "choices": [{ "message": { "content": … } }] }`.
fn choices_list(response: &Value) -> Option<String> {
    let choices = response.get("choices")?.as_array()?;
    choices.iter().find_map(|choice| {
        choice
            .get("text")
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .or_else(|| {
                choice
                    .get("message")?
                    .get("content")?
                    .as_str()
                    .filter(|text| !text.trim().is_empty())
            })
            .map(String::from)
    })
}

/// Anthropic-style `{ "data": [{ "content": [{ "text": … }] }] }`.
fn content_blocks(response: &Value) -> Option<String> {
    let items = response.get("data")?.as_array()?;
    items.iter().find_map(|item| {
        let blocks = item.get("content")?.as_array()?;
        blocks.iter().find_map(|block| {
            block
                .get("text")?
                .as_str()
                .filter(|text| !text.trim().is_empty())
                .map(String::from)
        })
    })
}
