//! Deterministic placeholder output for offline and failed generations.
//!
//! The payload is a fully-formed report in the same JSON shape a live
//! backend returns, so the rest of the pipeline (parse, visual-data
//! normalization, markdown rendering) runs identically with or without a
//! configured endpoint. Same topic in, same bytes out.

use briefwire_core::types::TopicConfig;
use serde_json::json;

/// Suffix appended to the topic title so placeholder entries are
/// recognizable in the history log.
pub const PLACEHOLDER_SUFFIX: &str = " — Mock Insight";

/// Build the placeholder report for a topic.
pub fn placeholder_content(topic: &TopicConfig) -> String {
    let title = format!("{}{}", topic.title, PLACEHOLDER_SUFFIX);
    let markdown = format!(
        "## TL;DR Signal Snapshot\n\
         - Placeholder coverage for **{topic}** until a generation backend is configured.\n\
         - Configure `[generation].endpoint` to replace this entry with live analysis.\n\
         - Structured KPI, timeline, and funding data below use fixed sample values.\n\n\
         Graphic Cue: radial gauge showing pipeline readiness at 50%.\n\n\
         ## Milestone Timeline\n\
         A live report lays out expected developments across near-, mid-, and \
         long-term horizons. This placeholder carries a single sample milestone.\n\n\
         ## Funding Flow Dashboard\n\
         Capital-flow commentary appears here once live generation is enabled.\n\n\
         Chart Notes\n\
         - Sample series only; connect the backend to chart real funding trends.\n",
        topic = topic.title
    );
    json!({
        "title": title,
        "summary": format!(
            "Offline placeholder for {}. Configure a generation backend to receive live intelligence.",
            topic.title
        ),
        "markdown": markdown,
        "sources": ["https://example.com/placeholder-source"],
        "data": {
            "kpis": [
                {
                    "metric": "Tracked Signals",
                    "valueLabel": "0 live",
                    "numericValue": 0,
                    "unit": "signals",
                    "trendPercentage": 0,
                    "trendPeriod": "QoQ",
                    "whyItMatters": "Counts stay at zero until a backend supplies live data.",
                }
            ],
            "timeline": [
                {
                    "horizon": "near-term",
                    "window": "Next 12 months",
                    "milestone": "First live generation replaces placeholder entries.",
                    "stakeholders": ["Operators"],
                    "confidence": 0.5,
                    "impactLevel": "Medium",
                }
            ],
            "fundingSeries": [
                {
                    "period": "2026 Q1",
                    "totalCapitalUsd": 0,
                    "changePercentage": 0,
                    "topBackers": ["None yet"],
                }
            ],
            "fundingChartNotes": ["Sample series; values are fixed at zero."],
            "graphicCue": "radial gauge showing pipeline readiness at 50%",
        },
    })
    .to_string()
}
