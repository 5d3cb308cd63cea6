//! Normalization of untrusted backend output into history entries.
//!
//! Raw output is parsed strictly as report JSON. Anything else — prose,
//! truncated JSON, missing keys — degrades to a wrapper entry that stores
//! the raw text verbatim, so a run NEVER discards output it paid for.
//! Structured visual data is validated item-by-item: sub-items missing
//! required fields are dropped silently, optional fields get fixed
//! defaults, and an all-empty payload is omitted from the entry.

use briefwire_core::types::{
    FundingPoint, HistoryEntry, KpiItem, TimelineMilestone, VisualPayload, iso_now,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::markdown::render_markdown;

/// Title of degraded entries whose backend output was not report JSON.
pub const FALLBACK_TITLE: &str = "Intelligence Brief Update";

/// Summary length (chars) taken from raw output on the degraded path.
const RAW_SUMMARY_CHARS: usize = 180;

const DEFAULT_HORIZONS: [&str; 3] = ["near-term", "mid-term", "long-term"];

/// The report shape a cooperating backend returns. `sources` and `data`
/// stay loose here; they get their own defensive normalization passes.
#[derive(Deserialize)]
struct ParsedReport {
    title: String,
    summary: String,
    markdown: String,
    #[serde(default)]
    sources: Value,
    #[serde(default)]
    data: Value,
}

/// Turn raw backend output into a complete history entry.
///
/// Infallible: the degraded path handles output that is not report JSON.
pub fn normalize(topic_id: &str, raw: &str) -> HistoryEntry {
    let (title, summary, markdown, sources, data) =
        match serde_json::from_str::<ParsedReport>(raw) {
            Ok(report) => (
                report.title,
                report.summary,
                report.markdown,
                normalize_sources(&report.sources),
                normalize_visual(&report.data),
            ),
            Err(err) => {
                tracing::warn!(
                    "⚠️ Output for '{topic_id}' is not report JSON ({err}); storing raw text"
                );
                (
                    FALLBACK_TITLE.to_string(),
                    raw.chars().take(RAW_SUMMARY_CHARS).collect(),
                    raw.to_string(),
                    Vec::new(),
                    None,
                )
            }
        };

    HistoryEntry {
        id: Uuid::new_v4().to_string(),
        topic_id: topic_id.to_string(),
        generated_at: iso_now(),
        title,
        summary,
        content: render_markdown(&markdown),
        sources,
        data,
    }
}

/// Keep only non-empty strings, trimmed. Non-arrays yield no sources.
fn normalize_sources(value: &Value) -> Vec<String> {
    match value.as_array() {
        Some(items) => items
            .iter()
            .filter_map(|item| non_empty(item.as_str()))
            .collect(),
        None => Vec::new(),
    }
}

/// Validate the structured visual block. `None` when the block is absent,
/// not an object, or nothing in it survives validation.
fn normalize_visual(value: &Value) -> Option<VisualPayload> {
    let raw = value.as_object()?;
    let payload = VisualPayload {
        kpis: raw
            .get("kpis")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(validate_kpi).collect())
            .unwrap_or_default(),
        timeline: raw
            .get("timeline")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(index, item)| validate_milestone(item, index))
                    .collect()
            })
            .unwrap_or_default(),
        funding_series: raw
            .get("fundingSeries")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(validate_funding).collect())
            .unwrap_or_default(),
        funding_chart_notes: string_list(raw.get("fundingChartNotes")),
        graphic_cue: non_empty(raw.get("graphicCue").and_then(Value::as_str)),
    };
    if payload.is_empty() { None } else { Some(payload) }
}

/// A KPI needs metric, value label, and rationale; the rest is optional.
fn validate_kpi(item: &Value) -> Option<KpiItem> {
    let metric = non_empty(item.get("metric").and_then(Value::as_str))?;
    let value_label = non_empty(item.get("valueLabel").and_then(Value::as_str))?;
    let why_it_matters = non_empty(item.get("whyItMatters").and_then(Value::as_str))?;
    Some(KpiItem {
        metric,
        value_label,
        why_it_matters,
        numeric_value: finite(item.get("numericValue")),
        unit: item.get("unit").and_then(Value::as_str).map(String::from),
        trend_percentage: finite(item.get("trendPercentage")),
        trend_period: non_empty(item.get("trendPeriod").and_then(Value::as_str)),
    })
}

/// A milestone needs a window and a description. Confidence clamps into
/// [0, 1] (0.5 when absent); a missing horizon defaults by position.
fn validate_milestone(item: &Value, index: usize) -> Option<TimelineMilestone> {
    let window = non_empty(item.get("window").and_then(Value::as_str))?;
    let milestone = non_empty(item.get("milestone").and_then(Value::as_str))?;
    let confidence = finite(item.get("confidence"))
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(0.5);
    let horizon = non_empty(item.get("horizon").and_then(Value::as_str))
        .unwrap_or_else(|| DEFAULT_HORIZONS[index.min(2)].to_string());
    let impact_level = non_empty(item.get("impactLevel").and_then(Value::as_str))
        .unwrap_or_else(|| "—".to_string());
    Some(TimelineMilestone {
        horizon,
        window,
        milestone,
        stakeholders: string_list(item.get("stakeholders")),
        confidence,
        impact_level,
    })
}

/// A funding point needs a period and a finite capital figure.
fn validate_funding(item: &Value) -> Option<FundingPoint> {
    let period = non_empty(item.get("period").and_then(Value::as_str))?;
    let total_capital_usd = finite(item.get("totalCapitalUsd"))?;
    let top_backers = string_list(item.get("topBackers"));
    Some(FundingPoint {
        period,
        total_capital_usd,
        change_percentage: finite(item.get("changePercentage")),
        top_backers: if top_backers.is_empty() {
            None
        } else {
            Some(top_backers)
        },
    })
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

fn finite(value: Option<&Value>) -> Option<f64> {
    value?.as_f64().filter(|n| n.is_finite())
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| non_empty(item.as_str()))
                .collect()
        })
        .unwrap_or_default()
}
