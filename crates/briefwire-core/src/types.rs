//! Shared data model — schedule rules, topics, and normalized history entries.
//!
//! Field names serialize in camelCase so the JSON inputs (topics.json,
//! schedules.json) and the per-topic history logs keep their established
//! on-disk shape.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Recurrence kind of a schedule rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
        }
    }
}

/// A recurrence rule. Fires when the local clock matches `time` exactly
/// (minute resolution), subject to the day field matching its kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRule {
    pub id: String,
    pub frequency: Frequency,
    /// Time of day, "HH:MM" 24h.
    pub time: String,
    /// 0–6, Sunday = 0. Weekly rules only; Monday (1) when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    /// 1–31. Monthly rules only; 1 when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,
    /// IANA timezone name. UTC when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl ScheduleRule {
    /// Parse the configured "HH:MM" into (hour, minute).
    /// Returns None when malformed or out of range; such a rule is never due.
    pub fn time_parts(&self) -> Option<(u32, u32)> {
        let (h, m) = self.time.split_once(':')?;
        let hour: u32 = h.trim().parse().ok()?;
        let minute: u32 = m.trim().parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        Some((hour, minute))
    }
}

/// A topic assigned to a schedule rule. Externally authored, read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicConfig {
    pub id: String,
    pub title: String,
    pub prompt: String,
    /// Optional summary-prompt override for downstream readers. The refresh
    /// pipeline carries it through but does not consume it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_prompt: Option<String>,
    /// Owning rule id. Need not resolve — a dangling reference just means the
    /// topic is never scoped into a run.
    pub schedule_id: String,
}

/// One normalized generation result, immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub topic_id: String,
    /// ISO-8601 instant with millisecond precision and Z suffix. Entries sort
    /// newest-first by plain string comparison of this field.
    pub generated_at: String,
    pub title: String,
    pub summary: String,
    /// Rendered, HTML-safe body.
    pub content: String,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<VisualPayload>,
}

/// Optional structured visuals attached to a history entry. Serialized as
/// `data`; omitted entirely when every sub-list validated empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualPayload {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kpis: Vec<KpiItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timeline: Vec<TimelineMilestone>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub funding_series: Vec<FundingPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub funding_chart_notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graphic_cue: Option<String>,
}

impl VisualPayload {
    /// True when every sub-list is empty and no graphic cue survived.
    pub fn is_empty(&self) -> bool {
        self.kpis.is_empty()
            && self.timeline.is_empty()
            && self.funding_series.is_empty()
            && self.funding_chart_notes.is_empty()
            && self.graphic_cue.is_none()
    }
}

/// A key-performance-indicator card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiItem {
    pub metric: String,
    pub value_label: String,
    pub why_it_matters: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_period: Option<String>,
}

/// A milestone on the near/mid/long-term timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineMilestone {
    pub horizon: String,
    pub window: String,
    pub milestone: String,
    #[serde(default)]
    pub stakeholders: Vec<String>,
    /// Always within [0, 1] after normalization.
    pub confidence: f64,
    pub impact_level: String,
}

/// One point in the funding series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingPoint {
    pub period: String,
    pub total_capital_usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_backers: Option<Vec<String>>,
}

/// A role-tagged chat message for the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Current instant formatted the way history entries store it
/// ("2026-03-01T09:00:00.000Z").
pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
