//! The refresh runner — one evaluation from rule matching to history append.
//!
//! A run loads the three input files fresh, finds the due rules, and
//! refreshes each rule's scoped topics: generate through the fallback
//! chain (or the bulk endpoint when enabled), normalize, append. Failures
//! are contained per rule — one rule erroring never stops the others, and
//! the report carries an outcome row for every rule that had work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use briefwire_core::BriefwireConfig;
use briefwire_core::error::{BriefwireError, Result};
use briefwire_core::types::{ScheduleRule, TopicConfig, iso_now};
use briefwire_generate::{BackendConfig, FallbackChain, GenerationClient, generate_batch, normalize};
use briefwire_history::HistoryStore;

use crate::evaluator::due_rules;
use crate::inputs;
use crate::resolver::scoped_topics;

/// Terminal status of one rule's refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// Outcome row for one due rule that had topics scoped to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOutcome {
    pub schedule_id: String,
    pub topics_count: usize,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything one evaluation produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// When the evaluation ran (ISO-8601).
    pub timestamp: String,
    /// Rules due at the evaluated instant, counting ones that were skipped
    /// for having no topics.
    pub due_count: usize,
    pub outcomes: Vec<ScheduleOutcome>,
}

/// Drives the refresh pipeline against one configuration.
pub struct RefreshRunner {
    config: BriefwireConfig,
    chain: FallbackChain,
    client: GenerationClient,
    store: HistoryStore,
    bulk_enabled: bool,
    max_batch_size: usize,
}

impl RefreshRunner {
    pub fn new(config: BriefwireConfig) -> Self {
        let backend = BackendConfig::from_config(&config);
        // Bulk mode needs a live endpoint; offline runs always take the
        // per-topic chain so the placeholder can answer.
        let bulk_enabled = config.bulk.enabled && !backend.is_offline();
        let store = HistoryStore::new(&config.history_dir());
        let chain = FallbackChain::for_backend(backend.clone());
        let client = GenerationClient::new(backend);
        Self {
            max_batch_size: config.bulk.max_batch_size,
            config,
            chain,
            client,
            store,
            bulk_enabled,
        }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Evaluate at the current instant.
    pub async fn run_now(&self) -> Result<RunReport> {
        self.run_at(Utc::now()).await
    }

    /// Evaluate at an explicit instant and refresh whatever is due.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport> {
        let schedules = inputs::load_schedules(&self.config.schedules_path())?;
        let topics = inputs::load_topics(&self.config.topics_path())?;
        let instructions = inputs::load_instructions(&self.config.instructions_path())?;

        let due = due_rules(&schedules, now);
        let timestamp = iso_now();

        if due.is_empty() {
            tracing::info!("📅 No schedules due at {}", now.format("%Y-%m-%d %H:%M UTC"));
            return Ok(RunReport {
                timestamp,
                due_count: 0,
                outcomes: Vec::new(),
            });
        }

        tracing::info!("🔔 {} schedule(s) due", due.len());
        let mut outcomes = Vec::new();

        for rule in &due {
            let scoped = scoped_topics(rule, &topics);
            if scoped.is_empty() {
                tracing::warn!(
                    "⚠️ Rule '{}' is due but has no topics scoped to it — skipping",
                    rule.id
                );
                continue;
            }

            let topics_count = scoped.len();
            match self.refresh_rule(rule, &scoped, &instructions).await {
                Ok(()) => outcomes.push(ScheduleOutcome {
                    schedule_id: rule.id.clone(),
                    topics_count,
                    status: OutcomeStatus::Success,
                    error: None,
                }),
                Err(e) => {
                    tracing::warn!("⚠️ Rule '{}' failed: {e}", rule.id);
                    outcomes.push(ScheduleOutcome {
                        schedule_id: rule.id.clone(),
                        topics_count,
                        status: OutcomeStatus::Error,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(RunReport {
            timestamp,
            due_count: due.len(),
            outcomes,
        })
    }

    /// Refresh every configured topic regardless of schedule. Returns the
    /// number of topics refreshed; per-topic failures are logged and skipped.
    pub async fn run_all(&self) -> Result<usize> {
        let topics = inputs::load_topics(&self.config.topics_path())?;
        let instructions = inputs::load_instructions(&self.config.instructions_path())?;

        if topics.is_empty() {
            tracing::info!("📅 No topics configured");
            return Ok(0);
        }

        let mut refreshed = 0;
        for topic in &topics {
            match self.refresh_topic(topic, &instructions).await {
                Ok(()) => refreshed += 1,
                Err(e) => tracing::warn!("⚠️ Skipping '{}': {e}", topic.title),
            }
        }
        Ok(refreshed)
    }

    /// Refresh a single topic by id.
    pub async fn run_topic(&self, topic_id: &str) -> Result<()> {
        let topics = inputs::load_topics(&self.config.topics_path())?;
        let instructions = inputs::load_instructions(&self.config.instructions_path())?;
        let topic = topics
            .iter()
            .find(|t| t.id == topic_id)
            .ok_or_else(|| BriefwireError::Config(format!("Unknown topic '{topic_id}'")))?;
        self.refresh_topic(topic, &instructions).await
    }

    /// Refresh all of one rule's topics. Sequential; the first failing
    /// topic aborts the rule and becomes its error outcome.
    async fn refresh_rule(
        &self,
        rule: &ScheduleRule,
        topics: &[&TopicConfig],
        instructions: &str,
    ) -> Result<()> {
        tracing::info!(
            "📰 Refreshing {} topic(s) for rule '{}' ({} {})",
            topics.len(),
            rule.id,
            rule.frequency,
            rule.time
        );

        if self.bulk_enabled {
            let owned: Vec<TopicConfig> = topics.iter().map(|t| (*t).clone()).collect();
            let outputs =
                generate_batch(&self.client, &owned, instructions, self.max_batch_size).await;
            for topic in topics {
                match outputs.get(&topic.id) {
                    Some(raw) => {
                        let entry = normalize(&topic.id, raw);
                        self.store
                            .append(&topic.id, entry)
                            .map_err(BriefwireError::History)?;
                        tracing::info!("✅ Saved update for '{}'", topic.title);
                    }
                    None => {
                        tracing::warn!("⚠️ Bulk run produced nothing for '{}'", topic.title)
                    }
                }
            }
            return Ok(());
        }

        for topic in topics {
            self.refresh_topic(topic, instructions).await?;
        }
        Ok(())
    }

    /// Generate → normalize → append for one topic.
    async fn refresh_topic(&self, topic: &TopicConfig, instructions: &str) -> Result<()> {
        tracing::info!("📰 Refreshing '{}'", topic.title);
        let raw = self.chain.generate(topic, instructions).await?;
        let entry = normalize(&topic.id, &raw);
        self.store
            .append(&topic.id, entry)
            .map_err(BriefwireError::History)?;
        tracing::info!("✅ Saved update for '{}'", topic.title);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn setup(name: &str) -> BriefwireConfig {
        let dir = std::env::temp_dir().join(name);
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("topics.json"),
            r#"{
                "topics": [
                    {"id": "t1", "title": "Topic One", "prompt": "p1", "scheduleId": "r1"},
                    {"id": "t2", "title": "Topic Two", "prompt": "p2", "scheduleId": "r1"},
                    {"id": "t3", "title": "Topic Three", "prompt": "p3", "scheduleId": "r2"}
                ]
            }"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("schedules.json"),
            r#"{
                "schedules": [
                    {"id": "r1", "frequency": "daily", "time": "09:30"},
                    {"id": "r2", "frequency": "weekly", "time": "08:00", "dayOfWeek": 1}
                ]
            }"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("instructions.md"),
            "---\nversion: 1\n---\nAlways cite sources.\n",
        )
        .unwrap();
        BriefwireConfig {
            data_dir: dir.to_string_lossy().into_owned(),
            ..BriefwireConfig::default()
        }
    }

    fn cleanup(config: &BriefwireConfig) {
        std::fs::remove_dir_all(config.resolve_data_dir()).ok();
    }

    #[tokio::test]
    async fn due_rule_refreshes_its_scoped_topics() {
        let config = setup("briefwire-test-runner-due");
        let runner = RefreshRunner::new(config.clone());

        let now = Utc.with_ymd_and_hms(2026, 3, 3, 9, 30, 0).unwrap();
        let report = runner.run_at(now).await.unwrap();

        assert_eq!(report.due_count, 1);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].schedule_id, "r1");
        assert_eq!(report.outcomes[0].topics_count, 2);
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Success);
        assert!(report.outcomes[0].error.is_none());

        assert_eq!(runner.store().count("t1"), 1);
        assert_eq!(runner.store().count("t2"), 1);
        assert_eq!(runner.store().count("t3"), 0);

        let entry = runner.store().latest("t1").unwrap();
        assert!(entry.title.ends_with("— Mock Insight"));
        assert!(entry.data.is_some());
        cleanup(&config);
    }

    #[tokio::test]
    async fn off_minute_evaluation_refreshes_nothing() {
        let config = setup("briefwire-test-runner-offminute");
        let runner = RefreshRunner::new(config.clone());

        let now = Utc.with_ymd_and_hms(2026, 3, 3, 9, 31, 0).unwrap();
        let report = runner.run_at(now).await.unwrap();

        assert_eq!(report.due_count, 0);
        assert!(report.outcomes.is_empty());
        assert_eq!(runner.store().count("t1"), 0);
        cleanup(&config);
    }

    #[tokio::test]
    async fn unscoped_due_rule_gets_no_outcome_row() {
        let config = setup("briefwire-test-runner-unscoped");
        let runner = RefreshRunner::new(config.clone());

        // 2026-03-03 09:30 makes r1 due; strip its topics first
        let dir = config.resolve_data_dir();
        std::fs::write(
            dir.join("topics.json"),
            r#"{"topics": [{"id": "t3", "title": "Topic Three", "prompt": "p3", "scheduleId": "r2"}]}"#,
        )
        .unwrap();

        let now = Utc.with_ymd_and_hms(2026, 3, 3, 9, 30, 0).unwrap();
        let report = runner.run_at(now).await.unwrap();

        assert_eq!(report.due_count, 1);
        assert!(report.outcomes.is_empty());
        cleanup(&config);
    }

    #[tokio::test]
    async fn run_all_ignores_schedules() {
        let config = setup("briefwire-test-runner-all");
        let runner = RefreshRunner::new(config.clone());

        let refreshed = runner.run_all().await.unwrap();
        assert_eq!(refreshed, 3);
        for id in ["t1", "t2", "t3"] {
            assert_eq!(runner.store().count(id), 1);
        }

        // A second pass prepends, never overwrites
        runner.run_all().await.unwrap();
        assert_eq!(runner.store().count("t1"), 2);
        cleanup(&config);
    }

    #[tokio::test]
    async fn run_topic_targets_one_id() {
        let config = setup("briefwire-test-runner-single");
        let runner = RefreshRunner::new(config.clone());

        runner.run_topic("t2").await.unwrap();
        assert_eq!(runner.store().count("t1"), 0);
        assert_eq!(runner.store().count("t2"), 1);

        let err = runner.run_topic("nope").await.unwrap_err();
        assert!(err.to_string().contains("Unknown topic"));
        cleanup(&config);
    }

    #[tokio::test]
    async fn missing_schedule_file_fails_the_run() {
        let config = setup("briefwire-test-runner-noschedules");
        std::fs::remove_file(config.schedules_path()).unwrap();
        let runner = RefreshRunner::new(config.clone());

        let now = Utc.with_ymd_and_hms(2026, 3, 3, 9, 30, 0).unwrap();
        assert!(runner.run_at(now).await.is_err());
        cleanup(&config);
    }

    #[test]
    fn outcome_serializes_camel_case() {
        let outcome = ScheduleOutcome {
            schedule_id: "r1".into(),
            topics_count: 2,
            status: OutcomeStatus::Success,
            error: None,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["scheduleId"], "r1");
        assert_eq!(value["topicsCount"], 2);
        assert_eq!(value["status"], "success");
        assert!(value.get("error").is_none());
    }
}
