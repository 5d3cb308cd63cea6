//! Topic scoping — match topics to the rule that owns them.

use briefwire_core::types::{ScheduleRule, TopicConfig};

/// Topics owned by `rule`. Order of the input set is preserved.
pub fn scoped_topics<'a>(rule: &ScheduleRule, topics: &'a [TopicConfig]) -> Vec<&'a TopicConfig> {
    topics
        .iter()
        .filter(|topic| topic.schedule_id == rule.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use briefwire_core::types::Frequency;

    fn rule(id: &str) -> ScheduleRule {
        ScheduleRule {
            id: id.into(),
            frequency: Frequency::Daily,
            time: "09:00".into(),
            day_of_week: None,
            day_of_month: None,
            timezone: None,
        }
    }

    fn topic(id: &str, schedule_id: &str) -> TopicConfig {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": id,
            "prompt": "p",
            "scheduleId": schedule_id,
        }))
        .unwrap()
    }

    #[test]
    fn scopes_by_owning_rule() {
        let topics = vec![topic("a", "r1"), topic("b", "r2"), topic("c", "r1")];
        let scoped = scoped_topics(&rule("r1"), &topics);
        let ids: Vec<&str> = scoped.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn rule_without_topics_scopes_empty() {
        let topics = vec![topic("a", "r1")];
        assert!(scoped_topics(&rule("r9"), &topics).is_empty());
    }

    #[test]
    fn dangling_reference_is_just_never_scoped() {
        let topics = vec![topic("a", "no-such-rule")];
        assert!(scoped_topics(&rule("r1"), &topics).is_empty());
    }
}
