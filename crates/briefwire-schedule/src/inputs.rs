//! Loading of the externally authored inputs: topics.json, schedules.json,
//! and instructions.md.
//!
//! These files are owned by operators, not by the pipeline — Briefwire only
//! reads them. A missing topic set means "nothing to refresh" and loads as
//! empty; a missing rule set or instructions file is a configuration error
//! and fails the run.

use std::path::Path;

use serde::Deserialize;

use briefwire_core::error::{BriefwireError, Result};
use briefwire_core::types::{ScheduleRule, TopicConfig};

#[derive(Deserialize)]
struct TopicsFile {
    #[serde(default)]
    topics: Vec<TopicConfig>,
}

#[derive(Deserialize)]
struct SchedulesFile {
    #[serde(default)]
    schedules: Vec<ScheduleRule>,
}

/// Load the topic set. Missing file loads as an empty set.
pub fn load_topics(path: &Path) -> Result<Vec<TopicConfig>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| BriefwireError::Config(format!("Failed to read {}: {e}", path.display())))?;
    let file: TopicsFile = serde_json::from_str(&raw)
        .map_err(|e| BriefwireError::Config(format!("Failed to parse {}: {e}", path.display())))?;
    Ok(file.topics)
}

/// Load the rule set. Unlike topics, a missing file is an error — running
/// a scheduler with no schedule file is a deployment mistake worth surfacing.
pub fn load_schedules(path: &Path) -> Result<Vec<ScheduleRule>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| BriefwireError::Config(format!("Failed to read {}: {e}", path.display())))?;
    let file: SchedulesFile = serde_json::from_str(&raw)
        .map_err(|e| BriefwireError::Config(format!("Failed to parse {}: {e}", path.display())))?;
    Ok(file.schedules)
}

/// Load the shared instructions, with any leading front-matter block
/// stripped and the result trimmed.
pub fn load_instructions(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| BriefwireError::Config(format!("Failed to read {}: {e}", path.display())))?;
    Ok(strip_front_matter(&raw).trim().to_string())
}

/// Strip a leading `---` front-matter block. The body passes through
/// unchanged when the file does not open with a complete block.
fn strip_front_matter(text: &str) -> &str {
    if !(text.starts_with("---\n") || text.starts_with("---\r\n")) {
        return text;
    }
    let mut offset = 0;
    for (i, line) in text.split_inclusive('\n').enumerate() {
        offset += line.len();
        if i == 0 {
            continue;
        }
        if line.trim_end() == "---" {
            return &text[offset..];
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn missing_topics_file_loads_empty() {
        let dir = temp_dir("briefwire-test-inputs-topics-missing");
        let topics = load_topics(&dir.join("topics.json")).unwrap();
        assert!(topics.is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn topics_load_from_wrapper_object() {
        let dir = temp_dir("briefwire-test-inputs-topics");
        let path = dir.join("topics.json");
        std::fs::write(
            &path,
            r#"{"topics": [{"id": "t1", "title": "T", "prompt": "p", "scheduleId": "r1"}]}"#,
        )
        .unwrap();
        let topics = load_topics(&path).unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].schedule_id, "r1");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_topics_file_is_an_error() {
        let dir = temp_dir("briefwire-test-inputs-topics-bad");
        let path = dir.join("topics.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_topics(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_schedules_file_is_an_error() {
        let dir = temp_dir("briefwire-test-inputs-schedules-missing");
        assert!(load_schedules(&dir.join("schedules.json")).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn schedules_load_from_wrapper_object() {
        let dir = temp_dir("briefwire-test-inputs-schedules");
        let path = dir.join("schedules.json");
        std::fs::write(
            &path,
            r#"{"schedules": [{"id": "r1", "frequency": "weekly", "time": "08:00", "dayOfWeek": 1}]}"#,
        )
        .unwrap();
        let schedules = load_schedules(&path).unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].day_of_week, Some(1));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn instructions_strip_front_matter_and_trim() {
        let dir = temp_dir("briefwire-test-inputs-instructions");
        let path = dir.join("instructions.md");
        std::fs::write(
            &path,
            "---\ntitle: Shared\nversion: 2\n---\n\nAlways cite sources.\n",
        )
        .unwrap();
        assert_eq!(load_instructions(&path).unwrap(), "Always cite sources.");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn instructions_without_front_matter_pass_through() {
        let dir = temp_dir("briefwire-test-inputs-instructions-plain");
        let path = dir.join("instructions.md");
        std::fs::write(&path, "Be concise.\n").unwrap();
        assert_eq!(load_instructions(&path).unwrap(), "Be concise.");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unclosed_front_matter_is_kept_as_content() {
        let dir = temp_dir("briefwire-test-inputs-instructions-unclosed");
        let path = dir.join("instructions.md");
        std::fs::write(&path, "---\ntitle: Broken\n\nBody text.\n").unwrap();
        let loaded = load_instructions(&path).unwrap();
        assert!(loaded.starts_with("---"));
        assert!(loaded.contains("Body text."));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_instructions_file_is_an_error() {
        let dir = temp_dir("briefwire-test-inputs-instructions-missing");
        assert!(load_instructions(&dir.join("instructions.md")).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
