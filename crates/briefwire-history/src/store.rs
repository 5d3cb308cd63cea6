//! File-based history store — one JSON log per topic.
//! Entries saved newest-first as pretty-printed JSON — human-readable,
//! git-friendly. Entries are only ever prepended, never edited or removed.

use briefwire_core::types::HistoryEntry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Per-topic append-only log store.
pub struct HistoryStore {
    dir: PathBuf,
    /// Per-topic append locks. The append cycle is read-prepend-write on the
    /// whole file, so two overlapping appends to one topic would lose an
    /// entry without this.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl HistoryStore {
    /// Create a history store rooted at the given directory.
    pub fn new(dir: &Path) -> Self {
        std::fs::create_dir_all(dir).ok();
        Self {
            dir: dir.to_path_buf(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn topic_file(&self, topic_id: &str) -> PathBuf {
        self.dir.join(format!("{topic_id}.json"))
    }

    fn topic_lock(&self, topic_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(topic_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Read a topic's log, newest first (descending `generatedAt`).
    /// Missing log reads as empty; an unreadable or corrupt log warns and
    /// reads as empty rather than failing the caller.
    pub fn read(&self, topic_id: &str) -> Vec<HistoryEntry> {
        let mut entries = self.load_raw(topic_id);
        entries.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        entries
    }

    /// Prepend an entry to a topic's log and persist the whole list.
    pub fn append(&self, topic_id: &str, entry: HistoryEntry) -> Result<(), String> {
        let lock = self.topic_lock(topic_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let existing = self.read(topic_id);
        let mut updated = Vec::with_capacity(existing.len() + 1);
        updated.push(entry);
        updated.extend(existing);

        let file = self.topic_file(topic_id);
        let json =
            serde_json::to_string_pretty(&updated).map_err(|e| format!("Serialize error: {e}"))?;
        std::fs::write(&file, &json).map_err(|e| format!("Write error: {e}"))?;
        tracing::debug!("📝 Saved {} entries to {}", updated.len(), file.display());
        Ok(())
    }

    /// Most recent entry for a topic, if any.
    pub fn latest(&self, topic_id: &str) -> Option<HistoryEntry> {
        self.read(topic_id).into_iter().next()
    }

    /// Number of entries in a topic's log.
    pub fn count(&self, topic_id: &str) -> usize {
        self.load_raw(topic_id).len()
    }

    fn load_raw(&self, topic_id: &str) -> Vec<HistoryEntry> {
        let file = self.topic_file(topic_id);
        if !file.exists() {
            return Vec::new();
        }
        match std::fs::read_to_string(&file) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("⚠️ Failed to parse {}: {e}", file.display());
                Vec::new()
            }),
            Err(e) => {
                tracing::warn!("⚠️ Failed to read {}: {e}", file.display());
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(topic_id: &str, generated_at: &str, title: &str) -> HistoryEntry {
        HistoryEntry {
            id: format!("{topic_id}-{generated_at}"),
            topic_id: topic_id.to_string(),
            generated_at: generated_at.to_string(),
            title: title.to_string(),
            summary: "summary".into(),
            content: "<p>body</p>".into(),
            sources: vec![],
            data: None,
        }
    }

    #[test]
    fn test_read_missing_is_empty() {
        let dir = std::env::temp_dir().join("briefwire-test-hist-missing");
        let store = HistoryStore::new(&dir);
        assert!(store.read("ghost").is_empty());
        assert_eq!(store.count("ghost"), 0);
        assert!(store.latest("ghost").is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_append_then_read_newest_first() {
        let dir = std::env::temp_dir().join("briefwire-test-hist-order");
        std::fs::remove_dir_all(&dir).ok();
        let store = HistoryStore::new(&dir);

        let e1 = make_entry("t1", "2026-03-01T09:00:00.000Z", "first");
        let e2 = make_entry("t1", "2026-03-02T09:00:00.000Z", "second");
        store.append("t1", e1).unwrap();
        store.append("t1", e2).unwrap();

        let entries = store.read("t1");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "second");
        assert_eq!(entries[1].title, "first");
        assert_eq!(store.latest("t1").unwrap().title, "second");
        assert_eq!(store.count("t1"), 2);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_sorts_scrambled_file() {
        let dir = std::env::temp_dir().join("briefwire-test-hist-sort");
        std::fs::remove_dir_all(&dir).ok();
        let store = HistoryStore::new(&dir);

        // Oldest-first on disk; read must still return newest-first.
        let scrambled = vec![
            make_entry("t1", "2026-01-01T08:00:00.000Z", "old"),
            make_entry("t1", "2026-02-01T08:00:00.000Z", "new"),
        ];
        let json = serde_json::to_string_pretty(&scrambled).unwrap();
        std::fs::write(dir.join("t1.json"), json).unwrap();

        let entries = store.read("t1");
        assert_eq!(entries[0].title, "new");
        assert_eq!(entries[1].title, "old");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_log_reads_empty() {
        let dir = std::env::temp_dir().join("briefwire-test-hist-corrupt");
        std::fs::remove_dir_all(&dir).ok();
        let store = HistoryStore::new(&dir);

        std::fs::write(dir.join("t1.json"), "{not json").unwrap();
        assert!(store.read("t1").is_empty());

        // Appending still works — the corrupt file is replaced.
        store
            .append("t1", make_entry("t1", "2026-03-01T09:00:00.000Z", "fresh"))
            .unwrap();
        assert_eq!(store.count("t1"), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_topics_are_isolated() {
        let dir = std::env::temp_dir().join("briefwire-test-hist-isolated");
        std::fs::remove_dir_all(&dir).ok();
        let store = HistoryStore::new(&dir);

        store
            .append("a", make_entry("a", "2026-03-01T09:00:00.000Z", "for-a"))
            .unwrap();
        assert_eq!(store.count("a"), 1);
        assert_eq!(store.count("b"), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let dir = std::env::temp_dir().join("briefwire-test-hist-concurrent");
        std::fs::remove_dir_all(&dir).ok();
        let store = Arc::new(HistoryStore::new(&dir));

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                let ts = format!("2026-03-01T09:00:0{i}.000Z");
                store
                    .append("t1", make_entry("t1", &ts, &format!("entry-{i}")))
                    .unwrap();
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.count("t1"), 8);
        std::fs::remove_dir_all(&dir).ok();
    }
}
