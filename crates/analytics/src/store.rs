use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;

use crate::error::AnalyticsError;
use crate::log::AnalyticsLog;

/// Durable storage for the whole analytics log.
///
/// The store is the single source of truth: callers re-load before every
/// append and every summary and keep no authoritative copy in between.
pub trait LogStore: Send + Sync {
    /// Reads the full log. Never fails: an absent or unreadable log is empty.
    fn load(&self) -> AnalyticsLog;

    /// Replaces the stored log with `log`.
    fn save(&self, log: &AnalyticsLog) -> Result<(), AnalyticsError>;
}

/// Stores the log as a single pretty-printed JSON document.
///
/// Every save rewrites the whole file. Two processes appending at the same
/// time race: the later rewrite silently drops the earlier append. A file
/// that fails to parse is treated as empty and is overwritten by the next
/// save, losing its previous contents.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl LogStore for JsonFileStore {
    fn load(&self) -> AnalyticsLog {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No analytics log yet; starting empty.");
                return AnalyticsLog::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Analytics log unreadable; treating as empty.");
                return AnalyticsLog::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Analytics log is corrupt; treating as empty. It will be overwritten on the next write."
                );
                AnalyticsLog::new()
            }
        }
    }

    fn save(&self, log: &AnalyticsLog) -> Result<(), AnalyticsError> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        // Write beside the target, then rename over it, so readers only ever
        // see a complete document.
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, log)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        tracing::debug!(path = %self.path.display(), events = log.len(), "Analytics log saved.");
        Ok(())
    }
}

/// An in-memory store, for tests and ephemeral servers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    log: Mutex<AnalyticsLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogStore for MemoryStore {
    fn load(&self) -> AnalyticsLog {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn save(&self, log: &AnalyticsLog) -> Result<(), AnalyticsError> {
        *self.log.lock().unwrap_or_else(PoisonError::into_inner) = log.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DetailValue, Interaction, Visit};
    use chrono::NaiveDate;

    fn sample_log() -> AnalyticsLog {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let mut log = AnalyticsLog::new();
        log.append(
            Visit {
                user_id: "user-a".into(),
                timestamp: ts,
                session_id: "sess-1".into(),
            }
            .into(),
        );
        log.append(
            Interaction {
                user_id: "user-a".into(),
                timestamp: ts,
                interaction_type: "stock_selection".into(),
                details: [(
                    "stocks".to_string(),
                    DetailValue::List(vec!["AAPL".into(), "NVDA".into()]),
                )]
                .into(),
            }
            .into(),
        );
        log
    }

    #[test]
    fn missing_file_loads_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("analytics_data.json"));
        assert_eq!(store.load(), AnalyticsLog::new());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("analytics_data.json"));
        let log = sample_log();

        store.save(&log).unwrap();
        assert_eq!(store.load(), log);
    }

    #[test]
    fn corrupt_file_loads_empty_and_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics_data.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().is_empty());

        store.save(&sample_log()).unwrap();
        assert_eq!(store.load().len(), 2);
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/deeper/log.json"));
        store.save(&AnalyticsLog::new()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["visits"], serde_json::json!([]));
        assert_eq!(value["page_views"], serde_json::json!([]));
        assert_eq!(value["interactions"], serde_json::json!([]));
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        store.save(&sample_log()).unwrap();
        assert_eq!(store.load(), sample_log());
    }
}
