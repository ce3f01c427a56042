//! Account-wide encoder status cache.
//!
//! The cache holds the most recent successful monitor-list fetch and is only
//! ever replaced wholesale. Staleness is judged per record: one encoder with
//! a missing or old heartbeat invalidates the whole snapshot.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::models::EncoderStatus;

/// Seconds after a record's `last_update` at which the snapshot is no longer
/// trusted without a refresh.
pub const STALENESS_WINDOW_SECS: i64 = 20;

#[derive(Debug, Default)]
pub struct StatusCache {
    entries: HashMap<String, EncoderStatus>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the cache is empty, or any record lacks a heartbeat, or any
    /// record's heartbeat is older than the staleness window.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        if self.entries.is_empty() {
            return true;
        }

        self.entries.values().any(|record| match record.last_update {
            Some(last_update) => last_update + Duration::seconds(STALENESS_WINDOW_SECS) < now,
            None => true,
        })
    }

    /// Replace the snapshot wholesale with the records of a successful fetch.
    /// Records without an identifier can't exist; the fetch keys by id.
    pub fn replace(&mut self, records: Vec<EncoderStatus>) {
        self.entries = records
            .into_iter()
            .map(|record| (record.encoder_id.clone(), record))
            .collect();
    }

    pub fn get(&self, encoder_id: &str) -> Option<&EncoderStatus> {
        self.entries.get(encoder_id)
    }

    pub fn entries(&self) -> &HashMap<String, EncoderStatus> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
