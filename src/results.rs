//! Registry of command results
//!
//! Commands that produce data register it here so it can be inspected later
//! with `results <index>` or `results <key>`.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;

/// One stored result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    /// Optional user-facing key
    pub key: Option<String>,
    /// Menu path and command that produced it
    pub origin: String,
    pub created_at: DateTime<Local>,
    pub value: Value,
}

/// Ordered result store, addressed by position or key
#[derive(Debug, Clone, Default)]
pub struct ResultRegistry {
    entries: Vec<ResultEntry>,
}

impl ResultRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result and return its index.
    ///
    /// A keyed result replaces any earlier entry with the same key.
    pub fn register(&mut self, key: Option<String>, origin: impl Into<String>, value: Value) -> usize {
        if let Some(key) = &key {
            self.entries.retain(|entry| entry.key.as_ref() != Some(key));
        }

        self.entries.push(ResultEntry {
            key,
            origin: origin.into(),
            created_at: Local::now(),
            value,
        });
        self.entries.len() - 1
    }

    /// Look up by numeric index first, then by key
    pub fn lookup(&self, selector: &str) -> Option<&ResultEntry> {
        match selector.parse::<usize>() {
            Ok(index) => self.entries.get(index),
            Err(_) => self
                .entries
                .iter()
                .find(|entry| entry.key.as_deref() == Some(selector)),
        }
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
