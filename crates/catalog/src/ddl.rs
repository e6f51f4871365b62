// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # DDL cache
//!
//! One TTL-bound entry per qualified table name. An entry older than the TTL
//! is treated as absent and must be refetched.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use crate::qualified::normalize;

/// Default time-to-live for cached DDL text
pub const DEFAULT_DDL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A cached DDL statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlEntry {
    pub qualified_name: String,
    pub ddl_text: String,
    pub fetched_at: SystemTime,
}

impl DdlEntry {
    /// Entries fetched "in the future" (clock skew) count as fresh.
    fn is_expired(&self, ttl: Duration, now: SystemTime) -> bool {
        now.duration_since(self.fetched_at)
            .map(|age| age > ttl)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct DdlCache {
    entries: HashMap<String, DdlEntry>,
    ttl: Duration,
}

impl Default for DdlCache {
    fn default() -> Self {
        Self::new(DEFAULT_DDL_TTL)
    }
}

impl DdlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn insert(&mut self, qualified_name: &str, ddl_text: impl Into<String>) {
        self.insert_at(qualified_name, ddl_text, SystemTime::now());
    }

    /// Insert with an explicit fetch time.
    pub fn insert_at(
        &mut self,
        qualified_name: &str,
        ddl_text: impl Into<String>,
        fetched_at: SystemTime,
    ) {
        let key = normalize(qualified_name);
        self.entries.insert(
            key.clone(),
            DdlEntry {
                qualified_name: key,
                ddl_text: ddl_text.into(),
                fetched_at,
            },
        );
    }

    /// Cached DDL text, or `None` once the entry has expired.
    pub fn get(&self, qualified_name: &str) -> Option<&str> {
        self.entries
            .get(&normalize(qualified_name))
            .filter(|e| !e.is_expired(self.ttl, SystemTime::now()))
            .map(|e| e.ddl_text.as_str())
    }

    /// Whether a fresh entry exists; evicts the entry if it has expired.
    pub fn contains(&mut self, qualified_name: &str) -> bool {
        let key = normalize(qualified_name);
        match self.entries.get(&key) {
            Some(entry) if entry.is_expired(self.ttl, SystemTime::now()) => {
                self.entries.remove(&key);
                false
            }
            Some(_) => true,
            None => false,
        }
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
