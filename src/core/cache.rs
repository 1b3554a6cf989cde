//! In-memory cache of file statuses.
//!
//! [`StatusCache`] maps a normalized repository-relative path to the last
//! [`FileStatusRecord`] hg reported for it. It has no expiry: entries are only
//! replaced by a refresh or dropped by explicit invalidation. The cache is
//! owned by one [`crate::core::repository::Repository`] and never shared.
//!
//! # Key normalization
//! - backslashes become `/`
//! - a leading `./` is removed
//! - keys are lower-cased when the working directory is case-insensitive
//!
//! # Generations
//! Every invalidation or reset bumps a generation counter. A refresh records
//! the generation before it runs hg and its result is only stored if no
//! invalidation happened in between, so a query that raced a mutation cannot
//! put pre-mutation statuses back into the cache.

use crate::core::{hg_status::HgStatus, records::FileStatusRecord};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct StatusCache {
    entries: HashMap<String, FileStatusRecord>,
    case_insensitive: bool,
    generation: u64,
}

impl StatusCache {
    pub fn new(case_insensitive: bool) -> Self {
        Self {
            entries: HashMap::new(),
            case_insensitive,
            generation: 0,
        }
    }

    /// Normalized cache key for a repository-relative path
    pub fn key(&self, path: &str) -> String {
        let mut key = path.replace('\\', "/");
        while let Some(stripped) = key.strip_prefix("./") {
            key = stripped.to_string();
        }
        if self.case_insensitive {
            key = key.to_lowercase();
        }
        key
    }

    pub fn get(&self, path: &str) -> Option<&FileStatusRecord> {
        self.entries.get(&self.key(path))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&self.key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current generation; capture it before querying hg
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the entries for exactly `requested` with the result of a query
    /// started at generation `since`.
    ///
    /// Records whose key was requested are stored; a requested key without a
    /// record is stored as [`HgStatus::NotTracked`]. Records for keys that
    /// were not requested (files hg listed under a requested directory) are
    /// ignored. Returns false, storing nothing, if the cache was invalidated
    /// after `since`.
    pub fn replace(&mut self, since: u64, requested: &[String], records: &[FileStatusRecord]) -> bool {
        if since != self.generation {
            return false;
        }
        let mut fresh: HashMap<String, &FileStatusRecord> = records
            .iter()
            .map(|record| (self.key(&record.path), record))
            .collect();

        for path in requested {
            let key = self.key(path);
            match fresh.remove(&key) {
                Some(record) => {
                    self.entries.insert(key, record.clone());
                }
                None => {
                    self.entries
                        .insert(key, FileStatusRecord::new(path.as_str(), HgStatus::NotTracked));
                }
            }
        }
        true
    }

    /// Drop everything and store the result of a full-tree query started at
    /// generation `since`. Returns false, changing nothing, if the cache was
    /// invalidated after `since`.
    pub fn reset(&mut self, since: u64, records: &[FileStatusRecord]) -> bool {
        if since != self.generation {
            return false;
        }
        self.generation += 1;
        self.entries.clear();
        for record in records {
            let key = self.key(&record.path);
            self.entries.insert(key, record.clone());
        }
        true
    }

    /// Drop the entries for `paths`
    pub fn invalidate(&mut self, paths: &[String]) {
        self.generation += 1;
        for path in paths {
            let key = self.key(path);
            self.entries.remove(&key);
        }
    }

    pub fn invalidate_all(&mut self) {
        log::debug!("Invalidating {} cached statuses", self.entries.len());
        self.generation += 1;
        self.entries.clear();
    }

    /// Of `paths`, those without a cached entry
    pub fn missing(&self, paths: &[String]) -> Vec<String> {
        paths
            .iter()
            .filter(|path| !self.contains(path))
            .cloned()
            .collect()
    }
}
