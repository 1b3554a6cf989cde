//! Typed records produced from hg output.
//!
//! Every record here is built by [`crate::core::parser`] from one line or one
//! block of command output and is immutable afterwards. All records serialize
//! with serde so the CLI can print them as JSON.
//!
//! # Public API
//! - [`FileStatusRecord`]: status of one file in the working directory
//! - [`ChangeSetRecord`]: one changeset from `hg log`
//! - [`TagRecord`], [`BranchRecord`], [`BookmarkRecord`]: named revisions
//! - [`ResolveRecord`]: merge conflict state of one file
//! - [`GrepMatch`]: one line matched by `hg grep`

use crate::core::hg_status::HgStatus;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatusRecord {
    pub path: String,
    pub status: HgStatus,
    pub copied_from: Option<String>,
}

impl FileStatusRecord {
    pub fn new(path: impl Into<String>, status: HgStatus) -> Self {
        Self {
            path: path.into(),
            status,
            copied_from: None,
        }
    }

    pub fn copied(path: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: HgStatus::Added,
            copied_from: Some(source.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSetRecord {
    pub revision: i64,
    /// Full node hash
    pub id: String,
    pub author: String,
    pub date: DateTime<FixedOffset>,
    pub description: String,
    pub branch: String,
    pub tags: Vec<String>,
    pub files_added: Vec<FileStatusRecord>,
    pub files_modified: Vec<FileStatusRecord>,
    pub files_removed: Vec<FileStatusRecord>,
}

impl ChangeSetRecord {
    /// First 12 characters of the node hash, as hg shows it
    pub fn short_id(&self) -> &str {
        self.id.get(..12).unwrap_or(&self.id)
    }

    /// First line of the description
    pub fn summary(&self) -> &str {
        self.description.lines().next().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub name: String,
    pub revision: i64,
    pub node: String,
    pub local: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchState {
    Active,
    Inactive,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub name: String,
    pub revision: i64,
    pub node: String,
    pub state: BranchState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub name: String,
    pub revision: i64,
    pub node: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveRecord {
    pub path: String,
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrepMatch {
    pub path: String,
    /// Present when hg searched history rather than the working directory
    pub revision: Option<i64>,
    pub line_number: u32,
    pub text: String,
}
