//! Type-safe Mercurial file status enumeration.
//!
//! This module defines [`HgStatus`], the status a file can have in a Mercurial
//! working directory. Status codes printed by `hg status` map 1:1 onto the
//! variants; unknown codes are rejected instead of falling back to a default.
//!
//! # Public API
//! - [`HgStatus`]: Main enumeration for all hg file status types
//!
//! # Status codes
//! | code | variant |
//! |------|---------|
//! | `M`  | [`HgStatus::Modified`] |
//! | `A`  | [`HgStatus::Added`] |
//! | `R`  | [`HgStatus::Removed`] |
//! | `!`  | [`HgStatus::Deleted`] (missing on disk) |
//! | `?`  | [`HgStatus::NotTracked`] |
//! | `I`  | [`HgStatus::Ignored`] |
//! | `C`  | [`HgStatus::Clean`] |
//!
//! [`HgStatus::Tracked`] has no code: it comes from `hg files`, which only
//! tells whether a file is under version control.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HgStatus {
    /// Under version control, state otherwise unknown
    Tracked,
    /// Modified file (M)
    Modified,
    /// Scheduled for addition (A)
    Added,
    /// Scheduled for removal (R)
    Removed,
    /// Tracked but missing from disk (!)
    Deleted,
    /// Ignored by .hgignore (I)
    Ignored,
    /// Not under version control (?)
    NotTracked,
    /// Unchanged tracked file (C)
    Clean,
}

impl HgStatus {
    /// The status code hg prints for this status, if it has one
    pub fn code(&self) -> Option<char> {
        match self {
            HgStatus::Tracked => None,
            HgStatus::Modified => Some('M'),
            HgStatus::Added => Some('A'),
            HgStatus::Removed => Some('R'),
            HgStatus::Deleted => Some('!'),
            HgStatus::Ignored => Some('I'),
            HgStatus::NotTracked => Some('?'),
            HgStatus::Clean => Some('C'),
        }
    }

    /// Get human-readable description for status
    pub fn description(&self) -> &'static str {
        match self {
            HgStatus::Tracked => "tracked",
            HgStatus::Modified => "modified",
            HgStatus::Added => "added",
            HgStatus::Removed => "removed",
            HgStatus::Deleted => "missing",
            HgStatus::Ignored => "ignored",
            HgStatus::NotTracked => "untracked",
            HgStatus::Clean => "clean",
        }
    }

    /// Whether the file is known to the repository
    pub fn is_tracked(&self) -> bool {
        !matches!(self, HgStatus::NotTracked | HgStatus::Ignored)
    }

    /// Whether committing now would record a change for this file
    pub fn is_pending_change(&self) -> bool {
        matches!(
            self,
            HgStatus::Modified | HgStatus::Added | HgStatus::Removed | HgStatus::Deleted
        )
    }
}

impl fmt::Display for HgStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code() {
            Some(code) => write!(f, "{code}"),
            None => write!(f, " "),
        }
    }
}

/// Unknown status code, returned by the `TryFrom<char>` conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownStatusCode(pub char);

impl TryFrom<char> for HgStatus {
    type Error = UnknownStatusCode;

    fn try_from(code: char) -> Result<Self, Self::Error> {
        match code {
            'M' => Ok(HgStatus::Modified),
            'A' => Ok(HgStatus::Added),
            'R' => Ok(HgStatus::Removed),
            '!' => Ok(HgStatus::Deleted),
            '?' => Ok(HgStatus::NotTracked),
            'I' => Ok(HgStatus::Ignored),
            'C' => Ok(HgStatus::Clean),
            other => Err(UnknownStatusCode(other)),
        }
    }
}
