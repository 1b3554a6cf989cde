//! Common assertion helpers for test output validation

#![allow(dead_code)]

use predicates::prelude::*;

/// Matches the error printed outside a repository
pub fn not_in_repository() -> impl Predicate<str> {
    predicates::str::contains("Not in a Mercurial repository")
}

/// Matches a status section header such as `Modified:`
pub fn has_section(title: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("{title}:"))
}

/// Matches a status line for `path` with the given hg code
pub fn has_status_line(code: char, path: &str) -> impl Predicate<str> {
    predicates::str::contains(code.to_string()).and(predicates::str::contains(path.to_string()))
}
