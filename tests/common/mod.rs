//! Shared utilities for hg-scc integration tests
//!
//! Tests run against real Mercurial repositories in temporary directories and
//! are skipped when no `hg` executable is installed.

pub mod assertions;
pub mod fixtures;
pub mod repository;
