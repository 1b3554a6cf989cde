//! Core functionality for hg-scc.
//!
//! This module provides the building blocks of the Mercurial client: running
//! hg, parsing its output, caching file statuses and the repository facade
//! that ties them together, plus configuration, errors and terminal output.

pub mod cache;
pub mod chunk;
pub mod colors;
pub mod config;
pub mod dirs;
pub mod error;
pub mod hg_status;
pub mod invoker;
pub mod lock;
pub mod output;
pub mod parser;
pub mod records;
pub mod repository;

// === Error handling ===
// Core error types and result type used throughout the application
pub use error::{HgSccError, Result};

// === Repository facade ===
// Main interface for status queries, mutations, history, diff and grep
pub use repository::{DiffMode, DiffResult, Repository, RepositoryHandle};

// === Process invocation ===
// Running hg, streaming its output and canceling it
pub use invoker::{
    spawn, CancelToken, CommandRunner, Completion, HgProcess, Invocation, RunningCommand,
};

// === Status types and records ===
pub use hg_status::HgStatus;
pub use records::{
    BookmarkRecord, BranchRecord, BranchState, ChangeSetRecord, FileStatusRecord, GrepMatch,
    ResolveRecord, TagRecord,
};

// === Caching ===
pub use cache::StatusCache;

// === Configuration ===
pub use config::{ClientConfig, DiffToolConfig};

// === Color system ===
pub use colors::{format_file_status, get_aligned_status, get_colored_path, get_status_color_style};

// === Output formatting ===
pub use output::{print_error, print_info, print_json, print_section_header, print_success};
