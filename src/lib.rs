//! hg-scc - a Mercurial repository status client.
//!
//! The library runs the `hg` executable, parses its textual output into typed
//! records and keeps a per-repository cache of file statuses, for hosts such
//! as IDE integrations that ask for the state of many files repeatedly.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - [`Repository`]: status queries, mutations, history, diff and grep
//! - [`CommandRunner`] / [`HgProcess`]: the process invoker
//! - [`core::parser`]: parsers for hg output grammars
//! - Error handling and result types
//!
//! ```no_run
//! use hg_scc::{ClientConfig, HgStatus, Repository};
//!
//! let repository = Repository::open(".", false, ClientConfig::default())?;
//! let record = repository.file_status("src/lib.rs")?;
//! if record.status == HgStatus::Modified {
//!     println!("{} has local changes", record.path);
//! }
//! # Ok::<(), hg_scc::HgSccError>(())
//! ```

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    // Repository facade
    CancelToken,
    ChangeSetRecord,
    // Configuration
    ClientConfig,
    CommandRunner,
    Completion,
    DiffMode,
    DiffResult,
    DiffToolConfig,
    FileStatusRecord,
    // Error handling
    HgSccError,
    HgProcess,
    // Status types and records
    HgStatus,
    Invocation,
    Repository,
    RepositoryHandle,
    Result,
    StatusCache,
};
