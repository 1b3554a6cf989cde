//! Per-working-directory serialization of mutating operations.
//!
//! hg takes its own repository lock, but two overlapping add/commit runs from
//! the same process would still interleave their chunks. [`WorkdirLock`]
//! blocks until no other mutating operation holds the same root. Roots are
//! keyed by their canonical path, so a symlinked or differently spelled path
//! to the same working directory shares one lock.

use crate::core::invoker::CancelToken;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, OnceLock, PoisonError};
use std::time::Duration;

/// How often a waiting claim rechecks its cancel token
const CANCEL_POLL: Duration = Duration::from_millis(25);

struct Registry {
    active: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| Registry {
        active: Mutex::new(HashSet::new()),
        released: Condvar::new(),
    })
}

/// Held for the duration of one mutating operation; released on drop
#[derive(Debug)]
pub struct WorkdirLock {
    root: PathBuf,
}

fn lock_key(root: &Path) -> PathBuf {
    root.canonicalize().unwrap_or_else(|_| root.to_path_buf())
}

impl WorkdirLock {
    /// Block until `root` is free, then claim it. Returns `None` if `cancel`
    /// fires while waiting.
    pub fn acquire(root: &Path, cancel: &CancelToken) -> Option<Self> {
        let key = lock_key(root);
        let registry = registry();
        let mut active = registry
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if active.contains(&key) {
            log::debug!("Waiting for running operation in {}", key.display());
        }
        while active.contains(&key) {
            if cancel.is_canceled() {
                return None;
            }
            active = registry
                .released
                .wait_timeout(active, CANCEL_POLL)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        active.insert(key.clone());
        Some(Self { root: key })
    }

    #[cfg(test)]
    fn try_acquire(root: &Path) -> Option<Self> {
        let key = lock_key(root);
        let mut active = registry()
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !active.insert(key.clone()) {
            return None;
        }
        Some(Self { root: key })
    }
}

impl Drop for WorkdirLock {
    fn drop(&mut self) {
        let registry = registry();
        let mut active = registry
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        active.remove(&self.root);
        registry.released.notify_all();
    }
}
