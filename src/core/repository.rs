//! Repository facade: the public operation surface of hg-scc.
//!
//! [`Repository`] composes the process invoker, the output parsers and the
//! status cache. Every operation runs hg in the repository root through a
//! [`CommandRunner`], so the facade itself never touches a process directly.
//!
//! # Public API
//! - [`RepositoryHandle`]: a resolved working directory
//! - [`Repository`]: status queries, mutations, history, diff, grep
//! - [`DiffMode`] / [`DiffResult`]: diff configuration and outcome
//!
//! # Cache policy
//! - `status_all` replaces the whole cache, `status` exactly the queried keys
//! - `file_status` / `file_statuses` read through the cache and refresh only
//!   missing keys
//! - every mutation clears the cache once it completes or fails; a canceled
//!   operation leaves the cache untouched
//!
//! # Concurrency
//! `Repository` is `Send + Sync`. Read-only queries may overlap; mutations
//! take a [`WorkdirLock`] so at most one runs per working directory.

use crate::core::{
    cache::StatusCache,
    chunk::chunk_arguments,
    config::ClientConfig,
    error::{HgSccError, Result},
    hg_status::HgStatus,
    invoker::{CancelToken, CommandRunner, HgProcess, Invocation},
    lock::WorkdirLock,
    parser::{
        parse_bookmarks, parse_branches, parse_changesets, parse_resolve_list, parse_status,
        parse_tags, parse_tracked_files, GrepStream, CHANGESET_TEMPLATE,
    },
    records::{
        BookmarkRecord, BranchRecord, ChangeSetRecord, FileStatusRecord, GrepMatch,
        ResolveRecord, TagRecord,
    },
};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

/// A working directory resolved to a Mercurial root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    working_directory: PathBuf,
}

impl RepositoryHandle {
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
        }
    }

    /// Walk upward from `start` to the first directory containing `.hg`
    pub fn locate(start: &Path) -> Option<Self> {
        start
            .ancestors()
            .find(|dir| dir.join(".hg").is_dir())
            .map(Self::new)
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Convert `path` to the repository-relative, `/`-separated form hg
    /// expects. Relative paths are taken relative to the root.
    pub fn relativize(&self, path: &Path) -> Result<String> {
        let relative = if path.is_absolute() {
            self.strip_root(path)?
        } else {
            path.to_path_buf()
        };

        let mut parts: Vec<String> = Vec::new();
        for component in relative.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(HgSccError::invalid_path(path));
                    }
                }
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(HgSccError::invalid_path(path))
                }
            }
        }

        if parts.is_empty() {
            Ok(".".to_string())
        } else {
            Ok(parts.join("/"))
        }
    }

    fn strip_root(&self, path: &Path) -> Result<PathBuf> {
        if let Ok(relative) = path.strip_prefix(&self.working_directory) {
            return Ok(relative.to_path_buf());
        }
        // Symlinked temp dirs and the like: compare canonical forms
        let canonical_root = self.working_directory.canonicalize().ok();
        let canonical_path = path.canonicalize().ok();
        match (canonical_root, canonical_path) {
            (Some(root), Some(path)) => path
                .strip_prefix(&root)
                .map(Path::to_path_buf)
                .map_err(|_| HgSccError::invalid_path(&path)),
            _ => Err(HgSccError::invalid_path(path)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMode {
    /// Compare contents only, never launch a tool
    Silent,
    /// Launch the configured diff tool when the contents differ
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffResult {
    pub changed: bool,
    pub tool_launched: bool,
}

/// Registration of an in-flight operation, removed on drop
struct Operation<'a> {
    repository: &'a Repository,
    token: CancelToken,
}

impl Drop for Operation<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .repository
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|token| !token.same_as(&self.token));
    }
}

pub struct Repository {
    handle: RepositoryHandle,
    runner: Arc<dyn CommandRunner>,
    config: ClientConfig,
    cache: Mutex<StatusCache>,
    in_flight: Mutex<Vec<CancelToken>>,
}

impl Repository {
    /// Open the repository containing `path`, running the configured hg.
    ///
    /// If no `.hg` root is found above `path` and `create_if_missing` is set,
    /// a new repository is initialized at `path`.
    pub fn open(path: impl AsRef<Path>, create_if_missing: bool, config: ClientConfig) -> Result<Self> {
        let runner = Arc::new(HgProcess::new(&config.hg_executable));
        Self::open_with_runner(path, create_if_missing, config, runner)
    }

    pub fn open_with_runner(
        path: impl AsRef<Path>,
        create_if_missing: bool,
        config: ClientConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let start = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        let handle = match RepositoryHandle::locate(&start) {
            Some(handle) => handle,
            None if create_if_missing => {
                log::info!("Initializing Mercurial repository at {}", start.display());
                fs::create_dir_all(&start)?;
                let invocation = Invocation::new(&start).arg("init");
                runner
                    .run(&invocation, &mut |_| {}, &CancelToken::new())?
                    .into_result("init")?;
                RepositoryHandle::new(start)
            }
            None => return Err(HgSccError::no_repository(start)),
        };

        log::debug!("Opened repository at {}", handle.working_directory().display());
        Ok(Self::with_runner(handle, runner, config))
    }

    pub fn with_runner(
        handle: RepositoryHandle,
        runner: Arc<dyn CommandRunner>,
        config: ClientConfig,
    ) -> Self {
        let cache = StatusCache::new(config.case_insensitive_paths);
        Self {
            handle,
            runner,
            config,
            cache: Mutex::new(cache),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn handle(&self) -> &RepositoryHandle {
        &self.handle
    }

    pub fn root(&self) -> &Path {
        self.handle.working_directory()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Cancel every operation currently running on this repository
    pub fn cancel(&self) {
        let in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        log::debug!("Canceling {} running operation(s)", in_flight.len());
        for token in in_flight.iter() {
            token.cancel();
        }
    }

    // === Status ===

    /// Full-tree status (`hg status -C`); replaces the whole cache
    pub fn status_all(&self) -> Result<Vec<FileStatusRecord>> {
        let since = self.lock_cache().generation();
        let lines = self.run_collect(self.invocation().args(["status", "-C"]))?;
        let records = parse_status(&lines)?;
        if !self.lock_cache().reset(since, &records) {
            log::debug!("Cache changed during full status; result not stored");
        }
        Ok(records)
    }

    /// Status of the given files (`hg status -A -C`), chunked; replaces the
    /// cache entries for exactly these paths
    pub fn status<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<FileStatusRecord>> {
        let relative = self.relativize_all(paths)?;
        if relative.is_empty() {
            return Ok(Vec::new());
        }
        let operation = self.begin();
        self.refresh(&relative, &operation.token)
    }

    /// Re-query the given paths and store the result in the cache
    pub fn bulk_refresh<P: AsRef<Path>>(&self, paths: &[P]) -> Result<()> {
        self.status(paths).map(|_| ())
    }

    /// Status of one file, querying hg only on a cache miss
    pub fn file_status(&self, path: impl AsRef<Path>) -> Result<FileStatusRecord> {
        let relative = self.handle.relativize(path.as_ref())?;
        let mut records = self.read_through(&[relative])?;
        records
            .pop()
            .ok_or_else(|| HgSccError::invalid_path(path.as_ref()))
    }

    /// Statuses of several files in input order; one hg query covers every
    /// cache miss
    pub fn file_statuses<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<FileStatusRecord>> {
        let relative = self.relativize_all(paths)?;
        self.read_through(&relative)
    }

    /// The cached status, without querying hg
    pub fn cached(&self, path: impl AsRef<Path>) -> Option<FileStatusRecord> {
        let relative = self.handle.relativize(path.as_ref()).ok()?;
        self.lock_cache().get(&relative).cloned()
    }

    pub fn invalidate_all(&self) {
        self.lock_cache().invalidate_all();
    }

    /// Drop cached statuses for files reported changed by a file watcher
    pub fn notify_changed<P: AsRef<Path>>(&self, paths: &[P]) -> Result<()> {
        let relative = self.relativize_all(paths)?;
        self.lock_cache().invalidate(&relative);
        Ok(())
    }

    /// Every file under version control (`hg files`)
    pub fn tracked_files(&self) -> Result<Vec<FileStatusRecord>> {
        let lines = self.run_collect(self.invocation().arg("files"))?;
        Ok(parse_tracked_files(&lines))
    }

    // === Mutations ===

    pub fn add<P: AsRef<Path>>(&self, paths: &[P]) -> Result<()> {
        self.mutate_files("add", &["add"], paths)
    }

    pub fn remove<P: AsRef<Path>>(&self, paths: &[P]) -> Result<()> {
        self.mutate_files("remove", &["remove"], paths)
    }

    pub fn revert<P: AsRef<Path>>(&self, paths: &[P]) -> Result<()> {
        self.mutate_files("revert", &["revert"], paths)
    }

    /// Mark merge conflicts as resolved (`hg resolve -m`)
    pub fn mark_resolved<P: AsRef<Path>>(&self, paths: &[P]) -> Result<()> {
        self.mutate_files("resolve", &["resolve", "-m"], paths)
    }

    /// Record renames, one hg invocation per pair. With `after`, the files
    /// have already been moved on disk (`hg rename -A`).
    pub fn rename<P, Q>(&self, pairs: &[(P, Q)], after: bool) -> Result<()>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let mut relative = Vec::with_capacity(pairs.len());
        for (from, to) in pairs {
            relative.push((
                self.handle.relativize(from.as_ref())?,
                self.handle.relativize(to.as_ref())?,
            ));
        }
        if relative.is_empty() {
            return Ok(());
        }

        self.mutate("rename", |token| {
            for (from, to) in &relative {
                if token.is_canceled() {
                    return Err(HgSccError::Canceled);
                }
                let mut invocation = self.invocation().arg("rename");
                if after {
                    invocation = invocation.arg("-A");
                }
                let invocation = invocation.args(["--", from.as_str(), to.as_str()]);
                self.runner
                    .run(&invocation, &mut |_| {}, token)?
                    .into_result("rename")?;
            }
            Ok(())
        })
    }

    /// Commit `paths` (everything pending when empty) with `message`.
    ///
    /// A file list longer than the command-line limit is committed in several
    /// changesets, one per chunk.
    pub fn commit<P: AsRef<Path>>(&self, paths: &[P], message: &str) -> Result<()> {
        let relative = self.relativize_all(paths)?;
        self.mutate("commit", |token| {
            let base = self.invocation().args(["commit", "-m", message]);
            if relative.is_empty() {
                return self
                    .runner
                    .run(&base, &mut |_| {}, token)?
                    .into_result("commit");
            }
            self.run_chunked(base.arg("--"), &relative, token).map(|_| ())
        })
    }

    // === History ===

    /// Changesets touching `path`, newest first; empty when there are none
    pub fn history(&self, path: impl AsRef<Path>) -> Result<Vec<ChangeSetRecord>> {
        let relative = self.handle.relativize(path.as_ref())?;
        let invocation = self
            .invocation()
            .args(["log", "--template", CHANGESET_TEMPLATE, "--", relative.as_str()]);
        let lines = self.run_collect(invocation)?;
        parse_changesets(&lines)
    }

    /// Repository-wide history, newest first
    pub fn log(&self, limit: Option<usize>) -> Result<Vec<ChangeSetRecord>> {
        let mut invocation = self.invocation().args(["log", "--template", CHANGESET_TEMPLATE]);
        if let Some(limit) = limit {
            invocation = invocation.args(["--limit".to_string(), limit.to_string()]);
        }
        let lines = self.run_collect(invocation)?;
        parse_changesets(&lines)
    }

    pub fn tags(&self) -> Result<Vec<TagRecord>> {
        let lines = self.run_collect(self.invocation().arg("tags"))?;
        parse_tags(&lines)
    }

    pub fn branches(&self) -> Result<Vec<BranchRecord>> {
        let lines = self.run_collect(self.invocation().arg("branches"))?;
        parse_branches(&lines)
    }

    pub fn bookmarks(&self) -> Result<Vec<BookmarkRecord>> {
        let lines = self.run_collect(self.invocation().arg("bookmarks"))?;
        parse_bookmarks(&lines)
    }

    /// Merge state of files (`hg resolve -l`)
    pub fn resolve_list(&self) -> Result<Vec<ResolveRecord>> {
        let lines = self.run_collect(self.invocation().args(["resolve", "-l"]))?;
        parse_resolve_list(&lines)
    }

    // === Diff and grep ===

    /// Compare `path` between `rev_a` (default: the working directory parent)
    /// and `rev_b` (default: the working file).
    pub fn diff(
        &self,
        path: impl AsRef<Path>,
        rev_a: Option<&str>,
        rev_b: Option<&str>,
        mode: DiffMode,
    ) -> Result<DiffResult> {
        let relative = self.handle.relativize(path.as_ref())?;
        let tool = match mode {
            DiffMode::External => Some(
                self.config
                    .diff_tool
                    .as_ref()
                    .ok_or(HgSccError::DiffToolNotConfigured)?,
            ),
            DiffMode::Silent => None,
        };

        let operation = self.begin();
        let workspace = tempfile::Builder::new().prefix("hgscc-diff-").tempdir()?;
        let file_name = Path::new(&relative)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let rev_a = rev_a.unwrap_or(".");
        let base_file = workspace.path().join(format!("base-{file_name}"));
        let base_exists = self.cat_to_file(rev_a, &relative, &base_file, &operation.token)?;

        let (other_file, other_exists) = match rev_b {
            Some(rev) => {
                let file = workspace.path().join(format!("other-{file_name}"));
                let exists = self.cat_to_file(rev, &relative, &file, &operation.token)?;
                (file, exists)
            }
            None => {
                let file = self.root().join(&relative);
                let exists = file.is_file();
                (file, exists)
            }
        };

        let changed = match (base_exists, other_exists) {
            (true, true) => files_differ(&base_file, &other_file)?,
            (false, false) => false,
            _ => true,
        };
        log::debug!("diff {relative} {rev_a}..{}: changed={changed}", rev_b.unwrap_or("working"));

        let tool_launched = match tool {
            Some(tool) if changed => {
                // The tool outlives this call, so its inputs must too
                let kept = workspace.keep();
                for (file, exists) in [(&base_file, base_exists), (&other_file, other_exists)] {
                    if !exists && file.starts_with(&kept) {
                        fs::write(file, b"")?;
                    }
                }
                let mut child = Command::new(&tool.program)
                    .args(tool.command_args(&base_file, &other_file))
                    .spawn()
                    .map_err(|e| HgSccError::spawn(&tool.program, e))?;
                log::debug!("Launched {} (pid {})", tool.program.display(), child.id());
                // Reap the tool when it exits; its scratch files stay in the temp dir
                thread::spawn(move || match child.wait() {
                    Ok(status) => log::debug!("Diff tool exited with {status}"),
                    Err(e) => log::warn!("Failed to wait for diff tool: {e}"),
                });
                true
            }
            _ => false,
        };

        Ok(DiffResult {
            changed,
            tool_launched,
        })
    }

    /// Search tracked files for `pattern`, handing each match to `on_match`
    /// as hg prints it. Returns the number of matches.
    pub fn grep<P, F>(&self, pattern: &str, paths: &[P], mut on_match: F) -> Result<usize>
    where
        P: AsRef<Path>,
        F: FnMut(GrepMatch),
    {
        let relative = self.relativize_all(paths)?;
        let invocation = self
            .invocation()
            .args(["grep", "--line-number", "-T", "json", "--", pattern])
            .args(relative);

        let operation = self.begin();
        let mut stream = GrepStream::new();
        let mut count = 0;
        let mut parse_error = None;
        let completion = self.runner.run(
            &invocation,
            &mut |line| {
                if parse_error.is_some() {
                    return;
                }
                match stream.push_line(line) {
                    Ok(Some(found)) => {
                        count += 1;
                        on_match(found);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        parse_error = Some(e);
                        operation.token.cancel();
                    }
                }
            },
            &operation.token,
        )?;

        if let Some(e) = parse_error {
            return Err(e);
        }
        // hg grep exits 1 when nothing matched
        if !completion.was_canceled && completion.exit_code == Some(1) && count == 0 {
            return Ok(0);
        }
        completion.into_result("grep")?;
        stream.finish()?;
        Ok(count)
    }

    // === Internals ===

    fn invocation(&self) -> Invocation {
        Invocation::new(self.root())
    }

    fn lock_cache(&self) -> MutexGuard<'_, StatusCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Operation<'_> {
        let token = CancelToken::new();
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(token.clone());
        Operation {
            repository: self,
            token,
        }
    }

    fn relativize_all<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<String>> {
        paths
            .iter()
            .map(|path| self.handle.relativize(path.as_ref()))
            .collect()
    }

    fn run_collect(&self, invocation: Invocation) -> Result<Vec<String>> {
        let operation = self.begin();
        let mut lines = Vec::new();
        let completion = self.runner.run(
            &invocation,
            &mut |line| lines.push(line.to_string()),
            &operation.token,
        )?;
        completion.into_result(invocation.command())?;
        Ok(lines)
    }

    /// Run `base` once per chunk of `items`, stopping at the first failure.
    /// Chunks that already ran stay applied.
    fn run_chunked(&self, base: Invocation, items: &[String], token: &CancelToken) -> Result<Vec<String>> {
        let chunks = chunk_arguments(
            base.command_line_length(),
            items,
            self.config.max_command_length,
        );
        let total = chunks.len();
        let mut lines = Vec::new();

        for (index, chunk) in chunks.into_iter().enumerate() {
            if token.is_canceled() {
                return Err(HgSccError::Canceled);
            }
            let invocation = base.clone().args(chunk);
            if total > 1 {
                log::debug!("hg {} chunk {}/{}", base.command(), index + 1, total);
            }

            let completion =
                self.runner
                    .run(&invocation, &mut |line| lines.push(line.to_string()), token)?;
            if let Err(e) = completion.into_result(base.command()) {
                if index > 0 && !e.is_canceled() {
                    log::warn!(
                        "hg {} failed on chunk {} of {}; the first {} chunk(s) remain applied",
                        base.command(),
                        index + 1,
                        total,
                        index
                    );
                }
                return Err(e);
            }
        }

        Ok(lines)
    }

    fn refresh(&self, relative: &[String], token: &CancelToken) -> Result<Vec<FileStatusRecord>> {
        let since = self.lock_cache().generation();
        let base = self.invocation().args(["status", "-A", "-C", "--"]);
        let lines = self.run_chunked(base, relative, token)?;
        let records = parse_status(&lines)?;
        if self.lock_cache().replace(since, relative, &records) {
            log::debug!("Refreshed status of {} path(s)", relative.len());
        } else {
            log::debug!("Cache invalidated during refresh of {} path(s); result not stored", relative.len());
        }
        Ok(records)
    }

    fn read_through(&self, relative: &[String]) -> Result<Vec<FileStatusRecord>> {
        let missing = self.lock_cache().missing(relative);
        let mut fresh: HashMap<String, FileStatusRecord> = HashMap::new();

        if !missing.is_empty() {
            let operation = self.begin();
            let records = self.refresh(&missing, &operation.token)?;
            let cache = self.lock_cache();
            for record in records {
                fresh.insert(cache.key(&record.path), record);
            }
        }

        let cache = self.lock_cache();
        let records = relative
            .iter()
            .map(|path| {
                fresh
                    .get(&cache.key(path))
                    .or_else(|| cache.get(path))
                    .cloned()
                    .unwrap_or_else(|| FileStatusRecord::new(path.as_str(), HgStatus::NotTracked))
            })
            .collect();
        Ok(records)
    }

    fn mutate<F>(&self, command: &str, operation: F) -> Result<()>
    where
        F: FnOnce(&CancelToken) -> Result<()>,
    {
        let registration = self.begin();
        let acquired = WorkdirLock::acquire(self.root(), &registration.token);
        let Some(_lock) = acquired.filter(|_| !registration.token.is_canceled()) else {
            log::debug!("hg {command} canceled before it started");
            return Err(HgSccError::Canceled);
        };
        let result = operation(&registration.token);

        match &result {
            Err(HgSccError::Canceled) => {
                log::debug!("hg {command} canceled; status cache left as is");
            }
            Err(e) => {
                log::warn!("hg {command} failed: {e}");
                self.lock_cache().invalidate_all();
            }
            Ok(()) => self.lock_cache().invalidate_all(),
        }

        result
    }

    fn mutate_files<P: AsRef<Path>>(&self, command: &str, base_args: &[&str], paths: &[P]) -> Result<()> {
        let relative = self.relativize_all(paths)?;
        if relative.is_empty() {
            return Ok(());
        }
        self.mutate(command, |token| {
            let base = self.invocation().args(base_args.iter().copied()).arg("--");
            self.run_chunked(base, &relative, token).map(|_| ())
        })
    }

    /// Write `relative` as of `rev` to `dest`. Returns false when the file
    /// does not exist in that revision.
    fn cat_to_file(&self, rev: &str, relative: &str, dest: &Path, token: &CancelToken) -> Result<bool> {
        // -o takes a format string
        let output = dest.to_string_lossy().replace('%', "%%");
        let invocation = self
            .invocation()
            .args(["cat", "-r", rev, "-o", output.as_str(), "--", relative]);
        let completion = self.runner.run(&invocation, &mut |_| {}, token)?;
        // hg cat exits 1 when no file matched; anything else is a real failure
        if !completion.was_canceled && completion.exit_code == Some(1) {
            log::debug!(
                "{relative} not present in {rev}: {}",
                completion.error_message.trim()
            );
            return Ok(false);
        }
        completion.into_result("cat")?;
        Ok(dest.is_file())
    }
}

fn files_differ(a: &Path, b: &Path) -> Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(true);
    }
    Ok(fs::read(a)? != fs::read(b)?)
}
