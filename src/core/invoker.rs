//! Launching hg and streaming its output.
//!
//! The [`CommandRunner`] trait is the seam between the repository facade and
//! the operating system: [`HgProcess`] spawns the real executable, tests plug
//! in scripted runners. A run streams stdout to a callback line by line as it
//! arrives, drains stderr on a helper thread and reports exactly one
//! [`Completion`].
//!
//! Cancellation goes through a shared [`CancelToken`]: canceling kills the
//! attached child and returns immediately, the running call then observes the
//! closed pipe and reports `was_canceled`.

use crate::core::chunk::argument_length;
use crate::core::error::{HgSccError, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

/// One hg command: working directory plus arguments (without the executable)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub working_dir: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The hg subcommand, used in error messages
    pub fn command(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }

    /// Rendered length of the argument list, separators included
    pub fn command_line_length(&self) -> usize {
        self.args.iter().map(|a| argument_length(a) + 1).sum()
    }
}

/// Outcome of one process run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub was_canceled: bool,
    /// Captured stderr
    pub error_message: String,
}

impl Completion {
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    pub fn canceled() -> Self {
        Self {
            was_canceled: true,
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        !self.was_canceled && self.exit_code == Some(0)
    }

    /// Map the completion onto the error taxonomy: canceled runs become
    /// [`HgSccError::Canceled`], non-zero exits [`HgSccError::OperationFailed`].
    pub fn into_result(self, command: &str) -> Result<()> {
        if self.was_canceled {
            return Err(HgSccError::Canceled);
        }
        if self.exit_code == Some(0) {
            Ok(())
        } else {
            Err(HgSccError::operation_failed(
                command,
                self.exit_code,
                self.error_message,
            ))
        }
    }
}

#[derive(Debug, Default)]
struct CancelState {
    canceled: AtomicBool,
    child: Mutex<Option<Child>>,
}

/// Shared cancellation flag that also owns the running child while it runs
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the token canceled and kill the attached child, if any.
    /// Does not wait for the child to exit.
    pub fn cancel(&self) {
        self.inner.canceled.store(true, Ordering::SeqCst);
        let mut slot = self
            .inner
            .child
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(child) = slot.as_mut() {
            if let Err(e) = child.kill() {
                log::debug!("Kill of canceled hg process {} failed: {e}", child.id());
            }
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.inner.canceled.load(Ordering::SeqCst)
    }

    /// True when both handles refer to the same token
    pub fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn attach(&self, mut child: Child) {
        let mut slot = self
            .inner
            .child
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // cancel() may have run between spawn and attach
        if self.is_canceled() {
            let _ = child.kill();
        }
        *slot = Some(child);
    }

    fn detach(&self) -> Option<Child> {
        self.inner
            .child
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Runs hg invocations. Implemented by [`HgProcess`] and by test fakes.
pub trait CommandRunner: Send + Sync {
    /// Run `invocation` to completion, passing each stdout line to `on_line`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the process cannot be run at all; a
    /// non-zero exit or a cancellation is reported through the [`Completion`].
    fn run(
        &self,
        invocation: &Invocation,
        on_line: &mut dyn FnMut(&str),
        cancel: &CancelToken,
    ) -> Result<Completion>;
}

/// Live runner that spawns the hg executable
#[derive(Debug, Clone)]
pub struct HgProcess {
    executable: PathBuf,
}

impl HgProcess {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl Default for HgProcess {
    fn default() -> Self {
        Self::new("hg")
    }
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

impl CommandRunner for HgProcess {
    fn run(
        &self,
        invocation: &Invocation,
        on_line: &mut dyn FnMut(&str),
        cancel: &CancelToken,
    ) -> Result<Completion> {
        if cancel.is_canceled() {
            return Ok(Completion::canceled());
        }

        log::debug!(
            "Running {} {} in {}",
            self.executable.display(),
            invocation.args.join(" "),
            invocation.working_dir.display()
        );

        let mut child = Command::new(&self.executable)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .env("HGPLAIN", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| HgSccError::spawn(&self.executable, e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        cancel.attach(child);

        let stderr_reader = stderr.map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

        let mut read_error = None;
        if let Some(stdout) = stdout {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => on_line(&String::from_utf8_lossy(trim_line_ending(&buf))),
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        read_error = Some(e);
                        break;
                    }
                }
            }
        }

        let mut child = cancel
            .detach()
            .ok_or_else(|| std::io::Error::other("hg child process handle lost"))?;
        if read_error.is_some() {
            let _ = child.kill();
        }
        let status = child.wait()?;

        let error_message = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if let Some(e) = read_error {
            return Err(HgSccError::Io(e));
        }

        let completion = Completion {
            exit_code: status.code(),
            was_canceled: cancel.is_canceled(),
            error_message,
        };

        if completion.was_canceled {
            log::debug!("hg {} canceled", invocation.command());
        } else if !completion.success() {
            log::debug!(
                "hg {} exited with {:?}: {}",
                invocation.command(),
                completion.exit_code,
                completion.error_message.trim()
            );
        }

        Ok(completion)
    }
}

/// A command running on a background thread
pub struct RunningCommand {
    command: String,
    cancel: CancelToken,
    completion: Receiver<Result<Completion>>,
}

impl RunningCommand {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The completion, if the command has finished
    pub fn try_completion(&self) -> Option<Result<Completion>> {
        match self.completion.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(self.worker_lost())),
        }
    }

    /// Block until the command finishes
    pub fn wait(self) -> Result<Completion> {
        match self.completion.recv() {
            Ok(result) => result,
            Err(_) => Err(self.worker_lost()),
        }
    }

    fn worker_lost(&self) -> HgSccError {
        HgSccError::operation_failed(
            self.command.clone(),
            None,
            "command worker exited without reporting a result",
        )
    }
}

/// Run `invocation` on a background thread. `on_line` is called on that
/// thread; the single result is delivered through [`RunningCommand::wait`].
pub fn spawn<F>(runner: Arc<dyn CommandRunner>, invocation: Invocation, mut on_line: F) -> RunningCommand
where
    F: FnMut(&str) + Send + 'static,
{
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let command = invocation.command().to_string();
    let (tx, rx) = mpsc::sync_channel(1);

    thread::spawn(move || {
        let result = runner.run(&invocation, &mut on_line, &token);
        let _ = tx.send(result);
    });

    RunningCommand {
        command,
        cancel,
        completion: rx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_invocation_builder() {
        let inv = Invocation::new("/repo").arg("status").args(["-A", "my file.txt"]);
        assert_eq!(inv.command(), "status");
        assert_eq!(inv.args, vec!["status", "-A", "my file.txt"]);
        // "status " + "-A " + "\"my file.txt\" "
        assert_eq!(inv.command_line_length(), 7 + 3 + 14);
    }

    #[test]
    fn test_completion_into_result() {
        assert!(Completion::exited(0).into_result("add").is_ok());
        assert!(matches!(
            Completion::canceled().into_result("add"),
            Err(HgSccError::Canceled)
        ));

        let failed = Completion {
            exit_code: Some(1),
            was_canceled: false,
            error_message: "abort: no match".to_string(),
        };
        match failed.into_result("add") {
            Err(HgSccError::OperationFailed {
                command,
                exit_code,
                stderr,
            }) => {
                assert_eq!(command, "add");
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "abort: no match");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_trim_line_ending() {
        assert_eq!(trim_line_ending(b"abc\r\n"), b"abc");
        assert_eq!(trim_line_ending(b"abc\n"), b"abc");
        assert_eq!(trim_line_ending(b"abc"), b"abc");
    }

    #[test]
    fn test_precanceled_token_does_not_launch() {
        let runner = HgProcess::new("/nonexistent/hg-binary");
        let token = CancelToken::new();
        token.cancel();
        let completion = runner
            .run(&Invocation::new("."), &mut |_| {}, &token)
            .unwrap();
        assert!(completion.was_canceled);
    }

    #[test]
    fn test_missing_executable_is_spawn_error() {
        let runner = HgProcess::new("/nonexistent/hg-binary");
        let result = runner.run(
            &Invocation::new(".").arg("status"),
            &mut |_| {},
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(HgSccError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_streams_stdout_lines_and_captures_stderr() {
        let runner = HgProcess::new("sh");
        let invocation =
            Invocation::new(".").args(["-c", "printf 'one\\r\\ntwo\\n'; echo oops >&2; exit 3"]);
        let mut lines = Vec::new();
        let completion = runner
            .run(&invocation, &mut |l| lines.push(l.to_string()), &CancelToken::new())
            .unwrap();

        assert_eq!(lines, vec!["one", "two"]);
        assert_eq!(completion.exit_code, Some(3));
        assert!(!completion.was_canceled);
        assert_eq!(completion.error_message.trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn test_hgplain_is_set() {
        let runner = HgProcess::new("sh");
        let invocation = Invocation::new(".").args(["-c", "echo \"$HGPLAIN\""]);
        let mut lines = Vec::new();
        runner
            .run(&invocation, &mut |l| lines.push(l.to_string()), &CancelToken::new())
            .unwrap();
        assert_eq!(lines, vec!["1"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_kills_running_process() {
        let runner: Arc<dyn CommandRunner> = Arc::new(HgProcess::new("sleep"));
        let running = spawn(runner, Invocation::new(".").arg("30"), |_| {});

        thread::sleep(Duration::from_millis(100));
        let started = Instant::now();
        running.cancel();
        let completion = running.wait().unwrap();

        assert!(completion.was_canceled);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_delivers_single_completion() {
        let runner: Arc<dyn CommandRunner> = Arc::new(HgProcess::new("sh"));
        let (tx, rx) = mpsc::channel();
        let running = spawn(
            runner,
            Invocation::new(".").args(["-c", "echo a; echo b"]),
            move |line| {
                let _ = tx.send(line.to_string());
            },
        );
        let completion = running.wait().unwrap();
        assert!(completion.success());
        let lines: Vec<String> = rx.try_iter().collect();
        assert_eq!(lines, vec!["a", "b"]);
    }
}
