//! Mercurial repository setup utilities

#![allow(dead_code)]

use anyhow::{bail, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const TEST_USER: &str = "Test User <test@example.com>";

/// A repository in a temporary directory, plus an isolated config directory.
/// The TempDirs must stay alive for the duration of the test.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub config_dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The hgscc binary, run inside the repository with isolated config
    pub fn hgscc(&self) -> Result<Command> {
        use assert_cmd::prelude::*;
        let mut cmd = Command::cargo_bin("hgscc")?;
        cmd.current_dir(&self.path)
            .env("XDG_CONFIG_HOME", self.config_dir.path())
            .env("HGUSER", TEST_USER)
            .env("HGPLAIN", "1")
            .env("NO_COLOR", "1");
        Ok(cmd)
    }
}

/// Whether an `hg` executable is available; tests return early without it
pub fn hg_available() -> bool {
    let available = Command::new("hg")
        .arg("version")
        .env("HGPLAIN", "1")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    if !available {
        eprintln!("hg not installed, skipping");
    }
    available
}

/// Run hg in `repo_path`, failing on a non-zero exit
pub fn hg(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("hg")
        .args(args)
        .current_dir(repo_path)
        .env("HGPLAIN", "1")
        .env("HGUSER", TEST_USER)
        .output()?;
    if !output.status.success() {
        bail!(
            "hg {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Sets up a fresh, empty Mercurial repository
pub fn setup_test_repo() -> Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let config_dir = TempDir::new()?;
    let path = temp_dir.path().to_path_buf();
    hg(&path, &["init"])?;

    Ok(TestRepo {
        temp_dir,
        config_dir,
        path,
    })
}

/// Sets up a repository with one commit containing `initial.txt`
pub fn setup_test_repo_with_initial_commit() -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    create_file(repo.path(), "initial.txt", "initial content\n")?;
    hg(repo.path(), &["add", "initial.txt"])?;
    hg_commit(repo.path(), "Initial commit")?;
    Ok(repo)
}

pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    let path = repo_path.join(filename);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

pub fn hg_commit(repo_path: &Path, message: &str) -> Result<()> {
    hg(repo_path, &["commit", "-u", TEST_USER, "-m", message])?;
    Ok(())
}

pub fn remove_file(repo_path: &Path, filename: &str) -> Result<()> {
    fs::remove_file(repo_path.join(filename))?;
    Ok(())
}

/// Creates files with sequential content
pub fn create_test_files(repo_path: &Path, filenames: &[&str]) -> Result<()> {
    for (i, filename) in filenames.iter().enumerate() {
        let content = format!("content{}\nline 2\n", i + 1);
        create_file(repo_path, filename, &content)?;
    }
    Ok(())
}

pub fn modify_test_files(repo_path: &Path, filenames: &[&str]) -> Result<()> {
    for (i, filename) in filenames.iter().enumerate() {
        let content = format!("modified{}\nline 2\nnew line\n", i + 1);
        create_file(repo_path, filename, &content)?;
    }
    Ok(())
}
