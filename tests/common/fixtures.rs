//! Predefined repository scenarios

#![allow(dead_code)]

use super::repository::*;
use anyhow::Result;

/// Repository with three committed files, two of them modified afterwards,
/// plus two untracked files
pub fn create_multi_file_repo() -> Result<TestRepo> {
    let repo = setup_test_repo_with_initial_commit()?;

    create_test_files(repo.path(), &["file1.txt", "file2.txt", "file3.txt"])?;
    hg(repo.path(), &["add", "file1.txt", "file2.txt", "file3.txt"])?;
    hg_commit(repo.path(), "Add files")?;

    modify_test_files(repo.path(), &["file1.txt", "file2.txt"])?;
    create_test_files(repo.path(), &["file4.txt", "file5.txt"])?;

    Ok(repo)
}

/// Repository whose `tracked.txt` has two changesets of history
pub fn create_repo_with_history() -> Result<TestRepo> {
    let repo = setup_test_repo_with_initial_commit()?;

    create_file(repo.path(), "tracked.txt", "first\n")?;
    hg(repo.path(), &["add", "tracked.txt"])?;
    hg_commit(repo.path(), "Add tracked file")?;

    create_file(repo.path(), "tracked.txt", "second\n")?;
    hg_commit(repo.path(), "Edit tracked file\n\nWith a longer body.")?;

    Ok(repo)
}
