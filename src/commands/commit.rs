use crate::commands::{from_current_dir, open_current};
use crate::core::{error::Result, print_success};
use std::path::PathBuf;

/// Commit the given files, or every pending change when none are given
pub fn execute_commit(message: String, paths: Vec<PathBuf>) -> Result<()> {
    let repository = open_current()?;
    let paths = from_current_dir(&paths)?;
    repository.commit(&paths, &message)?;

    if paths.is_empty() {
        print_success("Committed all pending changes");
    } else {
        print_success(&format!("Committed {} file(s)", paths.len()));
    }
    Ok(())
}
