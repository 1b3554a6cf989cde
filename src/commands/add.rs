use crate::commands::{from_current_dir, open_current};
use crate::core::{error::Result, print_error, print_success, repository::Repository};
use std::path::PathBuf;

pub fn execute_add(paths: Vec<PathBuf>) -> Result<()> {
    run_file_mutation(paths, "add", "Added", Repository::add)
}

pub fn execute_remove(paths: Vec<PathBuf>) -> Result<()> {
    run_file_mutation(paths, "remove", "Removed", Repository::remove)
}

pub fn execute_revert(paths: Vec<PathBuf>) -> Result<()> {
    run_file_mutation(paths, "revert", "Reverted", Repository::revert)
}

fn run_file_mutation<F>(paths: Vec<PathBuf>, command: &str, done: &str, operation: F) -> Result<()>
where
    F: FnOnce(&Repository, &[PathBuf]) -> Result<()>,
{
    if paths.is_empty() {
        print_error(&format!("No files given. Usage: hgscc {command} <path>..."));
        return Ok(());
    }

    let repository = open_current()?;
    let paths = from_current_dir(&paths)?;
    operation(&repository, &paths)?;

    print_success(&format!("{done} {} file(s)", paths.len()));
    Ok(())
}
