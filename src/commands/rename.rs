use crate::commands::{from_current_dir, open_current};
use crate::core::{error::Result, print_success};
use std::path::PathBuf;

/// Record `from` as renamed to `to`. With `after`, the file was already
/// moved on disk.
pub fn execute_rename(from: PathBuf, to: PathBuf, after: bool) -> Result<()> {
    let repository = open_current()?;
    let resolved = from_current_dir(&[from, to])?;
    let pair = (resolved[0].clone(), resolved[1].clone());
    repository.rename(&[pair], after)?;

    print_success(&format!(
        "Renamed {} to {}",
        resolved[0].display(),
        resolved[1].display()
    ));
    Ok(())
}
