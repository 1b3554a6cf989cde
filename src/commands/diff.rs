use crate::commands::{from_current_dir, open_current};
use crate::core::{error::Result, print_info, print_json, repository::DiffMode};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct DiffReport<'a> {
    path: &'a str,
    changed: bool,
    tool_launched: bool,
}

/// Compare a file between two revisions, or a revision and the working copy.
/// With `tool`, the configured external diff tool is opened when they differ.
pub fn execute_diff(
    path: PathBuf,
    rev: Option<String>,
    to_rev: Option<String>,
    tool: bool,
    json: bool,
) -> Result<()> {
    let repository = open_current()?;
    let path = from_current_dir(&[path])?.remove(0);
    let mode = if tool { DiffMode::External } else { DiffMode::Silent };

    let result = repository.diff(&path, rev.as_deref(), to_rev.as_deref(), mode)?;
    let display = repository.handle().relativize(&path)?;

    if json {
        return print_json(&DiffReport {
            path: &display,
            changed: result.changed,
            tool_launched: result.tool_launched,
        });
    }

    let base = rev.as_deref().unwrap_or(".");
    let other = to_rev.as_deref().unwrap_or("working copy");
    if result.changed {
        print_info(&format!("{display} differs between {base} and {other}"));
    } else {
        print_info(&format!("{display} is identical in {base} and {other}"));
    }
    Ok(())
}
