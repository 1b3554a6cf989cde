use crate::commands::{from_current_dir, open_current};
use crate::core::{
    colors::get_colored_path, error::Result, print_info, print_json, records::ChangeSetRecord,
};
use colored::*;
use std::path::PathBuf;

/// Show repository history, or the history of one file
pub fn execute_log(path: Option<PathBuf>, limit: Option<usize>, json: bool) -> Result<()> {
    let repository = open_current()?;

    let changesets = match path {
        Some(path) => {
            let path = from_current_dir(&[path])?.remove(0);
            let mut history = repository.history(&path)?;
            if let Some(limit) = limit {
                history.truncate(limit);
            }
            history
        }
        None => repository.log(limit)?,
    };

    if json {
        return print_json(&changesets);
    }

    if changesets.is_empty() {
        print_info("No changesets found");
        return Ok(());
    }

    println!();
    for changeset in &changesets {
        print_changeset(changeset);
    }
    Ok(())
}

fn print_changeset(changeset: &ChangeSetRecord) {
    let mut header = format!(
        "{}:{}",
        changeset.revision.to_string().yellow(),
        changeset.short_id().yellow()
    );
    if changeset.branch != "default" {
        header.push_str(&format!(" [{}]", changeset.branch.magenta()));
    }
    for tag in &changeset.tags {
        header.push_str(&format!(" ({})", tag.green()));
    }

    println!("{header}");
    println!(
        "  {} {}",
        changeset.date.format("%Y-%m-%d %H:%M:%S %z").to_string().bright_black(),
        changeset.author.white()
    );
    println!("  {}", changeset.summary());

    let files = changeset
        .files_added
        .iter()
        .chain(&changeset.files_modified)
        .chain(&changeset.files_removed);
    for file in files {
        println!("    {} {}", file.status, get_colored_path(file.status, &file.path));
    }
    println!();
}
