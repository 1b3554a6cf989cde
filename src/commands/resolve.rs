use crate::commands::{from_current_dir, open_current};
use crate::core::{error::Result, print_info, print_json, print_section_header, print_success};
use colored::*;
use std::path::PathBuf;

/// Mark the given files resolved, or list the merge state of all files
pub fn execute_resolve(mark: Vec<PathBuf>, json: bool) -> Result<()> {
    let repository = open_current()?;

    if !mark.is_empty() {
        let paths = from_current_dir(&mark)?;
        repository.mark_resolved(&paths)?;
        print_success(&format!("Marked {} file(s) resolved", paths.len()));
        return Ok(());
    }

    let records = repository.resolve_list()?;
    if json {
        return print_json(&records);
    }
    if records.is_empty() {
        print_info("No merge in progress");
        return Ok(());
    }

    print_section_header("Merge state");
    for record in &records {
        if record.resolved {
            println!("  {} {}", "R".green(), record.path.green());
        } else {
            println!("  {} {}", "U".red().bold(), record.path.red());
        }
    }
    println!();
    Ok(())
}
