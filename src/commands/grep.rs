use crate::commands::{from_current_dir, open_current};
use crate::core::{error::Result, print_info, print_json, records::GrepMatch};
use colored::*;
use std::path::PathBuf;

/// Search tracked files, printing matches as hg reports them
pub fn execute_grep(pattern: String, paths: Vec<PathBuf>, json: bool) -> Result<()> {
    let repository = open_current()?;
    let paths = from_current_dir(&paths)?;

    if json {
        let mut matches: Vec<GrepMatch> = Vec::new();
        repository.grep(&pattern, &paths, |found| matches.push(found))?;
        return print_json(&matches);
    }

    let count = repository.grep(&pattern, &paths, |found| print_match(&found))?;
    if count == 0 {
        print_info(&format!("No matches for '{pattern}'"));
    }
    Ok(())
}

fn print_match(found: &GrepMatch) {
    let location = match found.revision {
        Some(rev) => format!("{}:{}:{}", found.path, rev, found.line_number),
        None => format!("{}:{}", found.path, found.line_number),
    };
    println!("{} {}", location.cyan(), found.text);
}
