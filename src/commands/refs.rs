//! Listings of named revisions and tracked files.

use crate::commands::open_current;
use crate::core::{
    error::Result,
    print_info, print_json, print_section_header,
    records::{BranchState, FileStatusRecord},
};
use colored::*;

pub fn execute_tags(json: bool) -> Result<()> {
    let tags = open_current()?.tags()?;
    if json {
        return print_json(&tags);
    }

    print_section_header("Tags");
    for tag in &tags {
        let local = if tag.local { " (local)".bright_black() } else { "".normal() };
        println!(
            "  {:<30} {}{local}",
            tag.name.green(),
            revision_label(tag.revision, &tag.node)
        );
    }
    println!();
    Ok(())
}

pub fn execute_branches(json: bool) -> Result<()> {
    let branches = open_current()?.branches()?;
    if json {
        return print_json(&branches);
    }

    print_section_header("Branches");
    for branch in &branches {
        let name = match branch.state {
            BranchState::Active => branch.name.green(),
            BranchState::Inactive => branch.name.white(),
            BranchState::Closed => branch.name.bright_black(),
        };
        let state = match branch.state {
            BranchState::Active => "",
            BranchState::Inactive => " (inactive)",
            BranchState::Closed => " (closed)",
        };
        println!(
            "  {:<30} {}{}",
            name,
            revision_label(branch.revision, &branch.node),
            state.bright_black()
        );
    }
    println!();
    Ok(())
}

pub fn execute_bookmarks(json: bool) -> Result<()> {
    let bookmarks = open_current()?.bookmarks()?;
    if json {
        return print_json(&bookmarks);
    }
    if bookmarks.is_empty() {
        print_info("No bookmarks set");
        return Ok(());
    }

    print_section_header("Bookmarks");
    for bookmark in &bookmarks {
        let marker = if bookmark.active { "*".green() } else { " ".normal() };
        println!(
            "  {marker} {:<28} {}",
            bookmark.name.cyan(),
            revision_label(bookmark.revision, &bookmark.node)
        );
    }
    println!();
    Ok(())
}

/// List every file under version control
pub fn execute_files(json: bool) -> Result<()> {
    let files: Vec<FileStatusRecord> = open_current()?.tracked_files()?;
    if json {
        return print_json(&files);
    }
    for file in &files {
        println!("{}", file.path);
    }
    Ok(())
}

fn revision_label(revision: i64, node: &str) -> String {
    format!("{}:{}", revision, node).yellow().to_string()
}
