//! Unified color system for hg status visualization.
//!
//! Every place that prints a file status goes through
//! [`get_status_color_style`], so a status has the same color in status
//! listings, history file lists and legends.
//!
//! # Public API
//! - [`get_status_color_style`]: Get color function for an hg status
//! - [`get_aligned_status`]: Status code padded to a fixed column
//! - [`get_colored_path`]: Apply status color to file paths
//! - [`format_file_status`]: Complete file line formatting
//!
//! # Color Scheme
//! - **Modified**: Yellow
//! - **Added**: Green
//! - **Removed / Missing**: Red
//! - **Untracked**: Cyan
//! - **Ignored**: Dimmed
//! - **Clean / Tracked**: White

use crate::core::{hg_status::HgStatus, records::FileStatusRecord};
use colored::*;

/// Returns a closure that applies the color for `status` to any text
pub fn get_status_color_style(status: HgStatus) -> Box<dyn Fn(&str) -> ColoredString> {
    match status {
        HgStatus::Modified => Box::new(|text: &str| text.yellow()),
        HgStatus::Added => Box::new(|text: &str| text.green()),
        HgStatus::Removed => Box::new(|text: &str| text.red()),
        HgStatus::Deleted => Box::new(|text: &str| text.red().bold()),
        HgStatus::NotTracked => Box::new(|text: &str| text.cyan()),
        HgStatus::Ignored => Box::new(|text: &str| text.bright_black()),
        HgStatus::Clean | HgStatus::Tracked => Box::new(|text: &str| text.white()),
    }
}

/// Colored status code followed by a space
pub fn get_aligned_status(status: HgStatus) -> ColoredString {
    let color_fn = get_status_color_style(status);
    color_fn(&format!("{status} "))
}

pub fn get_colored_path(status: HgStatus, path: &str) -> ColoredString {
    let color_fn = get_status_color_style(status);
    color_fn(path)
}

/// One status line: code, path and, for copies, the source
pub fn format_file_status(record: &FileStatusRecord) -> String {
    let status = get_aligned_status(record.status);
    let path = get_colored_path(record.status, &record.path);
    match &record.copied_from {
        Some(source) => format!(
            "{status} {path} {} {}",
            "<-".bright_black(),
            source.bright_black()
        ),
        None => format!("{status} {path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_modified_file() {
        let record = FileStatusRecord::new("src/main.rs", HgStatus::Modified);
        let result = format_file_status(&record);
        assert!(result.contains("M"));
        assert!(result.contains("src/main.rs"));
    }

    #[test]
    fn test_format_copied_file_shows_source() {
        let record = FileStatusRecord::copied("new.txt", "old.txt");
        let result = format_file_status(&record);
        assert!(result.contains("A"));
        assert!(result.contains("new.txt"));
        assert!(result.contains("old.txt"));
    }

    #[test]
    fn test_get_aligned_status() {
        assert!(get_aligned_status(HgStatus::Deleted).to_string().contains("! "));
        assert!(get_aligned_status(HgStatus::NotTracked).to_string().contains("? "));
    }

    #[test]
    fn test_status_color_style_consistency() {
        let statuses = [
            HgStatus::Modified,
            HgStatus::Added,
            HgStatus::Removed,
            HgStatus::Deleted,
            HgStatus::NotTracked,
            HgStatus::Ignored,
            HgStatus::Clean,
        ];

        for status in &statuses {
            let color_fn = get_status_color_style(*status);
            assert_eq!(color_fn("test").to_string(), color_fn("test").to_string());
        }
    }
}
