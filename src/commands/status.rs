use crate::commands::{from_current_dir, open_current};
use crate::core::{
    colors::format_file_status, error::Result, hg_status::HgStatus, print_info, print_json,
    print_section_header, records::FileStatusRecord,
};
use std::path::PathBuf;

/// Order in which status groups are printed
const SECTIONS: [(HgStatus, &str); 7] = [
    (HgStatus::Modified, "Modified"),
    (HgStatus::Added, "Added"),
    (HgStatus::Removed, "Removed"),
    (HgStatus::Deleted, "Missing"),
    (HgStatus::NotTracked, "Untracked"),
    (HgStatus::Ignored, "Ignored"),
    (HgStatus::Clean, "Clean"),
];

pub fn execute_status(paths: Vec<PathBuf>, json: bool) -> Result<()> {
    let repository = open_current()?;

    let records = if paths.is_empty() {
        repository.status_all()?
    } else {
        let paths = from_current_dir(&paths)?;
        repository.file_statuses(&paths)?
    };
    log::debug!("status returned {} record(s)", records.len());

    if json {
        return print_json(&records);
    }

    if records.is_empty() {
        print_info("Working directory is clean");
        return Ok(());
    }

    print_grouped_status_sections(&records);
    Ok(())
}

pub fn print_grouped_status_sections(records: &[FileStatusRecord]) {
    for (status, title) in SECTIONS {
        let group: Vec<&FileStatusRecord> =
            records.iter().filter(|r| r.status == status).collect();
        if group.is_empty() {
            continue;
        }
        print_section_header(title);
        for record in group {
            println!("  {}", format_file_status(record));
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_printable_status_has_a_section() {
        for status in [
            HgStatus::Modified,
            HgStatus::Added,
            HgStatus::Removed,
            HgStatus::Deleted,
            HgStatus::NotTracked,
            HgStatus::Ignored,
            HgStatus::Clean,
        ] {
            assert!(SECTIONS.iter().any(|(s, _)| *s == status));
        }
    }

    #[test]
    fn test_print_grouped_sections_does_not_panic() {
        print_grouped_status_sections(&[
            FileStatusRecord::new("a.txt", HgStatus::Modified),
            FileStatusRecord::copied("b.txt", "a.txt"),
        ]);
    }
}
