//! Parsers for hg's line-oriented output.
//!
//! All functions here are pure: they take the lines a command printed and
//! return fully materialized records. Anything that does not match the
//! expected grammar is a [`HgSccError::ParseError`]; nothing is silently
//! skipped, since a misparsed status line would corrupt the status cache.
//!
//! # Grammars
//! - **status**: `<code> <path>`, an `A` line optionally followed by a
//!   `  <source>` line naming the copy source (`hg status -C`)
//! - **changeset log**: blocks produced by [`CHANGESET_TEMPLATE`]
//! - **named revisions**: `hg tags`, `hg branches`, `hg bookmarks`
//! - **resolve list**: `U <path>` / `R <path>`
//! - **grep**: the JSON array of `hg grep -T json`, one object per match

use crate::core::{
    error::{HgSccError, Result},
    hg_status::{HgStatus, UnknownStatusCode},
    records::{
        BookmarkRecord, BranchRecord, BranchState, ChangeSetRecord, FileStatusRecord, GrepMatch,
        ResolveRecord, TagRecord,
    },
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::collections::HashSet;

/// First line of every changeset block
pub const CHANGESET_SENTINEL: &str = "==:";

/// `hg log --template` producing the changeset-log grammar.
///
/// `M:` carries every touched file; modified files are derived by removing
/// the added and removed ones.
pub const CHANGESET_TEMPLATE: &str = "==:\\n\
date: {date|isodatesec}\\n\
author: {author}\\n\
branch: {branch}\\n\
tags: {tags}\\n\
rev: {rev}\\n\
node: {node}\\n\
desc: {desc|tabindent}\\n\
A: {join(file_adds, ':')}\\n\
M: {join(files, ':')}\\n\
R: {join(file_dels, ':')}\\n";

const ISO_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Parse `hg status` output.
pub fn parse_status<I, S>(lines: I) -> Result<Vec<FileStatusRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    let mut lines = lines.into_iter().peekable();

    while let Some(line) = lines.next() {
        let line = line.as_ref();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("  ") {
            return Err(HgSccError::parse(
                line,
                "copy source without a preceding added file",
            ));
        }

        let mut record = parse_status_line(line)?;

        if record.status == HgStatus::Added {
            let source = lines
                .peek()
                .and_then(|next| next.as_ref().strip_prefix("  ").map(str::to_string));
            if let Some(source) = source {
                record.copied_from = Some(source);
                lines.next();
            }
        }

        records.push(record);
    }

    Ok(records)
}

fn parse_status_line(line: &str) -> Result<FileStatusRecord> {
    let mut chars = line.chars();
    let code = chars
        .next()
        .ok_or_else(|| HgSccError::parse(line, "empty status line"))?;

    let path = chars
        .as_str()
        .strip_prefix(' ')
        .ok_or_else(|| HgSccError::parse(line, "missing separator after status code"))?;
    if path.is_empty() {
        return Err(HgSccError::parse(line, "missing path"));
    }

    let status = HgStatus::try_from(code).map_err(|UnknownStatusCode(c)| {
        HgSccError::parse(line, format!("unknown status code '{c}'"))
    })?;

    Ok(FileStatusRecord::new(path, status))
}

/// Parse `hg files` output; every listed file is [`HgStatus::Tracked`].
pub fn parse_tracked_files<I, S>(lines: I) -> Vec<FileStatusRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter(|line| !line.as_ref().is_empty())
        .map(|line| FileStatusRecord::new(line.as_ref(), HgStatus::Tracked))
        .collect()
}

#[derive(Default)]
struct ChangeSetBuilder {
    date: Option<DateTime<FixedOffset>>,
    author: String,
    branch: Option<String>,
    tags: Vec<String>,
    revision: Option<i64>,
    node: Option<String>,
    description: String,
    in_description: bool,
    pending_blank_lines: usize,
    added: Vec<String>,
    touched: Vec<String>,
    removed: Vec<String>,
}

impl ChangeSetBuilder {
    fn append_description(&mut self, text: &str) {
        // tabindent leaves empty lines unindented
        for _ in 0..self.pending_blank_lines {
            self.description.push('\n');
        }
        self.pending_blank_lines = 0;
        self.description.push('\n');
        self.description.push_str(text);
    }

    fn apply(&mut self, line: &str, key: &str, value: &str) -> Result<()> {
        self.in_description = false;
        self.pending_blank_lines = 0;

        match key {
            "date" => {
                let date = DateTime::parse_from_str(value, ISO_DATE_FORMAT).map_err(|e| {
                    HgSccError::parse(line, format!("invalid changeset date: {e}"))
                })?;
                self.date = Some(date);
            }
            "author" => self.author = value.to_string(),
            "branch" => self.branch = Some(value.to_string()),
            "tags" => self.tags = value.split_whitespace().map(str::to_string).collect(),
            "rev" => {
                let revision = value
                    .parse()
                    .map_err(|_| HgSccError::parse(line, "invalid revision number"))?;
                self.revision = Some(revision);
            }
            "node" => self.node = Some(value.to_string()),
            "desc" => {
                self.description = value.to_string();
                self.in_description = true;
            }
            "A" => self.added = split_file_list(value),
            "M" => self.touched = split_file_list(value),
            "R" => self.removed = split_file_list(value),
            _ => {
                return Err(HgSccError::parse(
                    line,
                    format!("unknown changeset field '{key}'"),
                ))
            }
        }

        Ok(())
    }

    fn finish(self) -> Result<ChangeSetRecord> {
        let node = self
            .node
            .ok_or_else(|| HgSccError::parse(CHANGESET_SENTINEL, "changeset without node"))?;
        let revision = self.revision.ok_or_else(|| {
            HgSccError::parse(CHANGESET_SENTINEL, format!("changeset {node} without revision"))
        })?;
        let date = self.date.ok_or_else(|| {
            HgSccError::parse(CHANGESET_SENTINEL, format!("changeset {node} without date"))
        })?;

        let excluded: HashSet<&str> = self
            .added
            .iter()
            .chain(self.removed.iter())
            .map(String::as_str)
            .collect();
        let files_modified = self
            .touched
            .iter()
            .filter(|f| !excluded.contains(f.as_str()))
            .map(|f| FileStatusRecord::new(f.as_str(), HgStatus::Modified))
            .collect();

        Ok(ChangeSetRecord {
            revision,
            id: node,
            author: self.author,
            date,
            description: self.description,
            branch: self.branch.unwrap_or_else(|| "default".to_string()),
            tags: self.tags,
            files_added: self
                .added
                .into_iter()
                .map(|f| FileStatusRecord::new(f, HgStatus::Added))
                .collect(),
            files_modified,
            files_removed: self
                .removed
                .into_iter()
                .map(|f| FileStatusRecord::new(f, HgStatus::Removed))
                .collect(),
        })
    }
}

fn split_file_list(value: &str) -> Vec<String> {
    value
        .split(':')
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `hg log --template CHANGESET_TEMPLATE` output into changesets,
/// in output order.
pub fn parse_changesets<I, S>(lines: I) -> Result<Vec<ChangeSetRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut changesets = Vec::new();
    let mut current: Option<ChangeSetBuilder> = None;

    for line in lines {
        let line = line.as_ref();

        if line == CHANGESET_SENTINEL {
            if let Some(block) = current.take() {
                changesets.push(block.finish()?);
            }
            current = Some(ChangeSetBuilder::default());
            continue;
        }

        let Some(block) = current.as_mut() else {
            if line.trim().is_empty() {
                continue;
            }
            return Err(HgSccError::parse(
                line,
                "output before the first changeset marker",
            ));
        };

        if let Some(text) = line.strip_prefix('\t') {
            if !block.in_description {
                return Err(HgSccError::parse(
                    line,
                    "continuation line outside a description",
                ));
            }
            block.append_description(text);
            continue;
        }

        if line.is_empty() {
            if block.in_description {
                block.pending_blank_lines += 1;
            }
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| HgSccError::parse(line, "expected 'key: value'"))?;
        let value = value.strip_prefix(' ').unwrap_or(value);
        block.apply(line, key, value)?;
    }

    if let Some(block) = current {
        changesets.push(block.finish()?);
    }

    Ok(changesets)
}

/// Split `name   rev:node` into its parts. The name may contain spaces.
fn split_named_revision(line: &str) -> Result<(String, i64, String)> {
    let trimmed = line.trim_end();
    let (name, rev_node) = trimmed
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| HgSccError::parse(line, "expected 'name rev:node'"))?;
    let (rev, node) = rev_node
        .split_once(':')
        .ok_or_else(|| HgSccError::parse(line, "expected 'rev:node'"))?;
    let revision = rev
        .parse()
        .map_err(|_| HgSccError::parse(line, "invalid revision number"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(HgSccError::parse(line, "missing name"));
    }
    Ok((name.to_string(), revision, node.to_string()))
}

/// Parse `hg tags` output.
pub fn parse_tags<I, S>(lines: I) -> Result<Vec<TagRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags = Vec::new();
    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let (body, local) = match line.trim_end().strip_suffix(" (local)") {
            Some(body) => (body, true),
            None => (line, false),
        };
        let (name, revision, node) = split_named_revision(body)?;
        tags.push(TagRecord {
            name,
            revision,
            node,
            local,
        });
    }
    Ok(tags)
}

/// Parse `hg branches` output.
pub fn parse_branches<I, S>(lines: I) -> Result<Vec<BranchRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut branches = Vec::new();
    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let trimmed = line.trim_end();
        let (body, state) = if let Some(body) = trimmed.strip_suffix(" (inactive)") {
            (body, BranchState::Inactive)
        } else if let Some(body) = trimmed.strip_suffix(" (closed)") {
            (body, BranchState::Closed)
        } else {
            (trimmed, BranchState::Active)
        };
        let (name, revision, node) = split_named_revision(body)?;
        branches.push(BranchRecord {
            name,
            revision,
            node,
            state,
        });
    }
    Ok(branches)
}

/// Parse `hg bookmarks` output.
pub fn parse_bookmarks<I, S>(lines: I) -> Result<Vec<BookmarkRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut bookmarks = Vec::new();
    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() || line.trim() == "no bookmarks set" {
            continue;
        }
        let (body, active) = match line.strip_prefix(" * ") {
            Some(body) => (body, true),
            None => (line, false),
        };
        let (name, revision, node) = split_named_revision(body)?;
        bookmarks.push(BookmarkRecord {
            name,
            revision,
            node,
            active,
        });
    }
    Ok(bookmarks)
}

/// Parse `hg resolve -l` output.
pub fn parse_resolve_list<I, S>(lines: I) -> Result<Vec<ResolveRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    for line in lines {
        let line = line.as_ref();
        if line.is_empty() {
            continue;
        }
        let (code, path) = line
            .split_once(' ')
            .ok_or_else(|| HgSccError::parse(line, "expected '<code> <path>'"))?;
        let resolved = match code {
            "R" => true,
            "U" => false,
            other => {
                return Err(HgSccError::parse(
                    line,
                    format!("unknown resolve state '{other}'"),
                ))
            }
        };
        records.push(ResolveRecord {
            path: path.to_string(),
            resolved,
        });
    }
    Ok(records)
}

/// Working-directory pseudo revision hg reports for uncommitted content
const WORKING_DIRECTORY_REV: i64 = 2147483647;

/// One item of `hg grep -T json`
#[derive(Deserialize)]
struct GrepItem {
    #[serde(alias = "filename")]
    path: String,
    #[serde(default)]
    rev: Option<i64>,
    #[serde(alias = "lineno", alias = "linenumber")]
    line_number: u32,
    #[serde(default)]
    texts: Vec<GrepText>,
}

#[derive(Deserialize)]
struct GrepText {
    text: String,
}

/// Incremental parser for `hg grep --line-number -T json`.
///
/// hg prints a JSON array with one object per match, each spread over
/// several lines between a `{` line and a `}` / `},` line. Lines are fed as
/// they arrive and a [`GrepMatch`] is produced when an object closes, so
/// matches stream without waiting for the whole array.
#[derive(Debug, Default)]
pub struct GrepStream {
    item: Option<String>,
}

impl GrepStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one output line
    pub fn push_line(&mut self, line: &str) -> Result<Option<GrepMatch>> {
        let trimmed = line.trim();
        let Some(buffer) = self.item.as_mut() else {
            return match trimmed {
                "" | "[" | "]" | "[]" => Ok(None),
                "{" => {
                    self.item = Some(String::from("{"));
                    Ok(None)
                }
                _ => Err(HgSccError::parse(line, "expected a grep result object")),
            };
        };

        if trimmed == "}" || trimmed == "}," {
            buffer.push('}');
            let object = std::mem::take(buffer);
            self.item = None;
            return parse_grep_item(&object).map(Some);
        }
        buffer.push_str(trimmed);
        Ok(None)
    }

    /// Check that the output did not stop inside an object
    pub fn finish(self) -> Result<()> {
        match self.item {
            Some(partial) => Err(HgSccError::parse(partial, "unterminated grep result")),
            None => Ok(()),
        }
    }
}

/// Parse one complete grep result object
pub fn parse_grep_item(object: &str) -> Result<GrepMatch> {
    let item: GrepItem =
        serde_json::from_str(object).map_err(|e| HgSccError::parse(object, e.to_string()))?;
    let revision = item
        .rev
        .filter(|rev| (0..WORKING_DIRECTORY_REV).contains(rev));
    Ok(GrepMatch {
        path: item.path,
        revision,
        line_number: item.line_number,
        text: item.texts.into_iter().map(|t| t.text).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_with_copy_source() {
        let records = parse_status(["M file1.txt", "A file2.txt", "  file3.txt"]).unwrap();
        assert_eq!(
            records,
            vec![
                FileStatusRecord::new("file1.txt", HgStatus::Modified),
                FileStatusRecord::copied("file2.txt", "file3.txt"),
            ]
        );
    }

    #[test]
    fn test_status_all_codes() {
        let lines = [
            "M a", "A b", "R c", "! d", "? e", "I f", "C g",
        ];
        let statuses: Vec<HgStatus> = parse_status(lines)
            .unwrap()
            .into_iter()
            .map(|r| r.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                HgStatus::Modified,
                HgStatus::Added,
                HgStatus::Removed,
                HgStatus::Deleted,
                HgStatus::NotTracked,
                HgStatus::Ignored,
                HgStatus::Clean,
            ]
        );
    }

    #[test]
    fn test_status_path_with_spaces() {
        let records = parse_status(["? dir/my notes.txt"]).unwrap();
        assert_eq!(records[0].path, "dir/my notes.txt");
    }

    #[test]
    fn test_status_added_without_copy_source() {
        let records = parse_status(["A new.txt", "M other.txt"]).unwrap();
        assert_eq!(records[0].copied_from, None);
        assert_eq!(records[1].status, HgStatus::Modified);
    }

    #[test]
    fn test_status_unknown_code_is_error() {
        let err = parse_status(["M ok.txt", "X bad.txt"]).unwrap_err();
        assert!(matches!(err, HgSccError::ParseError { ref line, .. } if line == "X bad.txt"));
    }

    #[test]
    fn test_status_orphan_copy_source_is_error() {
        assert!(parse_status(["M file.txt", "  source.txt"]).is_err());
        assert!(parse_status(["  source.txt"]).is_err());
    }

    #[test]
    fn test_status_missing_separator_is_error() {
        assert!(parse_status(["Mfile.txt"]).is_err());
        assert!(parse_status(["M "]).is_err());
    }

    #[test]
    fn test_tracked_files() {
        let records = parse_tracked_files(["a.txt", "", "src/b.rs"]);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.status == HgStatus::Tracked));
    }

    fn changeset_block(rev: i64, desc: &[&str], added: &str, touched: &str, removed: &str) -> Vec<String> {
        let mut lines = vec![
            "==:".to_string(),
            "date: 2024-01-15 10:30:12 +0100".to_string(),
            "author: Test User <test@example.com>".to_string(),
            "branch: default".to_string(),
            "tags: tip".to_string(),
            format!("rev: {rev}"),
            format!("node: {:040}", rev),
            format!("desc: {}", desc[0]),
        ];
        lines.extend(desc[1..].iter().map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("\t{l}")
            }
        }));
        lines.push(format!("A: {added}"));
        lines.push(format!("M: {touched}"));
        lines.push(format!("R: {removed}"));
        lines
    }

    #[test]
    fn test_changeset_fields() {
        let lines = changeset_block(7, &["Add parser"], "a.txt", "a.txt:b.txt", "");
        let changesets = parse_changesets(&lines).unwrap();
        assert_eq!(changesets.len(), 1);

        let cs = &changesets[0];
        assert_eq!(cs.revision, 7);
        assert_eq!(cs.id.len(), 40);
        assert_eq!(cs.author, "Test User <test@example.com>");
        assert_eq!(cs.branch, "default");
        assert_eq!(cs.tags, vec!["tip"]);
        assert_eq!(cs.description, "Add parser");
        assert_eq!(cs.date.to_rfc3339(), "2024-01-15T10:30:12+01:00");
        assert_eq!(cs.files_added, vec![FileStatusRecord::new("a.txt", HgStatus::Added)]);
        assert_eq!(cs.files_modified, vec![FileStatusRecord::new("b.txt", HgStatus::Modified)]);
        assert!(cs.files_removed.is_empty());
    }

    #[test]
    fn test_modified_excludes_added_and_removed() {
        let lines = changeset_block(
            2,
            &["Rename and edit"],
            "new.txt",
            "changed.txt:new.txt:old.txt",
            "old.txt",
        );
        let cs = &parse_changesets(&lines).unwrap()[0];
        let modified: Vec<&str> = cs.files_modified.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(modified, vec!["changed.txt"]);
        assert_eq!(cs.files_added[0].path, "new.txt");
        assert_eq!(cs.files_removed[0].path, "old.txt");
    }

    #[test]
    fn test_multiline_description_with_blank_line() {
        let lines = changeset_block(1, &["Summary", "", "Body line one", "Body line two"], "", "x", "");
        let cs = &parse_changesets(&lines).unwrap()[0];
        assert_eq!(cs.description, "Summary\n\nBody line one\nBody line two");
        assert_eq!(cs.summary(), "Summary");
    }

    #[test]
    fn test_multiple_blocks_keep_order() {
        let mut lines = changeset_block(5, &["five"], "", "a", "");
        lines.extend(changeset_block(4, &["four"], "", "b", ""));
        let revisions: Vec<i64> = parse_changesets(&lines)
            .unwrap()
            .iter()
            .map(|c| c.revision)
            .collect();
        assert_eq!(revisions, vec![5, 4]);
    }

    #[test]
    fn test_empty_log_output() {
        let lines: Vec<String> = Vec::new();
        assert!(parse_changesets(&lines).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_changeset_field_is_error() {
        let mut lines = changeset_block(1, &["msg"], "", "", "");
        lines.push("X: weird".to_string());
        let err = parse_changesets(&lines).unwrap_err();
        assert!(err.to_string().contains("unknown changeset field"));
    }

    #[test]
    fn test_changeset_without_revision_is_error() {
        let lines = ["==:", "date: 2024-01-15 10:30:12 +0100", "node: abc"];
        assert!(parse_changesets(lines).is_err());
    }

    #[test]
    fn test_content_before_sentinel_is_error() {
        assert!(parse_changesets(["rev: 1"]).is_err());
    }

    #[test]
    fn test_continuation_outside_description_is_error() {
        let lines = ["==:", "author: someone", "\tstray"];
        assert!(parse_changesets(lines).is_err());
    }

    #[test]
    fn test_invalid_date_is_error() {
        let lines = ["==:", "date: yesterday", "rev: 1", "node: abc"];
        assert!(parse_changesets(lines).is_err());
    }

    #[test]
    fn test_tags() {
        let tags = parse_tags([
            "tip                                3:0123456789ab",
            "release 1.0                        2:abcdef012345",
            "wip                                1:fedcba987654 (local)",
        ])
        .unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].name, "tip");
        assert_eq!(tags[0].revision, 3);
        assert_eq!(tags[1].name, "release 1.0");
        assert_eq!(tags[1].node, "abcdef012345");
        assert!(tags[2].local);
        assert!(!tags[0].local);
    }

    #[test]
    fn test_branches() {
        let branches = parse_branches([
            "default                        5:0123456789ab",
            "stable                         3:abcdef012345 (inactive)",
            "old                            1:fedcba987654 (closed)",
        ])
        .unwrap();
        assert_eq!(branches[0].state, BranchState::Active);
        assert_eq!(branches[1].state, BranchState::Inactive);
        assert_eq!(branches[2].state, BranchState::Closed);
        assert_eq!(branches[2].name, "old");
    }

    #[test]
    fn test_bookmarks() {
        let bookmarks = parse_bookmarks([
            " * feature                   4:0123456789ab",
            "   hotfix                    2:abcdef012345",
        ])
        .unwrap();
        assert!(bookmarks[0].active);
        assert_eq!(bookmarks[0].name, "feature");
        assert!(!bookmarks[1].active);
        assert_eq!(bookmarks[1].revision, 2);

        assert!(parse_bookmarks(["no bookmarks set"]).unwrap().is_empty());
    }

    #[test]
    fn test_named_revision_without_node_is_error() {
        assert!(parse_tags(["tip"]).is_err());
        assert!(parse_branches(["default 5"]).is_err());
    }

    #[test]
    fn test_resolve_list() {
        let records = parse_resolve_list(["U src/main.rs", "R README.md"]).unwrap();
        assert_eq!(
            records,
            vec![
                ResolveRecord {
                    path: "src/main.rs".to_string(),
                    resolved: false
                },
                ResolveRecord {
                    path: "README.md".to_string(),
                    resolved: true
                },
            ]
        );
        assert!(parse_resolve_list(["Z file"]).is_err());
    }

    fn grep_output(lines: &[&str]) -> Result<Vec<GrepMatch>> {
        let mut stream = GrepStream::new();
        let mut found = Vec::new();
        for line in lines {
            if let Some(m) = stream.push_line(line)? {
                found.push(m);
            }
        }
        stream.finish()?;
        Ok(found)
    }

    #[test]
    fn test_grep_history_matches() {
        let found = grep_output(&[
            "[",
            " {",
            "  \"date\": [1709290800, 0],",
            "  \"lineno\": 40,",
            "  \"node\": \"914fa752cdea87777ac1a8d5c858b0c736218f6c\",",
            "  \"path\": \"src/lib.rs\",",
            "  \"rev\": 12,",
            "  \"texts\": [{\"matched\": false, \"text\": \"fn \"}, {\"matched\": true, \"text\": \"main\"}, {\"matched\": false, \"text\": \"() { a:b }\"}],",
            "  \"user\": \"dev\"",
            " },",
            " {",
            "  \"lineno\": 2,",
            "  \"path\": \"b.rs\",",
            "  \"rev\": 11,",
            "  \"texts\": [{\"matched\": true, \"text\": \"main\"}]",
            " }",
            "]",
        ])
        .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].path, "src/lib.rs");
        assert_eq!(found[0].revision, Some(12));
        assert_eq!(found[0].line_number, 40);
        assert_eq!(found[0].text, "fn main() { a:b }");
        assert_eq!(found[1].revision, Some(11));
    }

    #[test]
    fn test_grep_text_starting_with_digits_and_colon() {
        let m = parse_grep_item(
            r#"{"line_number": 3, "path": "notes.txt", "texts": [{"matched": true, "text": "12:30 standup"}]}"#,
        )
        .unwrap();
        assert_eq!(m.path, "notes.txt");
        assert_eq!(m.revision, None);
        assert_eq!(m.line_number, 3);
        assert_eq!(m.text, "12:30 standup");
    }

    #[test]
    fn test_grep_working_directory_revision_is_none() {
        let m = parse_grep_item(
            r#"{"linenumber": 1, "path": "a.txt", "rev": 2147483647, "texts": [{"text": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(m.revision, None);
    }

    #[test]
    fn test_grep_empty_result() {
        assert!(grep_output(&["[", "]"]).unwrap().is_empty());
        assert!(grep_output(&["[]"]).unwrap().is_empty());
    }

    #[test]
    fn test_grep_malformed_output() {
        assert!(grep_output(&["notes.txt:3:todo"]).is_err());
        assert!(grep_output(&["[", " {", "  \"path\": \"a.txt\"", " }", "]"]).is_err());
        assert!(grep_output(&["[", " {", "  \"lineno\": 1,"]).is_err());
    }
}
