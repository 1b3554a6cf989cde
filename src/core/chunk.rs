//! Splitting long file lists across several hg invocations.
//!
//! Command lines have a platform limit, so operations that take a file list
//! pack the files into chunks whose rendered length stays under
//! [`DEFAULT_MAX_COMMAND_LENGTH`] (or the configured value) and run one
//! process per chunk. The invoker itself never splits.

/// Historical limit for one hg command line, in characters
pub const DEFAULT_MAX_COMMAND_LENGTH: usize = 30_000;

/// Length of an argument once rendered on a command line, quoting included
pub fn argument_length(arg: &str) -> usize {
    let needs_quotes = arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"');
    if needs_quotes {
        arg.len() + 2 + arg.matches('"').count()
    } else {
        arg.len()
    }
}

/// Pack `items` into chunks so that `base_length` plus every item and its
/// separating space fits in `max_length`.
///
/// Items keep their order. An item that does not fit even in an empty chunk
/// gets a chunk of its own.
pub fn chunk_arguments(base_length: usize, items: &[String], max_length: usize) -> Vec<Vec<String>> {
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_length = base_length;

    for item in items {
        let item_length = argument_length(item) + 1;
        if !current.is_empty() && current_length + item_length > max_length {
            chunks.push(std::mem::take(&mut current));
            current_length = base_length;
        }
        current.push(item.clone());
        current_length += item_length;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
