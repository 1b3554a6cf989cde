//! Output formatting utilities for consistent CLI presentation.
//!
//! Red for errors, green for success, white for plain information. Messages
//! are framed by blank lines so consecutive command outputs stay readable.

use colored::*;
use serde::Serialize;

/// Prints `✕ Error: <message>` framed by blank lines
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Prints `✓ <message>` after a blank line
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Prints `<header>:` framed by blank lines
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// Prints `value` as pretty JSON, for `--json`
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> crate::core::error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
