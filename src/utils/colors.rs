// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Terminal color utilities
//!
//! Provides consistent status markers across the CLI.

use colored::Colorize;
use std::io::IsTerminal;

/// Disable colors when NO_COLOR is set or stdout is not a terminal
pub fn configure_colors() {
    if !colors_wanted(std::env::var_os("NO_COLOR").is_some(), std::io::stdout().is_terminal()) {
        colored::control::set_override(false);
    }
}

fn colors_wanted(no_color: bool, terminal: bool) -> bool {
    !no_color && terminal
}

/// Print a styled header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "═".repeat(title.chars().count().max(40)));
}

/// Print a styled section
pub fn print_section(title: &str) {
    println!();
    println!("{}:", title.bold());
}

/// Print a key/value line
pub fn print_field(key: &str, value: impl std::fmt::Display) {
    println!("  {:<10} {}", format!("{}:", key), value);
}

/// Print a success check
pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print an error cross
pub fn print_error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a warning
pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an info item
pub fn print_info(msg: &str) {
    println!("  {} {}", "→".blue(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_need_a_terminal() {
        assert!(colors_wanted(false, true));
        assert!(!colors_wanted(false, false));
        assert!(!colors_wanted(true, true));
    }
}
