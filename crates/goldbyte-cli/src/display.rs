//! Display utilities for the CLI

use colored::*;
use goldbyte_types::{Amount, SignedAmount, TOKEN_SYMBOL};

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", "━".repeat(60).bright_black());
    println!(" {}", title.bright_white().bold());
    println!("{}", "━".repeat(60).bright_black());
}

/// Print a success message
pub fn success(message: &str) {
    println!("  {} {}", "✓".bright_green(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("  {} {}", "→".bright_blue(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("  {} {}", "⚠".yellow(), message.yellow());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("      {}: {}", key, value.bright_cyan());
}

/// Format a token amount, e.g. `99.93 GB`
pub fn gb(amount: Amount) -> String {
    format!("{} {}", amount, TOKEN_SYMBOL)
}

/// Format a signed position, colouring debts red
pub fn position(amount: SignedAmount) -> String {
    let text = format!("{} {}", amount.to_decimal_string(), TOKEN_SYMBOL);
    if amount.is_negative() {
        text.bright_red().to_string()
    } else {
        text.bright_green().to_string()
    }
}
