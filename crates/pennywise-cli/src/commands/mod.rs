//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (load_config, open_store, open_ai)
//! - `forecast` - Predictions and AI recommendations
//! - `import` - CSV import of transactions and accounts
//! - `serve` - Web server command
//! - `template` - Sample CSV output
//! - `transactions` - Manual entry, transaction and account listings

pub mod core;
pub mod forecast;
pub mod import;
pub mod serve;
pub mod template;
pub mod transactions;

// Re-export command functions for main.rs
pub use core::*;
pub use forecast::*;
pub use import::*;
pub use serve::*;
pub use template::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Color an amount for terminal output: red for money out, green for money in
pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("\x1b[31m${:.2}\x1b[0m", amount.abs())
    } else {
        format!("\x1b[32m+${:.2}\x1b[0m", amount)
    }
}
