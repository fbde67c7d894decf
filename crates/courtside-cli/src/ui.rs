//! UI helpers for CLI display.

use console::style;

/// Check if color output is disabled via `NO_COLOR` env var.
#[must_use]
pub fn is_color_disabled() -> bool {
    std::env::var("NO_COLOR").is_ok()
}

/// Style a summary line for stdout.
#[must_use]
pub fn summary(text: &str) -> String {
    if is_color_disabled() {
        format!("=== {text} ===")
    } else {
        style(format!("=== {text} ===")).bold().cyan().to_string()
    }
}

/// Style a success line for stdout.
#[must_use]
pub fn success(text: &str) -> String {
    if is_color_disabled() {
        format!("[OK] {text}")
    } else {
        format!("{} {text}", style("[OK]").green().bold())
    }
}

/// Style an error line for stderr.
#[must_use]
pub fn error(text: &str) -> String {
    if is_color_disabled() {
        format!("[ERROR] {text}")
    } else {
        format!("{} {text}", style("[ERROR]").for_stderr().red().bold())
    }
}
