use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Global output format setting
static OUTPUT_JSON: AtomicBool = AtomicBool::new(false);

pub fn set_json_output(json: bool) {
    OUTPUT_JSON.store(json, Ordering::Relaxed);
}

pub fn is_json_output() -> bool {
    OUTPUT_JSON.load(Ordering::Relaxed)
}

/// Print a table or JSON depending on output mode
pub fn print_table<T, R, F>(items: &[T], to_row: F)
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }
}

/// Print a single item or JSON depending on output mode
pub fn print_item<T: Serialize>(item: &T, display: impl FnOnce(&T)) {
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
    } else {
        display(item);
    }
}

/// Print a message (skipped in JSON mode, or prints simple object)
pub fn print_message(message: &str) {
    if is_json_output() {
        println!("{}", serde_json::json!({ "message": message }));
    } else {
        println!("{message}");
    }
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Show only the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return "-".to_string();
    }
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Implement user authentication", 12), "Implement...");
        assert_eq!(truncate("ünïcödé ünïcödé", 8), "ünïcö...");
    }

    #[test]
    fn mask_secret_keeps_last_four() {
        assert_eq!(mask_secret(""), "-");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret("sk-or-12345678"), "**********5678");
    }
}
