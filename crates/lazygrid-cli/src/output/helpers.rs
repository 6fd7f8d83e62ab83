//! Common helper functions for output formatting.

use lazygrid_store::Value;
use owo_colors::OwoColorize;

/// Widest a table cell is allowed to get.
pub const MAX_CELL_WIDTH: usize = 24;

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Renders a value as a table cell, without padding.
pub fn format_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(value) => truncate_str(&value.to_string(), MAX_CELL_WIDTH),
    }
}

/// Pads a cell to `width`, coloring keys and dimming empty cells.
pub fn paint_cell(cell: &str, width: usize, is_key: bool, use_colors: bool) -> String {
    let padded = format!("{cell:<width$}");
    if !use_colors {
        return padded;
    }
    if is_key {
        padded.cyan().to_string()
    } else if cell.is_empty() {
        format!("{:<width$}", "-").dimmed().to_string()
    } else {
        padded
    }
}

/// Formats a footer such as `Page 2 of 5 (42 records)`.
pub fn format_page_footer(page: u64, page_size: usize, total: usize, use_colors: bool) -> String {
    let pages = total.div_ceil(page_size.max(1)).max(1);
    let noun = if total == 1 { "record" } else { "records" };
    let footer = format!("Page {page} of {pages} ({total} {noun})");
    if use_colors {
        footer.dimmed().to_string()
    } else {
        footer
    }
}

/// Formats an optional neighbour id for display.
pub fn format_neighbour(id: Option<&Value>, use_colors: bool) -> String {
    match id {
        Some(id) if use_colors => id.to_string().cyan().to_string(),
        Some(id) => id.to_string(),
        None if use_colors => "(none)".dimmed().to_string(),
        None => "(none)".to_string(),
    }
}
