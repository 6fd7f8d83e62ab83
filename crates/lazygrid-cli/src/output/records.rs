//! Record output formatting.

use lazygrid_store::{Record, Schema, Value};
use owo_colors::OwoColorize;
use serde::Serialize;

use super::helpers::{format_cell, format_neighbour, format_page_footer, paint_cell};

/// Paging details for one printed page.
#[derive(Debug, Clone, Copy)]
pub struct PageInfo {
    /// Page number, starting at 1.
    pub page: u64,
    /// Requested records per page.
    pub page_size: usize,
    /// Number of matching records, after the cap.
    pub total: usize,
}

impl PageInfo {
    /// Whether more records follow this page.
    pub fn has_more(&self, shown: usize) -> bool {
        let before = usize::try_from(self.page.saturating_sub(1))
            .unwrap_or(usize::MAX)
            .saturating_mul(self.page_size);
        before.saturating_add(shown) < self.total
    }
}

/// JSON output structure for the list command.
#[derive(Serialize)]
pub struct ListOutput {
    pub records: Vec<serde_json::Value>,
    pub page: u64,
    pub page_size: usize,
    pub total: usize,
    pub has_more: bool,
}

/// JSON output structure for the count command.
#[derive(Serialize)]
pub struct CountOutput<'a> {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
}

/// JSON output structure for the nav command.
#[derive(Serialize)]
pub struct NavOutput {
    pub id: serde_json::Value,
    pub previous: Option<serde_json::Value>,
    pub next: Option<serde_json::Value>,
}

/// Column order for a schema: primary key first, then every other property.
pub fn columns(schema: &Schema) -> Vec<&str> {
    std::iter::once(schema.primary_key.as_str())
        .chain(
            schema
                .properties
                .keys()
                .map(String::as_str)
                .filter(|path| *path != schema.primary_key),
        )
        .collect()
}

/// Formats a page of records as JSON.
pub fn format_records_json(records: &[Record], info: PageInfo) -> Result<String, serde_json::Error> {
    let output = ListOutput {
        records: records.iter().map(Record::to_json).collect(),
        page: info.page,
        page_size: info.page_size,
        total: info.total,
        has_more: info.has_more(records.len()),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats a page of records as a table.
pub fn format_records_table(
    records: &[Record],
    schema: &Schema,
    info: PageInfo,
    use_colors: bool,
) -> String {
    if records.is_empty() {
        return if info.total == 0 {
            "No records found.\n".to_string()
        } else {
            format!("No records on page {}.\n", info.page)
        };
    }

    let columns = columns(schema);
    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| format_cell(record.get(column)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();

    // Header
    let header = columns
        .iter()
        .zip(&widths)
        .map(|(column, &width)| format!("{column:<width$}"))
        .collect::<Vec<_>>()
        .join(" ");
    let header = header.trim_end();
    if use_colors {
        output.push_str(&format!("{}\n", header.bold()));
    } else {
        output.push_str(header);
        output.push('\n');
    }

    // Rows
    for row in &cells {
        let line = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, width))| paint_cell(cell, *width, i == 0, use_colors))
            .collect::<Vec<_>>()
            .join(" ");
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output.push('\n');
    output.push_str(&format_page_footer(info.page, info.page_size, info.total, use_colors));
    output.push('\n');
    output
}

/// Formats a count result as JSON.
pub fn format_count_json(
    count: usize,
    filter: Option<&str>,
    max_results: Option<usize>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&CountOutput {
        count,
        filter,
        max_results,
    })
}

/// Formats the neighbours of a record as JSON.
pub fn format_nav_json(
    id: &Value,
    previous: Option<&Value>,
    next: Option<&Value>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&NavOutput {
        id: id.to_json(),
        previous: previous.map(Value::to_json),
        next: next.map(Value::to_json),
    })
}

/// Formats the neighbours of a record for the terminal.
pub fn format_nav_table(
    id: &Value,
    previous: Option<&Value>,
    next: Option<&Value>,
    use_colors: bool,
) -> String {
    let current = if use_colors {
        id.to_string().bold().to_string()
    } else {
        id.to_string()
    };
    format!(
        "Previous: {}\nCurrent:  {}\nNext:     {}\n",
        format_neighbour(previous, use_colors),
        current,
        format_neighbour(next, use_colors)
    )
}
