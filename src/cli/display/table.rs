//! Table builder wrapper around comfy-table for consistent list display.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;
use serde_json::{Map, Value};

use super::truncate;

const MAX_CELL_WIDTH: usize = 40;

/// Create a standard list table with the given headers.
///
/// Uses the NOTHING preset (no borders) for a clean CLI aesthetic.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Table of arbitrary JSON records.
///
/// Columns come from the first record's keys; nested objects and
/// arrays are shown compactly.
pub fn record_table(records: &[Value]) -> Table {
    let columns: Vec<&str> = records
        .first()
        .and_then(Value::as_object)
        .map(|obj| obj.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let mut table = list_table(&columns);
    for record in records {
        let empty = Map::new();
        let obj = record.as_object().unwrap_or(&empty);
        table.add_row(
            columns
                .iter()
                .map(|col| Cell::new(truncate(&cell_text(obj.get(*col)), MAX_CELL_WIDTH))),
        );
    }
    table
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Render the table to string with a count header.
pub fn render_list(entity_name: &str, table: &Table, total: u64) -> String {
    if total == 0 {
        return format!("No {entity_name} found.");
    }
    let noun = if total == 1 {
        entity_name.to_string()
    } else {
        format!("{entity_name}s")
    };
    format!("{} {}:\n{}", style(total).bold(), noun, table)
}
