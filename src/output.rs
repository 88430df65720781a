//! Console Output
//!
//! Renders row sets as UTF-8 tables. Any `Serialize` row works: its fields
//! become columns in declaration order and `None` renders as `null`.

use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::Result;

/// Printed instead of a table when a listing is empty
pub const EMPTY_TABLE: &str = "No rows to display.";

/// Render rows as a table
///
/// Fails with `OutputFailed` when a row cannot be serialized.
pub fn render_table<T: Serialize>(rows: &[T]) -> Result<String> {
    let records = rows.iter().map(to_record).collect::<Result<Vec<_>>>()?;

    let Some(first) = records.first() else {
        return Ok(EMPTY_TABLE.to_string());
    };

    let headers: Vec<String> = first.keys().cloned().collect();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(headers.clone());

    for record in &records {
        let cells: Vec<String> = headers
            .iter()
            .map(|header| record.get(header).map_or_else(String::new, format_value))
            .collect();
        table.add_row(cells);
    }

    Ok(table.to_string())
}

/// Money amounts: whole numbers without a fraction, otherwise two decimals
#[must_use]
pub fn format_amount(amount: f64) -> String {
    // -0.0 (an empty f64 sum, for one) prints as "-0"
    let amount = if amount == 0.0 { 0.0 } else { amount };
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

fn to_record<T: Serialize>(row: &T) -> Result<Map<String, Value>> {
    Ok(match serde_json::to_value(row)? {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    })
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(n),
        other => other.to_string(),
    }
}

fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    n.as_f64().map_or_else(|| n.to_string(), format_amount)
}
