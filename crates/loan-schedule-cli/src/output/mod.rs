pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use clap::ValueEnum;
use serde_json::Value;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Keys whose value is a list of records worth printing as rows.
const ROW_KEYS: [&str; 2] = ["lines", "rows"];

/// The first list of records inside the result, with its key.
pub(crate) fn result_rows(result: &serde_json::Map<String, Value>) -> Option<(&str, &[Value])> {
    ROW_KEYS.iter().find_map(|key| match result.get(*key) {
        Some(Value::Array(rows)) => Some((*key, rows.as_slice())),
        _ => None,
    })
}
