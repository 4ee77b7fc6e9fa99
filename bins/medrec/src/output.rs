//! Terminal output utilities

use anyhow::{Context, Result};
use medrec_api_client::Record;
use medrec_core::Error as CoreError;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored
    Text,
    /// Pretty-printed JSON on stdout
    Json,
}

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a count with a noun, e.g. "1 record" or "3 records"
pub fn format_count(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Print a list of records under a header
pub fn print_records(
    title: &str,
    records: &[Record],
    noun: &str,
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(records);
    }

    Status::header(title);
    if records.is_empty() {
        Status::info(&format!("No {noun}s found"));
        return Ok(());
    }
    for record in records {
        println!("  {}  {}", record_label(record).cyan(), summary(record).dimmed());
    }
    println!();
    Status::info(&format_count(records.len(), noun));
    Ok(())
}

/// Print every field of one record
pub fn print_record(record: &Record, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(record);
    }

    Status::header(&record_label(record));
    match record.as_value() {
        Value::Object(fields) => {
            let width = fields.keys().map(|k| k.chars().count()).max().unwrap_or(0);
            for (key, value) in fields {
                println!("  {:<width$}  {}", key.bold(), display_value(value));
            }
        }
        other => println!("  {}", display_value(other)),
    }
    Ok(())
}

fn record_label(record: &Record) -> String {
    record.id().unwrap_or_else(|| "(no id)".to_string())
}

/// Up to three short scalar fields, skipping the identifier
fn summary(record: &Record) -> String {
    let Value::Object(fields) = record.as_value() else {
        return display_value(record.as_value());
    };

    fields
        .iter()
        .filter(|(key, _)| !medrec_api_client::record::ID_FIELDS.contains(&key.as_str()))
        .filter(|(_, value)| !value.is_object() && !value.is_array() && !value.is_null())
        .take(3)
        .map(|(key, value)| format!("{key}={}", display_value(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Parse a JSON argument; `@path` reads the JSON from a file
pub fn parse_json_arg(raw: &str) -> Result<Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON file {path}"))?,
        None => raw.to_string(),
    };
    serde_json::from_str(&text)
        .map_err(|e| CoreError::validation(format!("Invalid JSON argument: {e}")).into())
}

/// Parse a JSON argument that must be an object
pub fn parse_json_object(raw: &str) -> Result<Value> {
    let value = parse_json_arg(raw)?;
    if !value.is_object() {
        return Err(CoreError::validation("Expected a JSON object").into());
    }
    Ok(value)
}
