//! Output formatters for migration reports and mappings.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use ssm_migrate_core::{Mapping, MappingWarning, MigrationReport};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format a finished migration report.
    fn format_report(&self, report: &MigrationReport, warnings: &[MappingWarning]) -> String;

    /// Format a validated mapping.
    fn format_mapping(&self, mapping: &Mapping) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_report(&self, report: &MigrationReport, warnings: &[MappingWarning]) -> String {
        let mut table = Table::new();
        table.set_header(vec!["#", "Parameter", "Secret", "Status", "Detail"]);

        for item in report.items() {
            table.add_row(vec![
                Cell::new(item.index),
                Cell::new(&item.entry.source_key),
                Cell::new(&item.entry.destination_key),
                Cell::new(item.status),
                Cell::new(item.detail.as_deref().unwrap_or("")),
            ]);
        }

        let mut output = if report.items().is_empty() {
            "No entries".to_string()
        } else {
            table.to_string()
        };

        output.push('\n');
        output.push_str(&summary_line(report));
        push_warnings(&mut output, warnings);
        output
    }

    fn format_mapping(&self, mapping: &Mapping) -> String {
        let mut table = Table::new();
        table.set_header(vec!["#", "Parameter", "Secret"]);

        for (index, entry) in mapping.entries().iter().enumerate() {
            table.add_row(vec![
                Cell::new(index),
                Cell::new(&entry.source_key),
                Cell::new(&entry.destination_key),
            ]);
        }

        let mut output = table.to_string();
        output.push('\n');
        output.push_str(&format!("{} entr{} valid", mapping.len(), plural_y(mapping.len())));
        push_warnings(&mut output, mapping.warnings());
        output
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_report(&self, report: &MigrationReport, warnings: &[MappingWarning]) -> String {
        let value = serde_json::json!({
            "report": report,
            "warnings": warnings,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_mapping(&self, mapping: &Mapping) -> String {
        let value = serde_json::json!({
            "entries": mapping.entries(),
            "warnings": mapping.warnings(),
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }
}

/// CSV formatter. Warnings and the summary go to the log, not the CSV body.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_report(&self, report: &MigrationReport, _warnings: &[MappingWarning]) -> String {
        let mut output = String::from("index,parameter,secret,status,retryable,detail");
        for item in report.items() {
            output.push('\n');
            output.push_str(&format!(
                "{},\"{}\",\"{}\",{},{},\"{}\"",
                item.index,
                escape_csv(&item.entry.source_key),
                escape_csv(&item.entry.destination_key),
                item.status,
                item.retryable,
                escape_csv(item.detail.as_deref().unwrap_or("")),
            ));
        }
        output
    }

    fn format_mapping(&self, mapping: &Mapping) -> String {
        let mut output = String::from("index,parameter,secret");
        for (index, entry) in mapping.entries().iter().enumerate() {
            output.push('\n');
            output.push_str(&format!(
                "{},\"{}\",\"{}\"",
                index,
                escape_csv(&entry.source_key),
                escape_csv(&entry.destination_key),
            ));
        }
        output
    }
}

fn summary_line(report: &MigrationReport) -> String {
    let counts = report.counts();
    let mut line = format!(
        "{}: {} succeeded, {} already existed, {} failed ({} retryable)",
        report.status(),
        counts.succeeded,
        counts.already_exists,
        counts.failed,
        counts.retryable,
    );
    if counts.cancelled > 0 {
        line.push_str(&format!(", {} cancelled", counts.cancelled));
    }
    if report.is_strict() {
        line.push_str(" [strict]");
    }
    if report.is_dry_run() {
        line.push_str(" [dry run]");
    }
    line
}

fn push_warnings(output: &mut String, warnings: &[MappingWarning]) {
    for warning in warnings {
        output.push_str("\nwarning: ");
        output.push_str(&warning.to_string());
    }
}

fn plural_y(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}

/// Escape a string for CSV (double quotes).
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}
