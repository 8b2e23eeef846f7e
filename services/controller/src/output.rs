//! Output formatting for CLI commands.

use alias_model::{ObservedAlias, SpecHash};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::reconciler::OutcomeSummary;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

/// One row of a field/value table.
#[derive(Debug, Serialize, Tabled)]
pub struct FieldRow {
    #[tabled(rename = "FIELD")]
    pub field: String,

    #[tabled(rename = "VALUE")]
    pub value: String,
}

impl FieldRow {
    fn new(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Flatten an observed alias into table rows.
pub fn observed_rows(observed: &ObservedAlias) -> Vec<FieldRow> {
    let mut rows = vec![
        FieldRow::new("Function", observed.function_name.as_str()),
        FieldRow::new("Alias", observed.name.as_str()),
    ];

    match &observed.function_event_invoke_config {
        Some(config) => {
            let destinations = config.destination_config.as_ref();
            rows.push(FieldRow::new(
                "OnFailure",
                or_dash(
                    destinations
                        .and_then(|d| d.on_failure.as_ref())
                        .and_then(|d| d.destination.as_deref()),
                ),
            ));
            rows.push(FieldRow::new(
                "OnSuccess",
                or_dash(
                    destinations
                        .and_then(|d| d.on_success.as_ref())
                        .and_then(|d| d.destination.as_deref()),
                ),
            ));
            rows.push(FieldRow::new(
                "MaximumEventAgeInSeconds",
                or_dash(config.maximum_event_age_in_seconds),
            ));
            rows.push(FieldRow::new(
                "MaximumRetryAttempts",
                or_dash(config.maximum_retry_attempts),
            ));
        }
        None => rows.push(FieldRow::new("EventInvokeConfig", "none")),
    }

    rows.push(FieldRow::new(
        "ProvisionedConcurrentExecutions",
        match &observed.provisioned_concurrency_config {
            Some(config) => or_dash(config.provisioned_concurrent_executions),
            None => "none".to_string(),
        },
    ));

    rows.push(FieldRow::new("Hash", SpecHash::of(observed).to_string()));
    rows
}

/// Print an observed alias in the specified format.
pub fn print_observed(observed: &ObservedAlias, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", Table::new(observed_rows(observed))),
        OutputFormat::Json => print_json(observed),
    }
}

/// Print the summary of a reconciliation pass.
pub fn print_outcome(summary: &OutcomeSummary, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if summary.changed.is_empty() {
                print_success(&format!("{} already converged", summary.alias));
                return;
            }

            let mut rows = vec![FieldRow::new("Changed", summary.changed.join(", "))];
            rows.push(FieldRow::new(
                "EventInvokeConfig",
                or_dash(summary.event_invoke_config.as_deref()),
            ));
            rows.push(FieldRow::new(
                "ProvisionedConcurrency",
                or_dash(summary.provisioned_concurrency.as_deref()),
            ));
            println!("{}", Table::new(rows));

            if summary.status == "converged" {
                print_success(&format!("{} converged", summary.alias));
            } else {
                print_warning(&format!("{} still differs after sync", summary.alias));
            }
        }
        OutputFormat::Json => print_json(summary),
    }
}

fn print_json<T: Serialize>(data: &T) {
    let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
    println!("{}", json);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "Warning:".yellow().bold(), message);
}

/// Print an error with its cause chain to stderr.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
    }
}
