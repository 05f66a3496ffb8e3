//! Report export over completed step results.
//!
//! Three formats are produced: a human-readable Markdown document, a JSON
//! document that can be read back with [`parse_json_report`], and a CSV table.
//! Only results whose status is `completed` are included.

pub mod metrics;

pub use metrics::{estimate_tokens, DashboardMetrics};

use ap_protocol::result_models::StepResult;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid JSON report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown report format '{0}' (expected md, json or csv)")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Serialized shape of a JSON report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    /// RFC 3339 generation instant.
    pub report_generated: String,
    pub results: Vec<StepResult>,
}

fn completed(results: &[StepResult]) -> impl Iterator<Item = &StepResult> {
    results.iter().filter(|r| r.is_completed())
}

fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Render in the requested format, stamped with the current time.
pub fn render(format: ReportFormat, results: &[StepResult]) -> Result<String, ReportError> {
    let now = Utc::now();
    match format {
        ReportFormat::Markdown => Ok(to_markdown(results, now)),
        ReportFormat::Json => to_json(results, now),
        ReportFormat::Csv => Ok(to_csv(results)),
    }
}

pub fn to_markdown(results: &[StepResult], generated: DateTime<Utc>) -> String {
    let mut report = format!(
        "# AI Agent Pipeline Report\n\n**Generated:** {}\n\n---\n\n",
        generated.to_rfc3339_opts(SecondsFormat::Millis, true)
    );

    for result in completed(results) {
        let _ = write!(
            report,
            "## Step {}: {}\n\n\
             **Agent ID:** `{}`\n\
             **Timestamp:** {}\n\
             **Latency:** {:.2}s\n\n\
             ### Output\n\n```\n{}\n```\n\n---\n\n",
            result.step,
            result.agent_name,
            result.agent_id,
            format_timestamp(result.timestamp),
            result.latency.unwrap_or_default(),
            result.output,
        );
    }

    report
}

pub fn to_json(results: &[StepResult], generated: DateTime<Utc>) -> Result<String, ReportError> {
    let report = JsonReport {
        report_generated: generated.to_rfc3339_opts(SecondsFormat::Millis, true),
        results: completed(results).cloned().collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn parse_json_report(content: &str) -> Result<JsonReport, ReportError> {
    Ok(serde_json::from_str(content)?)
}

/// Column name and cell text for every field present on `result`, in
/// declaration order. Absent optional fields are left out.
fn csv_fields(result: &StepResult) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("step", result.step.to_string()),
        ("agent_id", result.agent_id.clone()),
        ("agent_name", result.agent_name.clone()),
        ("input", result.input.clone()),
        ("output", result.output.clone()),
        ("timestamp", result.timestamp.to_string()),
    ];
    if let Some(latency) = result.latency {
        fields.push(("latency", latency.to_string()));
    }
    if let Some(provider) = result.provider {
        fields.push(("provider", provider.to_string()));
    }
    fields.push(("status", result.status.to_string()));
    if let Some(error) = &result.error {
        fields.push(("error", error.clone()));
    }
    fields
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// CSV table of completed results. The header is taken from the first result;
/// every cell is quoted. Returns an empty string when nothing has completed.
pub fn to_csv(results: &[StepResult]) -> String {
    let rows: Vec<Vec<(&'static str, String)>> = completed(results).map(csv_fields).collect();
    let Some(first) = rows.first() else {
        return String::new();
    };

    let columns: Vec<&'static str> = first.iter().map(|(name, _)| *name).collect();
    let mut lines = vec![columns.join(",")];

    for row in &rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| {
                let value = row
                    .iter()
                    .find(|(name, _)| name == column)
                    .map_or("", |(_, value)| value.as_str());
                quote(value)
            })
            .collect();
        lines.push(cells.join(","));
    }

    lines.join("\n")
}
