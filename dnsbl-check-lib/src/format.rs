//! Rendering of lookup outcomes.
//!
//! The text format is one tab separated line per outcome:
//!
//! ```text
//! OK      <address>  <provider>
//! FAIL    <address>  <provider>  <reason or "unknown reason">
//! ERR     <address>  <provider>  <error message>
//! ```
//!
//! A reason-fetch failure on a listed address is not shown; the line
//! falls back to "unknown reason".

use crate::types::{LookupOutcome, OutcomeStatus, OutputFormat};

/// Placeholder shown for listed addresses without a reason.
pub const UNKNOWN_REASON: &str = "unknown reason";

/// Header row for CSV output.
pub const CSV_HEADER: &str = "status,address,provider,detail";

/// Human readable detail column: reason, error message or nothing.
///
/// The result is always a single line with no tabs, so it can sit in the
/// last field of a text line.
pub fn detail(outcome: &LookupOutcome) -> Option<String> {
    match &outcome.status {
        OutcomeStatus::Clean => None,
        OutcomeStatus::Listed { reason, .. } => {
            let reason = one_line(reason);
            if reason.is_empty() {
                Some(UNKNOWN_REASON.to_string())
            } else {
                Some(reason)
            }
        }
        OutcomeStatus::Error(err) => Some(one_line(&err.to_string())),
    }
}

/// Replace control characters with spaces and collapse runs of whitespace.
fn one_line(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render an outcome as a tab separated text line.
pub fn render_line(outcome: &LookupOutcome) -> String {
    let mut line = format!(
        "{}\t{}\t{}",
        outcome.kind(),
        one_line(&outcome.address),
        one_line(&outcome.provider)
    );
    if let Some(detail) = detail(outcome) {
        line.push('\t');
        line.push_str(&detail);
    }
    line
}

/// Render an outcome as a single line JSON object.
pub fn render_json(outcome: &LookupOutcome) -> String {
    // Serialising a plain struct of strings and integers cannot fail.
    serde_json::to_string(outcome).unwrap_or_default()
}

/// Render an outcome as a CSV row matching [`CSV_HEADER`].
pub fn render_csv_row(outcome: &LookupOutcome) -> String {
    [
        outcome.kind().tag().to_string(),
        outcome.address.clone(),
        outcome.provider.clone(),
        detail(outcome).unwrap_or_default(),
    ]
    .iter()
    .map(|field| csv_field(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// Render an outcome in the requested format.
pub fn render(outcome: &LookupOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_line(outcome),
        OutputFormat::Json => render_json(outcome),
        OutputFormat::Csv => render_csv_row(outcome),
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
