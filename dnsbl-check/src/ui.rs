//! Pretty-mode display logic for dnsbl-check CLI.
//!
//! This module handles all `--pretty` output: colored result lines,
//! progress counters, headers and summaries, plus the plain `--summary`
//! line. Uses only the `console` crate.

use console::{pad_str, style, Alignment};
use dnsbl_check_lib::{detail, LookupOutcome, OutcomeStatus, Summary};
use std::io::{self, Write};
use std::time::Duration;

const ADDRESS_WIDTH: usize = 39;
const PROVIDER_WIDTH: usize = 28;

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a pretty run.
pub fn print_header<W: Write>(
    out: &mut W,
    address_count: usize,
    provider_count: usize,
    concurrency: usize,
) -> io::Result<()> {
    writeln!(
        out,
        "{} {} {}",
        style("dnsbl-check").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "| Checking {} address{} against {} list{}",
            address_count,
            if address_count == 1 { "" } else { "es" },
            provider_count,
            if provider_count == 1 { "" } else { "s" },
        ))
        .dim(),
    )?;
    writeln!(
        out,
        "{}",
        style(format!(
            "Lookups: {} | Concurrency: {}",
            address_count * provider_count,
            concurrency
        ))
        .dim()
    )?;
    writeln!(out)
}

// ── Single result line ───────────────────────────────────────────────────────

/// Format and print a single outcome with colors and alignment.
///
/// If `counter` is Some((current, total)), a progress prefix like `[3/8]` is shown.
/// With `debug`, a failed reason lookup on a listed address is shown too.
pub fn print_result<W: Write>(
    out: &mut W,
    outcome: &LookupOutcome,
    debug: bool,
    counter: Option<(usize, usize)>,
) -> io::Result<()> {
    writeln!(out, "{}", format_result(outcome, debug, counter))
}

fn format_result(outcome: &LookupOutcome, debug: bool, counter: Option<(usize, usize)>) -> String {
    let prefix = match counter {
        Some((cur, total)) => format!("{} ", style(format!("[{}/{}]", cur, total)).dim()),
        None => String::new(),
    };
    let address = pad_str(&outcome.address, ADDRESS_WIDTH, Alignment::Left, Some(".."));
    let provider = pad_str(&outcome.provider, PROVIDER_WIDTH, Alignment::Left, Some(".."));

    let verdict = match &outcome.status {
        OutcomeStatus::Clean => format!("{}", style("CLEAN").green().bold()),
        OutcomeStatus::Listed { reason_error, .. } => {
            let reason = detail(outcome).unwrap_or_default();
            let mut line = format!(
                "{}  {}",
                style("LISTED").red().bold(),
                style(reason).dim()
            );
            if let (true, Some(err)) = (debug, reason_error) {
                line.push_str(&format!("  {}", style(format!("({})", err)).yellow().dim()));
            }
            line
        }
        OutcomeStatus::Error(err) => {
            let message = if debug {
                detail(outcome).unwrap_or_default()
            } else {
                brief_error(&err.to_string())
            };
            format!("{}  {}", style("ERROR").yellow(), style(message).dim())
        }
    };

    format!(
        "  {}{}  {}  {}",
        prefix,
        style(&address).white(),
        style(&provider).cyan(),
        verdict
    )
}

/// Shorten an error message to its first clause for the pretty view.
fn brief_error(message: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        "timeout".to_string()
    } else if lower.contains("invalid address") {
        "invalid address".to_string()
    } else if lower.contains("refused") {
        "connection refused".to_string()
    } else {
        let trimmed = message.trim();
        if trimmed.chars().count() > 60 {
            let short: String = trimmed.chars().take(57).collect();
            format!("{}...", short)
        } else {
            trimmed.to_string()
        }
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the colored end-of-run summary to stdout.
pub fn print_summary<W: Write>(
    out: &mut W,
    summary: &Summary,
    duration: Duration,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{} {} checked in {}  {}  {}  {}",
        style("Summary:").bold(),
        summary.total,
        format_duration(duration),
        style(format!("{} clean", summary.clean)).green(),
        style(format!("{} listed", summary.listed)).red(),
        style(format!("{} errors", summary.errors)).yellow(),
    )
}

/// Print a plain summary line to stderr so stdout stays machine readable.
pub fn print_plain_summary(summary: &Summary, duration: Duration) {
    eprintln!("{}", plain_summary(summary, duration));
}

fn plain_summary(summary: &Summary, duration: Duration) -> String {
    format!(
        "{} lookups in {}: {} clean, {} listed, {} errors",
        summary.total,
        format_duration(duration),
        summary.clean,
        summary.listed,
        summary.errors
    )
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnsbl_check_lib::{DnsblError, UNKNOWN_REASON};

    /// Writer whose reader has gone away.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_brief_error() {
        assert_eq!(brief_error("timeout after 5s during A query"), "timeout");
        assert_eq!(
            brief_error("invalid address 'x': not an IPv4 or IPv6 address"),
            "invalid address"
        );
        assert_eq!(brief_error("  short  "), "short");
        let long = "x".repeat(100);
        assert_eq!(brief_error(&long).chars().count(), 60);
    }

    #[test]
    fn test_format_result_contents() {
        console::set_colors_enabled(false);

        let listed = LookupOutcome::listed(
            "5.6.7.8",
            "zen.example",
            "",
            Some(DnsblError::reason_failed("zen.example", "5.6.7.8", "SERVFAIL")),
        );
        let line = format_result(&listed, false, Some((1, 2)));
        assert!(line.contains("[1/2]"));
        assert!(line.contains("LISTED"));
        assert!(line.contains(UNKNOWN_REASON));
        assert!(!line.contains("SERVFAIL"));

        let line = format_result(&listed, true, None);
        assert!(line.contains("SERVFAIL"));

        let clean = LookupOutcome::clean("1.2.3.4", "zen.example");
        assert!(format_result(&clean, false, None).contains("CLEAN"));
    }

    #[test]
    fn test_closed_output_is_reported_not_panicked() {
        let outcome = LookupOutcome::clean("1.2.3.4", "zen.example");
        let summary = Summary::default();

        let err = print_result(&mut ClosedPipe, &outcome, false, None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(print_header(&mut ClosedPipe, 1, 1, 50).is_err());
        assert!(print_summary(&mut ClosedPipe, &summary, Duration::ZERO).is_err());
    }

    #[test]
    fn test_print_result_writes_one_line() {
        console::set_colors_enabled(false);

        let outcome = LookupOutcome::listed("5.6.7.8", "zen.example", "spam\nsource", None);
        let mut out = Vec::new();
        print_result(&mut out, &outcome, false, Some((1, 1))).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("spam source"));
    }

    #[test]
    fn test_plain_summary() {
        let summary = Summary {
            total: 6,
            clean: 3,
            listed: 2,
            errors: 1,
        };
        assert_eq!(
            plain_summary(&summary, Duration::from_millis(420)),
            "6 lookups in 420ms: 3 clean, 2 listed, 1 errors"
        );
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
    }
}
