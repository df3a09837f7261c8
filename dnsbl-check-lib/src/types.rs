//! Core data types for blacklist lookups.
//!
//! This module defines the outcome of checking one address against one
//! provider, the checker configuration and the output format selector.

use crate::error::DnsblError;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Result of checking one address against one provider.
///
/// Exactly one outcome is produced per (address, provider) pair handed to
/// the checker. Outcomes are immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    /// The queried address, exactly as supplied by the caller
    pub address: String,

    /// Name of the provider that was consulted
    pub provider: String,

    /// Which of the three outcome shapes this is
    pub status: OutcomeStatus,

    /// How long the lookup took, if measured
    pub duration: Option<Duration>,
}

/// The three mutually exclusive shapes of a lookup outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    /// The listing check itself failed
    Error(DnsblError),

    /// The address is listed.
    ///
    /// `reason` is empty when the provider had nothing to say.
    /// `reason_error` records a failed reason fetch; the listing still stands.
    Listed {
        reason: String,
        reason_error: Option<DnsblError>,
    },

    /// The address is not listed
    Clean,
}

/// Display tag of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Ok,
    Fail,
    Err,
}

impl OutcomeKind {
    pub fn tag(self) -> &'static str {
        match self {
            OutcomeKind::Ok => "OK",
            OutcomeKind::Fail => "FAIL",
            OutcomeKind::Err => "ERR",
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl LookupOutcome {
    pub fn clean<A: Into<String>, P: Into<String>>(address: A, provider: P) -> Self {
        Self::new(address, provider, OutcomeStatus::Clean)
    }

    pub fn listed<A: Into<String>, P: Into<String>, R: Into<String>>(
        address: A,
        provider: P,
        reason: R,
        reason_error: Option<DnsblError>,
    ) -> Self {
        Self::new(
            address,
            provider,
            OutcomeStatus::Listed {
                reason: reason.into(),
                reason_error,
            },
        )
    }

    pub fn error<A: Into<String>, P: Into<String>>(
        address: A,
        provider: P,
        error: DnsblError,
    ) -> Self {
        Self::new(address, provider, OutcomeStatus::Error(error))
    }

    fn new<A: Into<String>, P: Into<String>>(
        address: A,
        provider: P,
        status: OutcomeStatus,
    ) -> Self {
        Self {
            address: address.into(),
            provider: provider.into(),
            status,
            duration: None,
        }
    }

    /// Attach the measured lookup duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Whether the address was confirmed listed by the provider.
    pub fn is_blacklisted(&self) -> bool {
        matches!(self.status, OutcomeStatus::Listed { .. })
    }

    /// Whether the listing check itself failed.
    pub fn is_error(&self) -> bool {
        matches!(self.status, OutcomeStatus::Error(_))
    }

    /// The listing reason. `None` unless the outcome is `Listed`.
    pub fn reason(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Listed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Any error recorded on this outcome.
    ///
    /// For `Listed` outcomes this is the non-fatal reason-fetch failure.
    pub fn error_detail(&self) -> Option<&DnsblError> {
        match &self.status {
            OutcomeStatus::Error(err) => Some(err),
            OutcomeStatus::Listed { reason_error, .. } => reason_error.as_ref(),
            OutcomeStatus::Clean => None,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self.status {
            OutcomeStatus::Error(_) => OutcomeKind::Err,
            OutcomeStatus::Listed { .. } => OutcomeKind::Fail,
            OutcomeStatus::Clean => OutcomeKind::Ok,
        }
    }
}

impl Serialize for LookupOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LookupOutcome", 6)?;
        state.serialize_field("address", &self.address)?;
        state.serialize_field("provider", &self.provider)?;

        match &self.status {
            OutcomeStatus::Clean => {
                state.serialize_field("status", "clean")?;
                state.skip_field("reason")?;
                state.skip_field("error")?;
            }
            OutcomeStatus::Listed {
                reason,
                reason_error,
            } => {
                state.serialize_field("status", "listed")?;
                state.serialize_field("reason", reason)?;
                match reason_error {
                    Some(err) => state.serialize_field("error", &err.to_string())?,
                    None => state.skip_field("error")?,
                }
            }
            OutcomeStatus::Error(err) => {
                state.serialize_field("status", "error")?;
                state.skip_field("reason")?;
                state.serialize_field("error", &err.to_string())?;
            }
        }

        match self.duration {
            Some(duration) => {
                state.serialize_field("duration_ms", &(duration.as_millis() as u64))?
            }
            None => state.skip_field("duration_ms")?,
        }

        state.end()
    }
}

/// Running tally of outcome kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub clean: usize,
    pub listed: usize,
    pub errors: usize,
}

impl Summary {
    pub fn record(&mut self, outcome: &LookupOutcome) {
        self.total += 1;
        match outcome.kind() {
            OutcomeKind::Ok => self.clean += 1,
            OutcomeKind::Fail => self.listed += 1,
            OutcomeKind::Err => self.errors += 1,
        }
    }
}

impl<'a> FromIterator<&'a LookupOutcome> for Summary {
    fn from_iter<I: IntoIterator<Item = &'a LookupOutcome>>(iter: I) -> Self {
        let mut summary = Summary::default();
        for outcome in iter {
            summary.record(outcome);
        }
        summary
    }
}

/// Configuration options for the checker and the DNS provider.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Maximum number of lookups in flight at once.
    /// Default: 50, Range: 1-500
    pub concurrency: usize,

    /// Deadline for each individual DNS query
    /// Default: 5 seconds
    pub timeout: Duration,

    /// Explicit nameservers. Empty means the system resolver configuration.
    pub nameservers: Vec<SocketAddr>,
}

pub const MAX_CONCURRENCY: usize = 500;

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            concurrency: 50,
            timeout: Duration::from_secs(5),
            nameservers: Vec::new(),
        }
    }
}

impl CheckConfig {
    /// Set concurrency, clamped to 1..=500.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_nameservers(mut self, nameservers: Vec<SocketAddr>) -> Self {
        self.nameservers = nameservers;
        self
    }
}

/// How outcomes are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Tab separated `OK`/`FAIL`/`ERR` lines
    #[default]
    Text,

    /// One JSON object per line
    Json,

    /// Comma separated values with a header row
    Csv,
}

impl FromStr for OutputFormat {
    type Err = DnsblError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain" => Ok(OutputFormat::Text),
            "json" | "jsonl" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(DnsblError::config(format!(
                "Unknown output format '{}', use text, json or csv",
                other
            ))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
