//! Main blacklist checker implementation.
//!
//! This module provides the `BlacklistChecker` struct that schedules one
//! lookup per (address, provider) pair and hands back their outcomes.

use crate::concurrent::{fan_out, guarded_lookup, OutcomeStream};
use crate::providers::DnsblProvider;
use crate::types::{CheckConfig, LookupOutcome};
use std::sync::Arc;

/// Fans addresses × providers out into concurrent lookups.
///
/// Failures never escape a single pair: a provider error, a failed reason
/// fetch or even a panicking provider ends up inside that pair's
/// [`LookupOutcome`], and every other pair proceeds normally.
///
/// # Example
///
/// ```rust,no_run
/// use dnsbl_check_lib::{build_resolver, providers_from_sources, BlacklistChecker, CheckConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = CheckConfig::default();
///     let resolver = build_resolver(&config)?;
///     let providers = providers_from_sources(&["zen.spamhaus.org"], resolver, config.timeout);
///
///     let checker = BlacklistChecker::with_config(config);
///     let mut outcomes = checker.check_all(&["127.0.0.2"], &providers);
///     while let Some(outcome) = outcomes.next_outcome().await {
///         println!("{}", dnsbl_check_lib::render_line(&outcome));
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BlacklistChecker {
    config: CheckConfig,
}

impl BlacklistChecker {
    /// Create a checker with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a checker with custom configuration.
    pub fn with_config(config: CheckConfig) -> Self {
        Self { config }
    }

    /// Check a single address against a single provider.
    pub async fn check(&self, address: &str, provider: &dyn DnsblProvider) -> LookupOutcome {
        guarded_lookup(address, provider).await
    }

    /// Schedule every (address, provider) combination.
    ///
    /// Returns immediately; outcomes arrive on the stream in completion
    /// order. The stream yields exactly `addresses.len() * providers.len()`
    /// outcomes and then ends. Empty inputs give a stream that ends at once.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn check_all<A: AsRef<str>>(
        &self,
        addresses: &[A],
        providers: &[Arc<dyn DnsblProvider>],
    ) -> OutcomeStream {
        let addresses = addresses
            .iter()
            .map(|address| address.as_ref().to_string())
            .collect();
        fan_out(addresses, providers, self.config.concurrency)
    }

    /// Like [`check_all`](Self::check_all), but waits for every outcome.
    pub async fn check_all_collected<A: AsRef<str>>(
        &self,
        addresses: &[A],
        providers: &[Arc<dyn DnsblProvider>],
    ) -> Vec<LookupOutcome> {
        self.check_all(addresses, providers).collect_all().await
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Replace the configuration. Affects lookups scheduled afterwards.
    pub fn set_config(&mut self, config: CheckConfig) {
        self.config = config;
    }
}
