//! # DNSBL Check Library
//!
//! A concurrent lookup engine for checking addresses against DNS-based
//! blacklists (DNSBLs).
//!
//! Every address is checked against every provider in parallel. Each
//! (address, provider) pair produces exactly one [`LookupOutcome`]:
//! `Clean`, `Listed` or `Error`. A failure on one pair never affects
//! another.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dnsbl_check_lib::{
//!     build_resolver, providers_from_sources, render_line, BlacklistChecker, CheckConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CheckConfig::default();
//!     let resolver = build_resolver(&config)?;
//!     let providers = providers_from_sources(
//!         &["zen.spamhaus.org", "bl.spamcop.net"],
//!         resolver,
//!         config.timeout,
//!     );
//!
//!     let checker = BlacklistChecker::with_config(config);
//!     for outcome in checker.check_all_collected(&["127.0.0.2"], &providers).await {
//!         println!("{}", render_line(&outcome));
//!     }
//!     Ok(())
//! }
//! ```

// Re-export main public API types and functions
pub use checker::BlacklistChecker;
pub use concurrent::OutcomeStream;
pub use config::{
    load_env_config, load_env_config_from, parse_nameserver, parse_timeout_string,
    ConfigManager, DefaultsConfig, EnvConfig, FileConfig, ProvidersConfig,
};
pub use error::DnsblError;
pub use format::{
    detail, render, render_csv_row, render_json, render_line, CSV_HEADER, UNKNOWN_REASON,
};
pub use input::{parse_addresses, parse_provider_list, read_provider_sources, validate_address};
pub use lookup::lookup;
pub use providers::{
    build_resolver, providers_from_sources, reverse_address, DnsProvider, DnsblProvider,
};
pub use types::{
    CheckConfig, LookupOutcome, OutcomeKind, OutcomeStatus, OutputFormat, Summary,
    MAX_CONCURRENCY,
};

/// Provider trait and the DNS-backed implementation
pub mod providers;

// Internal modules - their public items are re-exported above
mod checker;
mod concurrent;
mod config;
mod error;
mod format;
mod input;
mod lookup;
mod types;

/// Re-exported so provider implementations outside this crate can use
/// `#[dnsbl_check_lib::async_trait]` without a direct dependency.
pub use async_trait::async_trait;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DnsblError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
