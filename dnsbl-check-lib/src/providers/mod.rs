//! Blacklist providers.
//!
//! A provider answers two questions about an address: is it listed, and
//! if so, why. The checker only sees the [`DnsblProvider`] trait, so stub
//! providers in tests and the DNS-backed [`DnsProvider`] are interchangeable.

use crate::Result;
use async_trait::async_trait;

/// DNS zone based provider implementation
pub mod dns;

pub use dns::{build_resolver, providers_from_sources, reverse_address, DnsProvider};

/// A single blacklist source.
///
/// Implementations must be immutable after construction; one instance is
/// shared by every concurrent lookup that consults it.
#[async_trait]
pub trait DnsblProvider: Send + Sync {
    /// Stable identifying name, used for display and de-duplication.
    fn name(&self) -> &str;

    /// Ask whether `address` is listed.
    async fn is_blacklisted(&self, address: &str) -> Result<bool>;

    /// Ask why `address` is listed. Only called after a positive listing.
    async fn reason(&self, address: &str) -> Result<String>;
}
