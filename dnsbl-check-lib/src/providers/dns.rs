//! DNSBL provider backed by real DNS queries.
//!
//! A DNSBL publishes listings as DNS records under its zone: the address
//! `1.2.3.4` is listed in `zen.example` when `4.3.2.1.zen.example` has an
//! A record, and the matching TXT record explains why.

use super::DnsblProvider;
use crate::error::DnsblError;
use crate::types::CheckConfig;
use crate::Result;
use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfig, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::proto::{ProtoError, ProtoErrorKind};
use hickory_resolver::{system_conf, ResolveError, TokioResolver};
use std::collections::HashSet;
use std::fmt::Write;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Provider that queries one blacklist zone.
#[derive(Clone)]
pub struct DnsProvider {
    zone: String,
    resolver: Arc<TokioResolver>,
    timeout: Duration,
}

impl DnsProvider {
    /// Create a provider for `zone` using a shared resolver.
    ///
    /// Surrounding whitespace and a trailing dot are stripped from the zone.
    pub fn new<Z: AsRef<str>>(zone: Z, resolver: Arc<TokioResolver>, timeout: Duration) -> Self {
        let zone = zone.as_ref().trim().trim_end_matches('.').to_string();
        Self {
            zone,
            resolver,
            timeout,
        }
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Fully qualified name to query for `address` in this zone.
    pub fn query_name(&self, address: &str) -> Result<String> {
        Ok(format!("{}.{}.", reverse_address(address)?, self.zone))
    }
}

impl std::fmt::Debug for DnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsProvider")
            .field("zone", &self.zone)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl DnsblProvider for DnsProvider {
    fn name(&self) -> &str {
        &self.zone
    }

    async fn is_blacklisted(&self, address: &str) -> Result<bool> {
        let name = self.query_name(address)?;
        debug!(%name, "querying A record");

        let query = self.resolver.ipv4_lookup(name.as_str());
        match tokio::time::timeout(self.timeout, query).await {
            Ok(Ok(lookup)) => Ok(lookup.iter().next().is_some()),
            Ok(Err(e)) if is_negative_answer(&e) => Ok(false),
            Ok(Err(e)) => Err(DnsblError::query_failed(
                &self.zone,
                address,
                e.to_string(),
            )),
            Err(_) => Err(DnsblError::timeout(
                format!("A query for {}", name),
                self.timeout,
            )),
        }
    }

    async fn reason(&self, address: &str) -> Result<String> {
        let name = self.query_name(address)?;
        debug!(%name, "querying TXT record");

        let query = self.resolver.txt_lookup(name.as_str());
        match tokio::time::timeout(self.timeout, query).await {
            Ok(Ok(lookup)) => Ok(lookup
                .iter()
                .map(|txt| txt.to_string())
                .filter(|txt| !txt.is_empty())
                .collect::<Vec<_>>()
                .join("; ")),
            Ok(Err(e)) if is_negative_answer(&e) => Ok(String::new()),
            Ok(Err(e)) => Err(DnsblError::reason_failed(
                &self.zone,
                address,
                e.to_string(),
            )),
            Err(_) => Err(DnsblError::timeout(
                format!("TXT query for {}", name),
                self.timeout,
            )),
        }
    }
}

/// Whether the zone definitively answered that the record does not exist.
///
/// hickory reports SERVFAIL, REFUSED and other failing response codes as
/// `NoRecordsFound` as well; only NXDOMAIN and an empty NOERROR answer
/// count as "not there".
fn is_negative_answer(error: &ResolveError) -> bool {
    matches!(
        error.proto().map(ProtoError::kind),
        Some(ProtoErrorKind::NoRecordsFound {
            response_code: ResponseCode::NXDomain | ResponseCode::NoError,
            ..
        })
    )
}

/// Reverse an address into DNSBL label order.
///
/// IPv4 octets are reversed (`1.2.3.4` -> `4.3.2.1`); IPv6 addresses are
/// expanded to 32 nibbles and reversed, as for `ip6.arpa`.
pub fn reverse_address(address: &str) -> Result<String> {
    let ip: IpAddr = address
        .trim()
        .parse()
        .map_err(|_| DnsblError::invalid_address(address, "not an IPv4 or IPv6 address"))?;

    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            Ok(format!("{}.{}.{}.{}", d, c, b, a))
        }
        IpAddr::V6(v6) => {
            let mut out = String::with_capacity(63);
            for byte in v6.octets().iter().rev() {
                let _ = write!(out, "{:x}.{:x}.", byte & 0x0f, byte >> 4);
            }
            out.pop();
            Ok(out)
        }
    }
}

/// Build the resolver shared by every DNS provider.
///
/// Uses the system resolver configuration unless explicit nameservers are
/// configured. Each query is bounded by `config.timeout`.
pub fn build_resolver(config: &CheckConfig) -> Result<Arc<TokioResolver>> {
    let (resolver_config, mut options) = if config.nameservers.is_empty() {
        system_conf::read_system_conf().map_err(|e| {
            DnsblError::config(format!(
                "Failed to read system resolver configuration: {}",
                e
            ))
        })?
    } else {
        let mut resolver_config = ResolverConfig::new();
        for nameserver in &config.nameservers {
            resolver_config.add_name_server(NameServerConfig::new(*nameserver, Protocol::Udp));
            resolver_config.add_name_server(NameServerConfig::new(*nameserver, Protocol::Tcp));
        }
        (resolver_config, ResolverOpts::default())
    };

    options.timeout = config.timeout;

    Ok(Arc::new(
        TokioResolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
            .with_options(options)
            .build(),
    ))
}

/// Turn provider sources into providers sharing one resolver.
///
/// Sources that normalise to an already seen zone are skipped.
pub fn providers_from_sources<S: AsRef<str>>(
    sources: &[S],
    resolver: Arc<TokioResolver>,
    timeout: Duration,
) -> Vec<Arc<dyn DnsblProvider>> {
    let mut seen = HashSet::new();
    let mut providers: Vec<Arc<dyn DnsblProvider>> = Vec::new();

    for source in sources {
        let provider = DnsProvider::new(source, resolver.clone(), timeout);
        if provider.zone().is_empty() || !seen.insert(provider.zone().to_string()) {
            continue;
        }
        providers.push(Arc::new(provider));
    }

    providers
}
