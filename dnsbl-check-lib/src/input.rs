//! Address and provider list parsing.
//!
//! Addresses come in as comma separated parameters; provider sources come
//! from a file or stdin, one per line.

use crate::error::DnsblError;
use crate::Result;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::net::IpAddr;

/// Split comma separated address parameters into individual addresses.
///
/// Whitespace around each entry is trimmed, empty entries are dropped and
/// duplicates are removed, keeping first-seen order.
pub fn parse_addresses<S: AsRef<str>>(params: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    params
        .iter()
        .flat_map(|param| param.as_ref().split(','))
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .filter(|address| seen.insert(address.to_string()))
        .map(str::to_string)
        .collect()
}

/// Check that an address is an IPv4 or IPv6 literal.
pub fn validate_address(address: &str) -> Result<IpAddr> {
    address
        .trim()
        .parse()
        .map_err(|_| DnsblError::invalid_address(address, "not an IPv4 or IPv6 address"))
}

/// Read provider sources, one per line.
///
/// Blank lines and `#` comments (whole line or trailing) are ignored and
/// duplicates are removed, keeping first-seen order.
pub fn parse_provider_list<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let source = line.split('#').next().unwrap_or("").trim();
        if source.is_empty() {
            continue;
        }
        if seen.insert(source.to_string()) {
            sources.push(source.to_string());
        }
    }

    Ok(sources)
}

/// Read provider sources from a file, or from stdin when `path` is
/// `None`, empty or `-`.
pub fn read_provider_sources(path: Option<&str>) -> Result<Vec<String>> {
    match path.map(str::trim) {
        None | Some("") | Some("-") => {
            let stdin = io::stdin();
            parse_provider_list(stdin.lock())
                .map_err(|e| DnsblError::file_error("<stdin>", e.to_string()))
        }
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                DnsblError::file_error(path, format!("Failed to open provider list: {}", e))
            })?;
            parse_provider_list(BufReader::new(file))
                .map_err(|e| DnsblError::file_error(path, e.to_string()))
        }
    }
}
