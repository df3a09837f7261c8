//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files, merging
//! them with proper precedence rules, and reading `DNSBL_*` environment
//! variables.

use crate::error::DnsblError;
use crate::types::{OutputFormat, MAX_CONCURRENCY};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// concurrency = 100
/// timeout = "3s"
/// format = "json"
/// nameservers = ["127.0.0.1"]
///
/// [providers]
/// file = "/etc/dnsbl-check/providers.txt"
/// zones = ["zen.spamhaus.org", "bl.spamcop.net"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Blacklist providers to consult
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<ProvidersConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Default concurrency level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Per-query timeout (as string, e.g., "500ms", "5s", "1m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Output format: text, json or csv
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Nameservers to query instead of the system resolver
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nameservers: Option<Vec<String>>,
}

/// Provider sources from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProvidersConfig {
    /// Provider list file, one zone per line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Inline list of zones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to log which config files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DnsblError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DnsblError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DnsblError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is loaded first, then `~/.dnsbl-check.toml`, then
    /// `./dnsbl-check.toml`; later files win field by field.
    pub fn discover_and_load(&self) -> Result<FileConfig, DnsblError> {
        let mut merged_config = FileConfig::default();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    if self.verbose {
                        info!(path = %path.display(), "loaded config file");
                    }
                    merged_config = self.merge_configs(merged_config, config);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping config file"),
            }
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./dnsbl-check.toml", "./.dnsbl-check.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Get the global configuration file path in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".dnsbl-check.toml", "dnsbl-check.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("dnsbl-check").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations. Values from `higher` take precedence.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower_defaults), Some(higher_defaults)) => Some(DefaultsConfig {
                    concurrency: higher_defaults.concurrency.or(lower_defaults.concurrency),
                    timeout: higher_defaults.timeout.or(lower_defaults.timeout),
                    format: higher_defaults.format.or(lower_defaults.format),
                    nameservers: higher_defaults.nameservers.or(lower_defaults.nameservers),
                }),
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            providers: match (lower.providers, higher.providers) {
                (Some(lower_providers), Some(higher_providers)) => Some(ProvidersConfig {
                    file: higher_providers.file.or(lower_providers.file),
                    zones: higher_providers.zones.or(lower_providers.zones),
                }),
                (lower_providers, higher_providers) => higher_providers.or(lower_providers),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DnsblError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > MAX_CONCURRENCY {
                    return Err(DnsblError::config(format!(
                        "Concurrency must be between 1 and {}",
                        MAX_CONCURRENCY
                    )));
                }
            }

            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(DnsblError::config(format!(
                        "Invalid timeout format '{}'. Use format like '500ms', '5s', '1m'",
                        timeout_str
                    )));
                }
            }

            if let Some(format) = &defaults.format {
                format.parse::<OutputFormat>()?;
            }

            if let Some(nameservers) = &defaults.nameservers {
                for nameserver in nameservers {
                    if parse_nameserver(nameserver).is_none() {
                        return Err(DnsblError::config(format!(
                            "Invalid nameserver '{}'",
                            nameserver
                        )));
                    }
                }
            }
        }

        if let Some(zones) = config.providers.as_ref().and_then(|p| p.zones.as_ref()) {
            if zones.iter().any(|zone| zone.trim().is_empty()) {
                return Err(DnsblError::config("Provider zones cannot be empty"));
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// Values come from `DNSBL_*` variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub concurrency: Option<usize>,
    pub timeout: Option<Duration>,
    pub nameservers: Option<Vec<SocketAddr>>,
    pub providers_file: Option<String>,
    pub format: Option<OutputFormat>,
    pub config: Option<String>,
}

/// Load configuration from `DNSBL_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

/// Load `DNSBL_*` configuration through an arbitrary variable lookup.
pub fn load_env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(val) = var("DNSBL_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(concurrency) if (1..=MAX_CONCURRENCY).contains(&concurrency) => {
                env_config.concurrency = Some(concurrency);
            }
            _ => warn!(
                value = %val,
                "ignoring DNSBL_CONCURRENCY, must be 1-{}", MAX_CONCURRENCY
            ),
        }
    }

    if let Some(val) = var("DNSBL_TIMEOUT") {
        match parse_timeout_string(&val) {
            Some(timeout) => env_config.timeout = Some(timeout),
            None => warn!(value = %val, "ignoring DNSBL_TIMEOUT, use format like '5s'"),
        }
    }

    if let Some(val) = var("DNSBL_NAMESERVERS") {
        let parsed: Option<Vec<SocketAddr>> = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_nameserver)
            .collect();
        match parsed {
            Some(nameservers) if !nameservers.is_empty() => {
                env_config.nameservers = Some(nameservers)
            }
            _ => warn!(value = %val, "ignoring DNSBL_NAMESERVERS"),
        }
    }

    if let Some(val) = var("DNSBL_PROVIDERS") {
        env_config.providers_file = Some(val);
    }

    if let Some(val) = var("DNSBL_FORMAT") {
        match val.parse::<OutputFormat>() {
            Ok(format) => env_config.format = Some(format),
            Err(e) => warn!(value = %val, error = %e, "ignoring DNSBL_FORMAT"),
        }
    }

    if let Some(val) = var("DNSBL_CONFIG") {
        env_config.config = Some(val);
    }

    env_config
}

/// Parse a timeout string like "500ms", "5s", "2m" into a duration.
///
/// A bare number is taken as seconds. Zero is rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let duration = if let Some(ms) = timeout_str.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        timeout_str.parse::<u64>().ok().map(Duration::from_secs)
    };

    duration.filter(|d| !d.is_zero())
}

/// Parse a nameserver as `ip`, `ip:port` or `[ipv6]:port`. Port defaults to 53.
pub fn parse_nameserver(nameserver: &str) -> Option<SocketAddr> {
    let nameserver = nameserver.trim();
    nameserver
        .parse::<SocketAddr>()
        .ok()
        .or_else(|| {
            nameserver
                .parse::<IpAddr>()
                .ok()
                .map(|ip| SocketAddr::new(ip, 53))
        })
}
