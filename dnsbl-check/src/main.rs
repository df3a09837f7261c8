//! DNSBL Check CLI Application
//!
//! A command-line interface for checking IP addresses against DNS-based
//! blacklists. This CLI is a thin layer over dnsbl-check-lib: it gathers
//! addresses and provider zones, layers configuration, and prints outcomes
//! as they arrive.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use dnsbl_check_lib::{
    build_resolver, load_env_config, parse_addresses, parse_nameserver, parse_timeout_string,
    providers_from_sources, read_provider_sources, render, BlacklistChecker, CheckConfig,
    ConfigManager, EnvConfig, FileConfig, OutcomeStream, OutputFormat, Summary, CSV_HEADER,
    MAX_CONCURRENCY,
};
use std::io::{self, Write};
use std::process;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for dnsbl-check
#[derive(Parser, Debug)]
#[command(name = "dnsbl-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check IP addresses against DNS-based blacklists")]
#[command(
    long_about = "Check IP addresses against DNS-based blacklists (DNSBLs).\n\nEvery address is looked up in every provider zone concurrently. Results stream as OK, FAIL or ERR lines as they complete."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Addresses to check (comma-separated lists are accepted)
    #[arg(value_name = "ADDRESSES", help_heading = "Input")]
    pub addresses: Vec<String>,

    /// Address to check (comma-separated or multiple -i flags)
    #[arg(short = 'i', long = "ip", value_name = "ADDRESS", action = clap::ArgAction::Append, help_heading = "Input")]
    pub ips: Vec<String>,

    /// Provider list file, one zone per line ('-' or empty reads stdin)
    #[arg(
        short = 'p',
        long = "providers",
        value_name = "FILE",
        help_heading = "Input"
    )]
    pub providers: Option<String>,

    /// Provider zone to query (comma-separated or multiple -z flags)
    #[arg(short = 'z', long = "zone", value_name = "ZONE", value_delimiter = ',', action = clap::ArgAction::Append, help_heading = "Input")]
    pub zones: Vec<String>,

    /// Output results as JSON Lines
    #[arg(long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Output results as CSV
    #[arg(long = "csv", help_heading = "Output Format")]
    pub csv: bool,

    /// Colored, aligned output with progress and a summary
    #[arg(long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// Print a summary line to stderr when done
    #[arg(long = "summary", help_heading = "Output Format")]
    pub summary: bool,

    /// Max concurrent lookups (default: 50, max: 500)
    #[arg(
        short = 'c',
        long = "concurrency",
        value_name = "N",
        help_heading = "Performance"
    )]
    pub concurrency: Option<usize>,

    /// Per-query timeout, e.g. 500ms, 5s, 1m (default: 5s)
    #[arg(
        short = 't',
        long = "timeout",
        value_name = "DURATION",
        help_heading = "Performance"
    )]
    pub timeout: Option<String>,

    /// Nameserver to query instead of the system resolver (IP or IP:PORT)
    #[arg(long = "nameserver", value_name = "ADDR", value_delimiter = ',', action = clap::ArgAction::Append, help_heading = "Performance")]
    pub nameservers: Vec<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show detailed debug information and error messages
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_tracing(&args);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.json && args.csv {
        return Err("Cannot specify multiple output formats (--json, --csv)".to_string());
    }

    if args.pretty && (args.json || args.csv) {
        return Err("Cannot use --pretty with --json or --csv".to_string());
    }

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > MAX_CONCURRENCY {
            return Err(format!(
                "Concurrency must be between 1 and {}",
                MAX_CONCURRENCY
            ));
        }
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout_string(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '500ms', '5s', '1m'",
                timeout
            ));
        }
    }

    if let Some(bad) = args
        .nameservers
        .iter()
        .find(|ns| parse_nameserver(ns).is_none())
    {
        return Err(format!("Invalid nameserver '{}'", bad));
    }

    Ok(())
}

/// Send log events to stderr. `RUST_LOG` overrides the flag-derived level.
fn init_tracing(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,dnsbl_check={level},dnsbl_check_lib={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main checking logic
async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let file_config = load_file_config(&args, &env_config)?;
    let (config, format) = build_config(&args, &env_config, &file_config)?;

    let sources = collect_provider_sources(&args, &env_config, &file_config)?;
    let addresses = parse_addresses(&all_address_params(&args));

    info!(
        addresses = addresses.len(),
        providers = sources.len(),
        concurrency = config.concurrency,
        timeout = ?config.timeout,
        "starting checks"
    );

    if addresses.is_empty() || sources.is_empty() {
        debug!("nothing to check");
        return Ok(());
    }

    let resolver = build_resolver(&config)?;
    let providers = providers_from_sources(&sources, resolver, config.timeout);
    let concurrency = config.concurrency;

    if args.pretty {
        let mut out = io::stdout().lock();
        stdout_open(ui::print_header(
            &mut out,
            addresses.len(),
            providers.len(),
            concurrency,
        ))?;
    }

    let checker = BlacklistChecker::with_config(config);
    let stream = checker.check_all(&addresses, &providers);

    let start = Instant::now();
    let summary = print_outcomes(stream, &args, format).await?;
    let elapsed = start.elapsed();

    info!(
        total = summary.total,
        clean = summary.clean,
        listed = summary.listed,
        errors = summary.errors,
        elapsed = ?elapsed,
        "checks finished"
    );

    if args.pretty {
        stdout_open(ui::print_summary(&mut io::stdout().lock(), &summary, elapsed))?;
    } else if args.summary {
        ui::print_plain_summary(&summary, elapsed);
    }

    Ok(())
}

/// Positional addresses followed by `-i` values.
fn all_address_params(args: &Args) -> Vec<&str> {
    args.addresses
        .iter()
        .chain(args.ips.iter())
        .map(String::as_str)
        .collect()
}

/// Write each outcome the moment it arrives. A closed stdout ends the run quietly.
async fn print_outcomes(
    mut stream: OutcomeStream,
    args: &Args,
    format: OutputFormat,
) -> io::Result<Summary> {
    let mut summary = Summary::default();
    let expected = stream.expected();

    if !args.pretty
        && format == OutputFormat::Csv
        && !stdout_open(writeln!(io::stdout().lock(), "{}", CSV_HEADER))?
    {
        return Ok(summary);
    }

    while let Some(outcome) = stream.next_outcome().await {
        summary.record(&outcome);

        let mut out = io::stdout().lock();
        let written = if args.pretty {
            ui::print_result(
                &mut out,
                &outcome,
                args.debug,
                Some((summary.total, expected)),
            )
        } else {
            writeln!(out, "{}", render(&outcome, format))
        };

        if !stdout_open(written.and_then(|_| out.flush()))? {
            break;
        }
    }

    Ok(summary)
}

/// `Ok(false)` when the reader of stdout has gone away, other errors pass through.
fn stdout_open(written: io::Result<()>) -> io::Result<bool> {
    match written {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("stdout closed, stopping output");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Load the config file named by `--config`, then `DNSBL_CONFIG`, else discover one.
fn load_file_config(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose || args.debug);

    let explicit = args
        .config
        .as_deref()
        .map(|path| (path, "--config"))
        .or_else(|| env_config.config.as_deref().map(|path| (path, "DNSBL_CONFIG")));

    match explicit {
        Some((path, origin)) => {
            info!(path, origin, "using explicit config file");
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e).into())
        }
        None => Ok(config_manager.discover_and_load()?),
    }
}

/// Layer configuration: defaults, then config file, then environment, then CLI.
fn build_config(
    args: &Args,
    env_config: &EnvConfig,
    file_config: &FileConfig,
) -> Result<(CheckConfig, OutputFormat), Box<dyn std::error::Error>> {
    let mut config = CheckConfig::default();
    let mut format = OutputFormat::default();

    // Step 1: config file
    if let Some(defaults) = &file_config.defaults {
        if let Some(concurrency) = defaults.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_timeout_string) {
            config = config.with_timeout(timeout);
        }
        if let Some(nameservers) = &defaults.nameservers {
            config = config.with_nameservers(
                nameservers
                    .iter()
                    .filter_map(|ns| parse_nameserver(ns))
                    .collect(),
            );
        }
        if let Some(name) = &defaults.format {
            format = name.parse()?;
        }
    }

    // Step 2: environment variables (DNSBL_*)
    if let Some(concurrency) = env_config.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(timeout) = env_config.timeout {
        config = config.with_timeout(timeout);
    }
    if let Some(nameservers) = &env_config.nameservers {
        config = config.with_nameservers(nameservers.clone());
    }
    if let Some(env_format) = env_config.format {
        format = env_format;
    }

    // Step 3: CLI arguments (highest precedence)
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(timeout) = args.timeout.as_deref() {
        let timeout = parse_timeout_string(timeout)
            .ok_or_else(|| format!("Invalid timeout '{}'", timeout))?;
        config = config.with_timeout(timeout);
    }
    if !args.nameservers.is_empty() {
        let nameservers = args
            .nameservers
            .iter()
            .map(|ns| parse_nameserver(ns).ok_or_else(|| format!("Invalid nameserver '{}'", ns)))
            .collect::<Result<Vec<_>, _>>()?;
        config = config.with_nameservers(nameservers);
    }
    if args.json {
        format = OutputFormat::Json;
    } else if args.csv {
        format = OutputFormat::Csv;
    } else if args.pretty {
        format = OutputFormat::Text;
    }

    Ok((config, format))
}

/// Gather provider zones from `-z`, the provider list file and the config file.
///
/// The list file comes from `-p`, then `DNSBL_PROVIDERS`, then `[providers] file`.
/// Config zones apply only when no `-z` was given. With no source at all the
/// list is read from stdin.
fn collect_provider_sources(
    args: &Args,
    env_config: &EnvConfig,
    file_config: &FileConfig,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut sources: Vec<String> = args
        .zones
        .iter()
        .map(|zone| zone.trim().to_string())
        .filter(|zone| !zone.is_empty())
        .collect();

    let file_providers = file_config.providers.as_ref();
    if sources.is_empty() {
        if let Some(zones) = file_providers.and_then(|p| p.zones.as_ref()) {
            sources.extend(zones.iter().map(|zone| zone.trim().to_string()));
        }
    }

    let list_file = args
        .providers
        .clone()
        .or_else(|| env_config.providers_file.clone())
        .or_else(|| file_providers.and_then(|p| p.file.clone()));

    match list_file {
        Some(path) => sources.extend(read_provider_sources(Some(path.as_str()))?),
        None if sources.is_empty() => sources.extend(read_provider_sources(None)?),
        None => {}
    }

    Ok(sources)
}
