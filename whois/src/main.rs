//! Whois CLI Application
//!
//! A command-line interface for querying WHOIS servers about domain names,
//! IP addresses and autonomous system numbers. This binary is a thin layer
//! over whois-lib: it resolves configuration, calls the resolver, and prints.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use whois_lib::{
    dedup_subjects, load_env_config, parse_record, resolve_dialer, ConfigManager, Dialer,
    EnvConfig, FileConfig, Query, ResolutionResult, WhoisClient, WhoisError,
};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Lookups run in parallel when several subjects are given.
const BATCH_CONCURRENCY: usize = 4;

/// CLI arguments for whois
#[derive(Parser, Debug)]
#[command(name = "whois")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query WHOIS servers for domains, IP addresses and ASNs")]
#[command(
    long_about = "Query WHOIS servers for domains, IP addresses and ASNs.\n\nThe server is picked from a built-in table unless -h is given, and one referral to a more specific server is followed automatically."
)]
#[command(styles = STYLES)]
#[command(disable_help_flag = true)]
pub struct Args {
    /// Domain, IPv4, IPv6 or ASN to query
    #[arg(value_name = "QUERY")]
    pub queries: Vec<String>,

    /// Query this WHOIS server instead of the built-in table
    #[arg(short = 'h', long = "host", value_name = "SERVER")]
    pub server: Option<String>,

    /// Parse the response and print it as JSON
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Parse the response and print a colored summary
    #[arg(short = 'p', long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Verbose logging to stderr
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,

    /// Print help
    #[arg(long = "help", action = ArgAction::Help)]
    pub help: Option<bool>,
}

/// Effective settings after config file, environment and flags are merged.
#[derive(Debug)]
struct Settings {
    server: Option<String>,
    json: bool,
    pretty: bool,
    log_filter: String,
    dialer: Arc<dyn Dialer>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.queries.is_empty() {
        ui::print_usage();
        process::exit(1);
    }

    if let Err(e) = validate_args(&args) {
        println!("{}", e);
        process::exit(1);
    }

    let settings = match build_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            println!("{}", e);
            process::exit(1);
        }
    };

    init_logging(&settings.log_filter);

    if !run_whois(&args, &settings).await {
        process::exit(1);
    }
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.json && args.pretty {
        return Err("Cannot specify both --json and --pretty".to_string());
    }

    if let Some(server) = &args.server {
        if server.trim().is_empty() {
            return Err("Server name for -h cannot be empty".to_string());
        }
    }

    Ok(())
}

/// Merge configuration: file < environment < CLI flags.
fn build_settings(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let file_config = load_file_config(args, &env_config)?;

    let defaults = file_config.defaults.clone().unwrap_or_default();

    let server = args
        .server
        .clone()
        .or_else(|| env_config.server.clone())
        .or(defaults.server);

    // Flags can only switch these on
    let json = args.json || env_config.json.or(defaults.json).unwrap_or(false);
    let pretty = !json && (args.pretty || env_config.pretty.or(defaults.pretty).unwrap_or(false));

    let dialer = resolve_dialer(file_config.proxy.as_ref())?;

    Ok(Settings {
        server,
        json,
        pretty,
        log_filter: log_filter(args, &env_config, &file_config),
        dialer,
    })
}

/// An explicit `--config` or `WHOIS_CONFIG` file replaces discovery.
fn load_file_config(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let explicit = args
        .config
        .as_ref()
        .or(env_config.config.as_ref())
        .map(PathBuf::from);

    let config = ConfigManager::new()
        .load(explicit.as_deref())
        .map_err(|e| format!("Failed to load configuration: {}", e))?;
    Ok(config)
}

/// `-v` beats `WHOIS_LOG`, which beats `RUST_LOG`, which beats the file.
fn log_filter(args: &Args, env_config: &EnvConfig, file_config: &FileConfig) -> String {
    if args.verbose {
        return "debug".to_string();
    }

    env_config
        .log
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok().filter(|v| !v.trim().is_empty()))
        .or_else(|| file_config.logging.as_ref().and_then(|l| l.level.clone()))
        .unwrap_or_else(|| "warn".to_string())
}

/// Logs go to stderr so stdout carries only results.
fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run every lookup and print the results in input order.
///
/// Returns false if any subject failed to resolve or render.
async fn run_whois(args: &Args, settings: &Settings) -> bool {
    let mut subjects = dedup_subjects(&args.queries);
    if subjects.is_empty() {
        // Let the resolver report the blank subject
        subjects = args.queries.clone();
    }

    debug!(
        "Looking up {} subject(s), server override {:?}",
        subjects.len(),
        settings.server
    );

    let client = WhoisClient::new().with_dialer(settings.dialer.clone());
    let queries: Vec<Query> = subjects
        .iter()
        .map(|subject| {
            Query::new(subject.as_str()).with_server(settings.server.clone().unwrap_or_default())
        })
        .collect();

    let results = client.lookup_all(&queries, BATCH_CONCURRENCY).await;

    let multiple = subjects.len() > 1;
    let mut all_ok = true;

    for (subject, result) in subjects.iter().zip(results) {
        if multiple {
            ui::print_subject_header(subject);
        }

        match result.and_then(|result| render(&result, settings)) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                println!("{}", e);
                all_ok = false;
            }
        }
    }

    all_ok
}

/// Format one resolution according to the output mode.
fn render(result: &ResolutionResult, settings: &Settings) -> Result<String, WhoisError> {
    if settings.json {
        let record = parse_record(&result.text)?;
        return Ok(serde_json::to_string_pretty(&record)?);
    }

    if settings.pretty {
        return Ok(match parse_record(&result.text) {
            Ok(record) => ui::format_record(&record, result),
            // Nothing structured to show; fall back to the raw text
            Err(e) => ui::format_unparsed(result, &e),
        });
    }

    Ok(result.text.clone())
}
