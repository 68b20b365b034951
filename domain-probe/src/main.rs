//! Domain Probe CLI Application
//!
//! Reads domain names from a CSV file, probes each one over HTTP with a
//! fixed pool of workers, and writes the classification of every domain
//! to an output CSV file.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_probe_lib::{
    load_env_config, parse_timeout_string, read_domains, write_results, ClassificationResult,
    Classifier, ConfigManager, EnvConfig, FileConfig, ProbeConfig, ProbePool,
    DEFAULT_DOMAIN_COLUMN, MAX_POOL_SIZE,
};
use std::process;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

const DEFAULT_INPUT: &str = "domains.csv";
const DEFAULT_OUTPUT: &str = "output.csv";

/// CLI arguments for domain-probe
#[derive(Parser, Debug)]
#[command(name = "domain-probe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Classify domains as valid, parked, redirected, old or unreachable")]
#[command(
    long_about = "Probe every domain in a CSV file over HTTP and classify it as valid, parked, redirected, old, or unreachable.\n\nResults are written as CSV with the columns domain,status,message."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// CSV file with a header row and domains in one column [default: domains.csv]
    #[arg(value_name = "INPUT", help_heading = "Input")]
    pub input: Option<String>,

    /// Zero-based column holding the domain name [default: 3]
    #[arg(long = "column", value_name = "N", help_heading = "Input")]
    pub column: Option<usize>,

    /// List the domains that would be probed and exit
    #[arg(long = "dry-run", help_heading = "Input")]
    pub dry_run: bool,

    /// Results file [default: output.csv]
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output"
    )]
    pub output: Option<String>,

    /// Print results as JSON to stdout instead of writing CSV
    #[arg(short = 'j', long = "json", help_heading = "Output")]
    pub json: bool,

    /// Number of concurrent workers (default: 200, max: 1000)
    #[arg(
        short = 'c',
        long = "pool-size",
        value_name = "N",
        help_heading = "Performance"
    )]
    pub pool_size: Option<usize>,

    /// Per-attempt HTTP timeout, e.g. "10s" or "1m" [default: 10s]
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show debug logs for every probe
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging and per-status breakdown
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Everything a run needs after merging config files, environment, and flags.
#[derive(Debug, Clone)]
struct RunSettings {
    input: String,
    output: String,
    column: usize,
    json: bool,
    probe: ProbeConfig,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT.to_string(),
            output: DEFAULT_OUTPUT.to_string(),
            column: DEFAULT_DOMAIN_COLUMN,
            json: false,
            probe: ProbeConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_logging(&args);

    if let Err(e) = run_probe(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the flags.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directive(args)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_log_directive(args: &Args) -> String {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        return "warn".to_string();
    };
    format!("warn,domain_probe={},domain_probe_lib={}", level, level)
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if let Some(pool_size) = args.pool_size {
        if pool_size == 0 || pool_size > MAX_POOL_SIZE {
            return Err(format!("Pool size must be between 1 and {}", MAX_POOL_SIZE));
        }
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout_string(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '5s', '30s', '2m'",
                timeout
            ));
        }
    }

    if args.json && args.output.is_some() {
        return Err("Cannot use --json together with --output".to_string());
    }

    Ok(())
}

async fn run_probe(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = build_settings(&args, load_env_config())?;
    debug!(?settings, "resolved settings");

    let domains = read_domains(&settings.input, settings.column)?;

    if args.dry_run {
        ui::print_dry_run(&domains);
        return Ok(());
    }

    if args.verbose {
        ui::print_header(domains.len(), settings.probe.pool_size, &settings.input);
    }

    let classifier = Classifier::with_config(&settings.probe)?;
    let pool = ProbePool::new(classifier, settings.probe.pool_size);

    let progress = ui::ProgressLine::new(domains.len());
    let results = pool
        .run_with_progress(domains, |_, tally| progress.update(tally))
        .await?;
    progress.finish();

    if settings.json {
        display_json_results(results.results())?;
        eprintln!("{}", ui::summary_line(results.len(), results.valid_count()));
    } else {
        write_results(&settings.output, &results)?;
        ui::print_summary(&results, args.verbose);
    }

    Ok(())
}

/// Resolve settings with precedence CLI > environment > config files > defaults.
fn build_settings(
    args: &Args,
    env_config: EnvConfig,
) -> Result<RunSettings, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);

    let file_config = match args.config.as_ref().or(env_config.config.as_ref()) {
        Some(path) => {
            info!(path = %path, "using explicit config file");
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
        }
        None => config_manager.discover_and_load()?,
    };

    let settings = merge_file_config(RunSettings::default(), file_config);
    let settings = apply_environment_config(settings, env_config);
    Ok(apply_cli_args(settings, args))
}

fn merge_file_config(mut settings: RunSettings, file_config: FileConfig) -> RunSettings {
    if let Some(defaults) = file_config.defaults {
        if let Some(pool_size) = defaults.pool_size {
            settings.probe = settings.probe.with_pool_size(pool_size);
        }
        if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_timeout_string) {
            settings.probe = settings.probe.with_timeout(Duration::from_secs(timeout));
        }
        if let Some(column) = defaults.column {
            settings.column = column;
        }
        if let Some(user_agent) = defaults.user_agent {
            settings.probe = settings.probe.with_user_agent(user_agent);
        }
    }

    if let Some(output) = file_config.output {
        if let Some(path) = output.path {
            settings.output = path;
        }
        if let Some(json) = output.json {
            settings.json = json;
        }
    }

    settings
}

fn apply_environment_config(mut settings: RunSettings, env_config: EnvConfig) -> RunSettings {
    if let Some(pool_size) = env_config.pool_size {
        settings.probe = settings.probe.with_pool_size(pool_size);
    }
    if let Some(timeout) = env_config.timeout.as_deref().and_then(parse_timeout_string) {
        settings.probe = settings.probe.with_timeout(Duration::from_secs(timeout));
    }
    if let Some(column) = env_config.column {
        settings.column = column;
    }
    if let Some(input) = env_config.input {
        settings.input = input;
    }
    if let Some(output) = env_config.output {
        settings.output = output;
    }
    if let Some(json) = env_config.json {
        settings.json = json;
    }
    settings
}

fn apply_cli_args(mut settings: RunSettings, args: &Args) -> RunSettings {
    if let Some(pool_size) = args.pool_size {
        settings.probe = settings.probe.with_pool_size(pool_size);
    }
    if let Some(timeout) = args.timeout.as_deref().and_then(parse_timeout_string) {
        settings.probe = settings.probe.with_timeout(Duration::from_secs(timeout));
    }
    if let Some(column) = args.column {
        settings.column = column;
    }
    if let Some(input) = &args.input {
        settings.input = input.clone();
    }
    if let Some(output) = &args.output {
        settings.output = output.clone();
        settings.json = false;
    }
    // Only an explicit flag overrides; false would clobber config and env
    if args.json {
        settings.json = true;
    }
    settings
}

/// Display results in JSON format
fn display_json_results(results: &[ClassificationResult]) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(results)?;
    println!("{}", json);
    Ok(())
}
