//! Rozee-Jobs main entry point
//!
//! This is the command-line interface for the Rozee-Jobs listing harvester.

use clap::Parser;
use rozee_jobs::config::{read_config, validate, Config};
use rozee_jobs::crawler::{run_crawl, seed_tasks};
use rozee_jobs::output::{load_statistics, print_statistics, print_summary};
use rozee_jobs::storage::open_store;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Rozee-Jobs: a bounded job-listing harvester
///
/// Rozee-Jobs walks the paginated search results of a job-listing site,
/// fetches every posting it discovers until the target count is met, and
/// writes one normalized record per posting.
#[derive(Parser, Debug)]
#[command(name = "rozee-jobs")]
#[command(version = "1.0.0")]
#[command(about = "A bounded job-listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Search keyword
    #[arg(short, long)]
    keyword: Option<String>,

    /// Number of records to save before stopping
    #[arg(short = 'n', long)]
    results_wanted: Option<u32>,

    /// Highest search-result page to request
    #[arg(long)]
    max_pages: Option<u32>,

    /// Explicit seed URL, bypassing keyword search (repeatable)
    #[arg(long = "start-url", value_name = "URL")]
    start_urls: Vec<String>,

    /// Dataset path
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the seed tasks without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics for the existing dataset and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match read_config(path) {
                Ok(loaded) => loaded,
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => (Config::default(), "defaults".to_string()),
    };

    apply_overrides(&mut config, &cli);

    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rozee_jobs=info,warn"),
            1 => EnvFilter::new("rozee_jobs=debug,info"),
            2 => EnvFilter::new("rozee_jobs=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(keyword) = &cli.keyword {
        config.search.keyword = keyword.clone();
    }
    if let Some(results_wanted) = cli.results_wanted {
        config.search.results_wanted = results_wanted;
    }
    if let Some(max_pages) = cli.max_pages {
        config.search.max_pages = max_pages;
    }
    if !cli.start_urls.is_empty() {
        config.search.start_urls = cli.start_urls.clone();
    }
    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
}

/// Handles the --dry-run mode: validates config and shows the seed tasks
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Rozee-Jobs Dry Run ===\n");

    println!("Search:");
    if config.search.keyword.trim().is_empty() {
        println!("  Keyword: (any)");
    } else {
        println!("  Keyword: {}", config.search.keyword);
    }
    println!("  Results wanted: {}", config.search.results_wanted);
    println!("  Max pages: {}", config.search.max_pages);

    println!("\nSite:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Source: {}", config.site.source);

    println!("\nCrawler Configuration:");
    println!(
        "  Concurrency: {}-{}",
        config.crawler.min_concurrency, config.crawler.max_concurrency
    );
    println!("  Max request retries: {}", config.crawler.max_request_retries);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Retry backoff: {}ms", config.crawler.retry_backoff_ms);
    println!("  Pacing delay: {}ms", config.crawler.pacing_delay_ms);
    println!("  Block phrases: {}", config.crawler.block_phrases.join(", "));

    println!("\nRequest:");
    println!("  User agents in rotation: {}", config.request.user_agents.len());
    match &config.proxy {
        Some(proxy) => println!("  Proxy: {}", proxy.url),
        None => println!("  Proxy: none"),
    }

    println!("\nOutput:");
    println!("  Format: {:?}", config.output.format);
    println!("  Path: {}", config.output.path);
    println!("  Batch size: {}", config.output.batch_size);

    let seeds = seed_tasks(config)?;
    println!("\nSeed Tasks ({}):", seeds.len());
    for task in &seeds {
        println!("  - {} {}", task.label(), task.url);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics for the dataset
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Dataset: {}\n", config.output.path);

    let store = open_store(&config.output)?;
    let stats = load_statistics(store.as_ref())?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&config.output)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight tasks");
            interrupt.cancel();
        }
    });

    match run_crawl(config, store, cancel).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
