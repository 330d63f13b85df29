//! Shutter-Sweep main entry point
//!
//! This is the command-line interface for the Shutter-Sweep media crawler.

use clap::{Parser, ValueEnum};
use shutter_sweep::config::{load_config_with_hash, Config, SpiderMode};
use shutter_sweep::crawler::run_crawl;
use shutter_sweep::output::print_statistics;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Shutter-Sweep: a rule-driven media crawler
///
/// Shutter-Sweep walks a media site from its start pages, writes one JSON
/// record per image page, and downloads preview and full-size renditions of
/// each image.
#[derive(Parser, Debug)]
#[command(name = "shutter-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A rule-driven media crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Override the spider mode from the configuration file
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    SingleLevel,
    Recursive,
}

impl From<ModeArg> for SpiderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::SingleLevel => SpiderMode::SingleLevel,
            ModeArg::Recursive => SpiderMode::Recursive,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(mode) = cli.mode {
        config.site.mode = mode.into();
        tracing::info!("Spider mode overridden to {}", config.site.mode);
    }

    if cli.dry_run {
        handle_dry_run(&config);
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
            0 => EnvFilter::new("shutter_sweep=info,warn"),
            1 => EnvFilter::new("shutter_sweep=debug,info"),
            2 => EnvFilter::new("shutter_sweep=trace,debug"),
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

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Shutter-Sweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Items: {}", config.output.items_path);
    println!("  Images: {}", config.output.images_dir);
    println!(
        "  Allowed extensions: {} (default {})",
        config.storage.allowed_extensions.join(", "),
        config.storage.default_extension
    );

    println!("\nSite ({} mode):", config.site.mode);
    for url in &config.site.start_urls {
        println!("  * {}", url);
    }
    if config.site.allowed_domains.is_empty() {
        println!("  Allowed domains: any");
    } else {
        println!(
            "  Allowed domains: {}",
            config.site.allowed_domains.join(", ")
        );
    }

    println!("\nSelectors:");
    println!("  Thumbnail links: {}", config.selectors.thumbnail_links);
    println!(
        "  Image descriptor: {} [{}]",
        config.selectors.image_descriptor, config.selectors.descriptor_attribute
    );
    println!("  Title: {}", config.selectors.title);
    println!("  Categories: {}", config.selectors.categories);

    println!("\nRules ({}):", config.rules.len());
    for rule in &config.rules {
        let parser = rule
            .parser
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "discover".to_string());
        println!(
            "  - {} -> {}{}",
            rule.scope,
            parser,
            if rule.follow { "" } else { " (no follow)" }
        );
    }
    if config.site.mode == SpiderMode::SingleLevel && !config.rules.is_empty() {
        println!("  (ignored in single-level mode)");
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.site.start_urls.len()
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Mode: {}, seeds: {}, rules: {}",
        config.site.mode,
        config.site.start_urls.len(),
        config.rules.len()
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping crawl");
            on_interrupt.cancel();
        }
    });

    // Run the crawler
    match run_crawl(config, cancel).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            println!();
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
