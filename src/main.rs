//! Pagescope main entry point
//!
//! This is the command-line interface that serves the crawl API.

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use pagescope::config::{load_config_with_hash, Config};
use pagescope::crawler::Orchestrator;
use pagescope::output::{load_statistics, print_statistics};
use pagescope::storage::open_storage;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Pagescope: crawl job service for page analysis
///
/// Pagescope accepts URLs over a JSON API, crawls them on request and
/// records HTML version, title, heading counts, link counts, unreachable
/// links and login form presence for each page.
#[derive(Parser, Debug)]
#[command(name = "pagescope")]
#[command(version = "1.0.0")]
#[command(about = "Crawl job service for page analysis", long_about = None)]
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

    /// Validate the configuration and exit
    #[arg(long, conflicts_with = "stats")]
    check_config: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "check_config")]
    stats: bool,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.check_config {
        handle_check_config(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_serve(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber
///
/// `RUST_LOG` takes precedence; otherwise verbosity flags pick the filter.
/// actix-web's `log` records are forwarded into tracing by the subscriber.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("pagescope=info,actix_web=info,warn"),
                1 => EnvFilter::new("pagescope=debug,actix_web=info,info"),
                2 => EnvFilter::new("pagescope=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --check-config: prints the effective configuration
fn handle_check_config(config: &Config) {
    println!("=== Pagescope Configuration ===\n");

    println!("Server:");
    println!("  Bind address: {}", config.server.bind_address);
    println!("  Allowed origin: {}", config.server.allowed_origin);
    println!();

    println!("Crawler:");
    println!("  Page timeout: {}s", config.crawler.page_timeout);
    println!("  Max redirects: {}", config.crawler.max_redirects);
    println!(
        "  Max concurrent crawls: {}",
        config.crawler.max_concurrent_crawls
    );
    println!();

    println!("Link check:");
    println!("  Probe timeout: {}s", config.link_check.probe_timeout);
    println!(
        "  Max concurrent probes: {}",
        config.link_check.max_concurrent_probes
    );
    println!();

    println!("User agent: {}", config.user_agent.header_value());
    println!("Database: {}", config.storage.database_path);
    println!();

    println!("✓ Configuration is valid");
}

/// Handles --stats: shows record counts from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let storage = open_storage(Path::new(&config.storage.database_path))
        .with_context(|| format!("failed to open database {}", config.storage.database_path))?;
    let stats = load_statistics(&storage)?;

    print_statistics(&stats);

    Ok(())
}

/// Runs the HTTP API until shutdown
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(&config)
        .with_context(|| format!("failed to open database {}", config.storage.database_path))?;

    let recovered = orchestrator
        .recover_interrupted()
        .context("failed to recover interrupted crawls")?;
    if recovered > 0 {
        tracing::warn!("Marked {} interrupted crawl(s) as error", recovered);
    }

    let data = web::Data::new(orchestrator);
    let allowed_origin = config.server.allowed_origin.clone();

    tracing::info!(
        "Listening on {} (max {} concurrent crawls, {} probes per crawl)",
        config.server.bind_address,
        config.crawler.max_concurrent_crawls,
        config.link_check.max_concurrent_probes
    );

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(pagescope::api::cors_headers(&allowed_origin))
            .wrap(middleware::Logger::default())
            .configure(pagescope::api::configure)
    })
    .bind(&config.server.bind_address)
    .with_context(|| format!("failed to bind {}", config.server.bind_address))?
    .run()
    .await
    .context("HTTP server failed")?;

    tracing::info!("Server stopped");

    Ok(())
}
