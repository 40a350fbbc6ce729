//! jobtrawl - crawl job search results into JSON records.
//!
//! Records are written to stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobtrawl_browser::BrowserEngine;
use jobtrawl_core::AppConfig;
use jobtrawl_scanner::{JobSearch, Termination};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "jobtrawl")]
#[command(about = "Crawl paginated job search results into JSON records")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl consecutive result pages for the configured query
    Search {
        /// Page budget, overriding the configured one
        #[arg(short, long)]
        pages: Option<usize>,
    },

    /// Scrape a single result page
    Page {
        /// 0-based page index
        index: usize,
    },

    /// Scrape the recommended-jobs board on the jobs home page
    Board,

    /// Scrape one posting page
    Posting {
        /// Posting URL
        url: String,
    },
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,jobtrawl=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn emit(value: &impl Serialize) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

async fn execute(
    search: &mut JobSearch<BrowserEngine>,
    config: &AppConfig,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Search { pages } => {
            let query = config.search.to_query()?;
            let pages = pages.unwrap_or(config.search.max_pages);
            let delay = Duration::from_millis(config.pacing.between_pages_ms);

            let report = search.search_all_pages(&query, pages, delay).await;
            emit(&report.records)?;

            if let Termination::Failed(e) = report.termination {
                let kept = report.records.len();
                return Err(anyhow::Error::new(e)
                    .context(format!("crawl stopped early ({kept} records written)")));
            }
        }
        Commands::Page { index } => {
            let query = config.search.to_query()?;
            let records = search.search(&query, index).await?;
            emit(&records)?;
        }
        Commands::Board => {
            let buckets = search.recommended_jobs().await?;
            emit(&buckets)?;
        }
        Commands::Posting { url } => {
            let record = search.scrape_posting(&url).await?;
            emit(&record)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    info!("Starting jobtrawl v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env(cli.config.as_deref())
        .context("failed to load configuration")?;
    let engine = BrowserEngine::launch(&config.browser)
        .await
        .context("failed to launch browser")?;

    let mut search = JobSearch::from_config(engine, &config)?;
    let command = cli.command.unwrap_or(Commands::Search { pages: None });
    let outcome = execute(&mut search, &config, command).await;

    if let Err(e) = search.into_driver().close().await {
        tracing::warn!("Browser did not close cleanly: {}", e);
    }
    outcome
}
