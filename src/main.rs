mod config;
mod models;
mod pipeline;
mod scraper;
mod storage;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use crate::scraper::MagicbricksSource;

#[derive(Parser)]
#[command(name = "mb-scrape", about = "MagicBricks property listing scraper", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Write the paginated search URL list (JSON array)
    GenerateUrls {
        /// Number of search pages (default: from config)
        #[arg(short, long)]
        pages: Option<u32>,
    },

    /// Download every URL in the list to raw HTML files
    Fetch,

    /// Parse saved HTML pages into the listings CSV
    Parse,

    /// Drop rows sharing a listing URL, keeping the first occurrence
    Dedupe,

    /// Run every stage in sequence
    Run,

    /// Show statistics from the parsed CSV
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "mb_listing_scraper=info,warn",
        1 => "mb_listing_scraper=debug,info",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::GenerateUrls { pages } => {
            let _t = utils::Timer::start("URL generation");
            let pages = pages.unwrap_or(config.site.total_pages);
            let urls = scraper::search_urls(&config.site.base_url, pages);
            storage::write_url_list(&config.paths.urls_file, &urls)?;
        }

        Command::Fetch => {
            let _t = utils::Timer::start("Page fetch");
            let urls = storage::read_url_list(&config.paths.urls_file)?;
            info!("{} URLs to fetch", urls.len());

            let source = MagicbricksSource::new(&config.scraper)
                .context("Failed to build page source")?;
            let report = scraper::fetch_pages(&source, &urls, &config.paths.raw_html_dir).await?;

            storage::write_failed_urls(&config.paths.failed_urls_file, &report.failed)?;
            if report.failed.is_empty() {
                info!("All pages downloaded successfully");
            }
        }

        Command::Parse => {
            let _t = utils::Timer::start("HTML parse");
            let origin = Url::parse(&config.site.origin)
                .context("Invalid site origin in config")?;
            let records = scraper::parse_saved_pages(
                &config.paths.raw_html_dir,
                &origin,
                &config.site.city,
            )?;
            storage::write_listings_csv(&config.paths.listings_csv, &records)?;
        }

        Command::Dedupe => {
            let _t = utils::Timer::start("Dedupe");
            let rows = storage::read_listings_csv(&config.paths.listings_csv)?;
            let before = rows.len();
            let deduped = storage::dedupe_by_url(rows);
            info!("Before: {} — After: {}", before, deduped.len());
            storage::write_listings_csv(&config.paths.dedup_csv, &deduped)?;
        }

        Command::Run => {
            let _t = utils::Timer::start("Full pipeline");
            let stats = Pipeline::new(config).run().await?;
            info!(
                "Done: {} pages fetched, {} failed, {} records, {} after dedupe",
                stats.pages_fetched, stats.pages_failed, stats.records_parsed, stats.records_kept
            );
        }

        Command::Stats => {
            let path = &config.paths.listings_csv;
            if !path.exists() {
                println!("No parsed listings — run `mb-scrape parse` first.");
                return Ok(());
            }

            let records = storage::read_listings_csv(path)?;
            let unique_urls: HashSet<_> = records
                .iter()
                .filter_map(|r| r.listing_url.as_deref())
                .collect();
            let localities: HashSet<_> = records
                .iter()
                .filter_map(|r| r.locality.as_deref())
                .collect();
            let prices: Vec<i64> = records.iter().filter_map(|r| r.price_num).collect();

            println!("─────────────────────────────────");
            println!("  MagicBricks Scraper — Stats");
            println!("─────────────────────────────────");
            println!("  Rows        : {}", utils::fmt_inr(records.len() as i64));
            println!("  Unique URLs : {}", utils::fmt_inr(unique_urls.len() as i64));
            println!("  Localities  : {}", utils::fmt_inr(localities.len() as i64));
            match (prices.iter().min(), prices.iter().max()) {
                (Some(min), Some(max)) => {
                    println!("  Price range : ₹{} – ₹{}", utils::fmt_inr(*min), utils::fmt_inr(*max));
                }
                _ => println!("  Price range : —"),
            }
            println!("─────────────────────────────────");
        }
    }

    Ok(())
}
