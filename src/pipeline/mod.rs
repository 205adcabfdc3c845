//! Pipeline orchestrator: runs every stage in sequence.
//!
//! Stages still hand off through the filesystem exactly as they do when
//! invoked one at a time: the URL list is written and read back, pages are
//! saved and re-read, the CSV is written before dedupe reads it. Running
//! `mb-scrape run` is therefore interchangeable with running
//! `generate-urls`, `fetch`, `parse`, `dedupe` by hand.

use crate::config::AppConfig;
use crate::scraper::{self, MagicbricksSource};
use crate::storage;
use anyhow::{Context, Result};
use tracing::info;
use url::Url;

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<PipelineStats> {
        let paths = &self.config.paths;

        // ── 1. Generate search URLs ───────────────────────────────────────────
        info!("=== Step 1: Generating search URLs ===");
        let urls = scraper::search_urls(&self.config.site.base_url, self.config.site.total_pages);
        storage::write_url_list(&paths.urls_file, &urls)?;

        // ── 2. Fetch pages ────────────────────────────────────────────────────
        info!("=== Step 2: Fetching {} pages ===", urls.len());
        let urls = storage::read_url_list(&paths.urls_file)?;

        let source = MagicbricksSource::new(&self.config.scraper)
            .context("Failed to build page source")?;
        let report = scraper::fetch_pages(&source, &urls, &paths.raw_html_dir).await?;
        storage::write_failed_urls(&paths.failed_urls_file, &report.failed)?;

        // ── 3. Parse saved pages ──────────────────────────────────────────────
        info!("=== Step 3: Parsing saved pages ===");
        let origin = Url::parse(&self.config.site.origin)
            .context("Invalid site origin in config")?;
        let records = scraper::parse_saved_pages(
            &paths.raw_html_dir,
            &origin,
            &self.config.site.city,
        )?;
        storage::write_listings_csv(&paths.listings_csv, &records)?;

        // ── 4. Dedupe by listing URL ──────────────────────────────────────────
        info!("=== Step 4: Deduplicating ===");
        let rows = storage::read_listings_csv(&paths.listings_csv)?;
        let before = rows.len();
        let deduped = storage::dedupe_by_url(rows);
        storage::write_listings_csv(&paths.dedup_csv, &deduped)?;

        let stats = PipelineStats {
            pages_fetched: report.pages_saved,
            pages_failed: report.failed.len(),
            records_parsed: before,
            records_kept: deduped.len(),
        };

        info!(
            "=== Done: {} pages | {} failed | {} records | {} after dedupe ===",
            stats.pages_fetched, stats.pages_failed, stats.records_parsed, stats.records_kept,
        );

        Ok(stats)
    }
}

#[derive(Debug)]
pub struct PipelineStats {
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub records_parsed: usize,
    pub records_kept: usize,
}
