pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::models::ListingRecord;
use crate::storage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

use self::cleaner::card_to_record;
use self::http_client::{FetchError, HttpClient};
use self::parsers::parse_search_page;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable page source abstraction.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

// ── MagicBricks source ────────────────────────────────────────────────────────

pub struct MagicbricksSource {
    client: HttpClient,
}

impl MagicbricksSource {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }
}

#[async_trait]
impl PageSource for MagicbricksSource {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.client.get_text(url).await
    }
}

// ── URL generation ────────────────────────────────────────────────────────────

/// Ordered sequence of search-result URLs. Page 1 is the bare search URL;
/// page N ≥ 2 appends `/page-N`.
pub fn search_urls(base_url: &str, total_pages: u32) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    (1..=total_pages)
        .map(|page| {
            if page <= 1 {
                base.to_string()
            } else {
                format!("{}/page-{}", base, page)
            }
        })
        .collect()
}

// ── Fetch stage ───────────────────────────────────────────────────────────────

/// Outcome of one fetch run. Failed URLs are returned to the caller;
/// nothing accumulates in shared state.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub pages_saved: usize,
    pub failed: Vec<String>,
}

/// Download every URL in order, saving each successful body as
/// `page_<n>.html` under `raw_dir`. Page numbers follow URL order, so a
/// failed URL leaves a gap rather than shifting later pages. A failure is
/// recorded and the sequence continues.
pub async fn fetch_pages(
    source: &dyn PageSource,
    urls: &[String],
    raw_dir: &Path,
) -> Result<FetchReport> {
    std::fs::create_dir_all(raw_dir)
        .with_context(|| format!("Could not create dir {:?}", raw_dir))?;

    let mut report = FetchReport::default();

    for (i, url) in urls.iter().enumerate() {
        let page_no = i + 1;

        match source.fetch_page(url).await {
            Ok(html) => {
                let path = storage::save_page(raw_dir, page_no, &html)?;
                debug!("Saved {:?}", path);
                report.pages_saved += 1;
            }
            Err(e) => {
                warn!("Page {}/{}: {}", page_no, urls.len(), e);
                report.failed.push(url.clone());
            }
        }
    }

    info!(
        "Fetched {}/{} pages ({} failed)",
        report.pages_saved,
        urls.len(),
        report.failed.len()
    );
    Ok(report)
}

// ── Parse stage ───────────────────────────────────────────────────────────────

/// Read every saved page in index order and turn its cards into records.
/// One record per card, however sparse the card was.
pub fn parse_saved_pages(raw_dir: &Path, origin: &Url, city: &str) -> Result<Vec<ListingRecord>> {
    let files = storage::list_page_files(raw_dir)?;
    if files.is_empty() {
        warn!("No saved HTML files found in {:?}", raw_dir);
        return Ok(vec![]);
    }

    let mut records = Vec::new();

    for path in &files {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {:?}", path))?;

        let cards = parse_search_page(&html, origin)
            .with_context(|| format!("Could not parse {:?}", path))?;

        debug!("{:?}: {} cards", path, cards.len());

        for card in &cards {
            records.push(card_to_record(card, city));
        }
    }

    info!("Parsed {} records from {} pages", records.len(), files.len());
    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
