use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub scraper: ScraperConfig,
    pub paths: PathsConfig,
}

/// Portal-specific constants
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Origin used to absolutize relative listing links.
    #[serde(default = "default_origin")]
    pub origin: String,

    #[serde(default = "default_city")]
    pub city: String,

    #[serde(default = "default_total_pages")]
    pub total_pages: u32,
}

/// Fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

/// File hand-off locations between stages
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default = "default_urls_file")]
    pub urls_file: PathBuf,

    #[serde(default = "default_raw_html_dir")]
    pub raw_html_dir: PathBuf,

    #[serde(default = "default_listings_csv")]
    pub listings_csv: PathBuf,

    #[serde(default = "default_dedup_csv")]
    pub dedup_csv: PathBuf,

    #[serde(default = "default_failed_urls_file")]
    pub failed_urls_file: PathBuf,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://www.magicbricks.com/flats-in-pune-for-sale-pppfs".to_string()
}
fn default_origin() -> String {
    "https://www.magicbricks.com".to_string()
}
fn default_city() -> String {
    "Pune".to_string()
}
fn default_total_pages() -> u32 {
    100
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_request_delay_ms() -> u64 {
    5000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string()
}
fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}
fn default_urls_file() -> PathBuf {
    PathBuf::from("data/urls/urls_pune.json")
}
fn default_raw_html_dir() -> PathBuf {
    PathBuf::from("data/raw_html/pune")
}
fn default_listings_csv() -> PathBuf {
    PathBuf::from("data/parsed/pune/listings_cleaned.csv")
}
fn default_dedup_csv() -> PathBuf {
    PathBuf::from("data/parsed/pune/listings_cleaned_dedup.csv")
}
fn default_failed_urls_file() -> PathBuf {
    PathBuf::from("failed_urls.txt")
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("MB").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig {
                base_url: default_base_url(),
                origin: default_origin(),
                city: default_city(),
                total_pages: default_total_pages(),
            },
            scraper: ScraperConfig {
                timeout_secs: default_timeout_secs(),
                request_delay_ms: default_request_delay_ms(),
                user_agent: default_user_agent(),
                accept_language: default_accept_language(),
            },
            paths: PathsConfig {
                urls_file: default_urls_file(),
                raw_html_dir: default_raw_html_dir(),
                listings_csv: default_listings_csv(),
                dedup_csv: default_dedup_csv(),
                failed_urls_file: default_failed_urls_file(),
            },
        }
    }
}
