//! File-backed hand-off between stages: the URL list, raw HTML pages, the
//! listings CSV, and the failed-URL log. Each file is owned by the stage
//! that writes it and read-only for every stage after.

use crate::models::ListingRecord;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// ── URL list ──────────────────────────────────────────────────────────────────

/// Persist the ordered URL list as a pretty-printed JSON array.
pub fn write_url_list(path: &Path, urls: &[String]) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(urls)?;
    fs::write(path, json).with_context(|| format!("Could not write {:?}", path))?;
    info!("Saved {} URLs to {:?}", urls.len(), path);
    Ok(())
}

pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Could not read URL list {:?}", path))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid URL list in {:?}", path))
}

// ── Raw HTML pages ────────────────────────────────────────────────────────────

pub fn page_path(dir: &Path, page_no: usize) -> PathBuf {
    dir.join(format!("page_{}.html", page_no))
}

pub fn save_page(dir: &Path, page_no: usize, html: &str) -> Result<PathBuf> {
    let path = page_path(dir, page_no);
    fs::write(&path, html).with_context(|| format!("Could not write {:?}", path))?;
    Ok(path)
}

/// Saved page files in page-number order. Missing indices (failed fetches)
/// simply don't appear.
pub fn list_page_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut files: Vec<(usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(no) = page_number(&path) {
            files.push((no, path));
        }
    }

    files.sort_by_key(|(no, _)| *no);
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<usize> {
    if path.extension()? != "html" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("page_")?.parse().ok()
}

// ── Failed-URL log ────────────────────────────────────────────────────────────

/// Newline-separated failure log, written only when there were failures.
pub fn write_failed_urls(path: &Path, failed: &[String]) -> Result<()> {
    if failed.is_empty() {
        return Ok(());
    }
    fs::write(path, failed.join("\n"))
        .with_context(|| format!("Could not write {:?}", path))?;
    info!("Recorded {} failed URLs in {:?}", failed.len(), path);
    Ok(())
}

// ── Listings CSV ──────────────────────────────────────────────────────────────

/// Write records in order with a header row. Column order comes from the
/// `ListingRecord` field order; absent fields become empty cells.
pub fn write_listings_csv(path: &Path, records: &[ListingRecord]) -> Result<usize> {
    ensure_parent(path)?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Could not open {:?} for writing", path))?;

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!("Saved {} rows to {:?}", records.len(), path);
    Ok(records.len())
}

pub fn read_listings_csv(path: &Path) -> Result<Vec<ListingRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Could not open {:?}", path))?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: ListingRecord = row?;
        records.push(record);
    }
    Ok(records)
}

// ── Deduplication ─────────────────────────────────────────────────────────────

/// Keep the first record per listing URL, preserving input order. Records
/// with no URL all share the absent key, so only the first of them survives.
pub fn dedupe_by_url(records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    let mut seen: HashSet<Option<String>> = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.listing_url.clone()))
        .collect()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
