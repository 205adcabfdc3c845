use serde::{Deserialize, Serialize};

// ── Listing record ────────────────────────────────────────────────────────────

/// One parsed property listing. Field order is the CSV column order.
///
/// The `*_raw` fields keep the scraped text verbatim so cleaning can be
/// re-checked offline; the numeric fields are `None` whenever the raw text
/// didn't yield a clean value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub price_raw: Option<String>,
    pub price_num: Option<i64>,
    pub bhk_raw: Option<String>,
    pub bhk_number: Option<u32>,
    pub area_raw: Option<String>,
    pub area_sqft: Option<u32>,
    pub locality: Option<String>,
    pub city: String,
    pub listing_url: Option<String>,
}

// ── Raw card fragments ────────────────────────────────────────────────────────

/// Text fragments pulled out of one listing card before cleaning.
/// Every lookup is best-effort, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCard {
    pub price: Option<String>,
    pub title: Option<String>,
    pub area: Option<String>,
    /// Locality element text, used only when the title yields no locality.
    pub locality: Option<String>,
    /// Absolute listing URL, already resolved against the site origin.
    pub href: Option<String>,
}
