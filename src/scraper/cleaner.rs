use crate::models::{ListingRecord, RawCard};

// ── Numeric token scanning ────────────────────────────────────────────────────

/// First numeric token in `s`: a digit run with an optional fractional part.
/// "approx 1.5 cr" → 1.5 | "flat-650" → 650.0
fn first_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let start = bytes.iter().position(|b| b.is_ascii_digit())?;
    let end = number_end(bytes, start);
    s[start..end].parse().ok()
}

/// End index of the numeric token starting at `start`. A dot only counts
/// when a digit follows it, so "650." parses as 650.
fn number_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    let mut seen_dot = false;
    while end < bytes.len() {
        let b = bytes[end];
        if b.is_ascii_digit() {
            end += 1;
        } else if b == b'.'
            && !seen_dot
            && end + 1 < bytes.len()
            && bytes[end + 1].is_ascii_digit()
        {
            seen_dot = true;
            end += 1;
        } else {
            break;
        }
    }
    end
}

/// First numeric token that is followed, after optional whitespace, by
/// `marker`. "651 sqft" / "651sqft" both match marker "sqft".
fn number_before_marker(s: &str, marker: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let end = number_end(bytes, i);
            let mut j = end;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if s[j..].starts_with(marker) {
                return s[i..end].parse().ok();
            }
            i = end;
        } else {
            i += 1;
        }
    }
    None
}

/// First bare integer token anywhere in `s`.
fn first_integer(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    let start = bytes.iter().position(|b| b.is_ascii_digit())?;
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    s[start..end].parse().ok()
}

// ── Field normalizers ─────────────────────────────────────────────────────────

/// Convert a listed price into whole rupees.
/// "₹54 Lac" → 5_400_000 | "₹1.50 Cr" → 15_000_000 | "₹51,00,000" → 5_100_000
///
/// Unit words are matched by substring on the cleaned text, crore before
/// lakh. A bare number above 100,000 is assumed to already be in rupees.
/// Anything smaller with no unit word passes through unmodified: the unit
/// is unknown at that point.
pub fn parse_price(raw: &str) -> Option<i64> {
    let s = raw
        .to_lowercase()
        .replace('₹', "")
        .replace("inr", "")
        .replace([',', ' '], "");

    let num = first_number(&s)?;

    // "cr" also covers "crore"
    if s.contains("cr") {
        return Some((num * 10_000_000.0) as i64);
    }
    // "lac" also covers "lacs"
    if s.contains("lac") || s.contains("lakh") {
        return Some((num * 100_000.0) as i64);
    }

    if num > 100_000.0 {
        // Large bare number: already whole rupees.
        return Some(num as i64);
    }
    // Small bare number, no unit word: ambiguous, passed through untouched.
    Some(num as i64)
}

/// Extract square footage.
/// "Carpet Area651 sqft" → 651 | "Super Area550 sqft" → 550
///
/// Prefers a number attached to "sqft"; falls back to the first bare
/// integer in the text.
pub fn parse_area(raw: &str) -> Option<u32> {
    let s = raw.to_lowercase().replace(',', "");

    if let Some(n) = number_before_marker(&s, "sqft") {
        return Some(n as u32);
    }
    first_integer(&s)
}

/// Extract the bedroom count from a title like "2 BHK Flat for Sale in Moshi".
/// Titles without a numeric BHK marker (Studio, 1 RK) yield `None`.
pub fn parse_bhk(raw: &str) -> Option<u32> {
    let s = raw.to_lowercase();
    number_before_marker(&s, "bhk").map(|n| n as u32)
}

/// Pull the locality out of a listing title: the text after the first
/// whole-word "in", up to the first comma.
/// "2 BHK Flat for Sale in Moshi, Pune" → "Moshi"
pub fn locality_from_title(title: &str) -> Option<String> {
    let title = title.trim();

    let rest = match title.split_once(" in ") {
        Some((_, rest)) => rest,
        // A bare trailing "in" has nothing after it.
        None => title.strip_suffix(" in").map(|_| "")?,
    };

    let locality = rest.split(',').next()?.trim();
    if locality.is_empty() {
        None
    } else {
        Some(locality.to_string())
    }
}

// ── Card → ListingRecord ──────────────────────────────────────────────────────

/// Assemble a record from one card's raw fragments. Every field is
/// best-effort; a card with nothing usable still produces a row.
pub fn card_to_record(card: &RawCard, city: &str) -> ListingRecord {
    let locality = card
        .title
        .as_deref()
        .and_then(locality_from_title)
        .or_else(|| card.locality.clone());

    ListingRecord {
        price_raw: card.price.clone(),
        price_num: card.price.as_deref().and_then(parse_price),
        bhk_raw: card.title.clone(),
        bhk_number: card.title.as_deref().and_then(parse_bhk),
        area_raw: card.area.clone(),
        area_sqft: card.area.as_deref().and_then(parse_area),
        locality,
        city: city.to_string(),
        listing_url: card.href.clone(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_units() {
        assert_eq!(parse_price("₹54 Lac"), Some(5_400_000));
        assert_eq!(parse_price("₹1.50 Cr"), Some(15_000_000));
        assert_eq!(parse_price("₹2 Crore"), Some(20_000_000));
        assert_eq!(parse_price("₹85.5 Lacs"), Some(8_550_000));
        assert_eq!(parse_price("INR 30 Lakh"), Some(3_000_000));
    }

    #[test]
    fn test_parse_price_plain_rupees() {
        // Indian comma grouping strips down to a bare number
        assert_eq!(parse_price("₹51,00,000"), Some(5_100_000));
        assert_eq!(parse_price("5100000"), Some(5_100_000));
    }

    #[test]
    fn test_parse_price_ambiguous_passthrough() {
        // No unit word and not obviously rupees: left as-is
        assert_eq!(parse_price("₹500"), Some(500));
    }

    #[test]
    fn test_parse_price_unparseable() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("Price on Request"), None);
    }

    #[test]
    fn test_parse_area() {
        assert_eq!(parse_area("Carpet Area651 sqft"), Some(651));
        assert_eq!(parse_area("Super Area550 sqft"), Some(550));
        assert_eq!(parse_area("1,050 sqft"), Some(1050));
        assert_eq!(parse_area("650sqft"), Some(650));
    }

    #[test]
    fn test_parse_area_fallback_integer() {
        // No sqft marker: first bare integer wins
        assert_eq!(parse_area("Plot 2400"), Some(2400));
        assert_eq!(parse_area("no digits here"), None);
    }

    #[test]
    fn test_parse_bhk() {
        assert_eq!(parse_bhk("2 BHK Flat for Sale in Moshi, Pune"), Some(2));
        assert_eq!(parse_bhk("3BHK Apartment"), Some(3));
        assert_eq!(parse_bhk("Studio Apartment"), None);
        assert_eq!(parse_bhk("1 RK"), None);
    }

    #[test]
    fn test_locality_from_title() {
        assert_eq!(
            locality_from_title("2 BHK Flat for Sale in Moshi, Pune"),
            Some("Moshi".to_string())
        );
        assert_eq!(
            locality_from_title("3 BHK Flat for Sale in Wakad"),
            Some("Wakad".to_string())
        );
        assert_eq!(locality_from_title("No locality marker here"), None);
        assert_eq!(locality_from_title("Plot for Sale in"), None);
        assert_eq!(locality_from_title(""), None);
    }

    #[test]
    fn test_card_to_record_full() {
        let card = RawCard {
            price: Some("₹54 Lac".into()),
            title: Some("2 BHK Flat for Sale in Moshi, Pune".into()),
            area: Some("Carpet Area651 sqft".into()),
            locality: Some("Moshi Annexe".into()),
            href: Some("https://www.magicbricks.com/p/123".into()),
        };

        let rec = card_to_record(&card, "Pune");
        assert_eq!(rec.price_num, Some(5_400_000));
        assert_eq!(rec.bhk_number, Some(2));
        assert_eq!(rec.area_sqft, Some(651));
        // Title-derived locality wins over the element fallback
        assert_eq!(rec.locality.as_deref(), Some("Moshi"));
        assert_eq!(rec.city, "Pune");
    }

    #[test]
    fn test_card_to_record_locality_fallback() {
        let card = RawCard {
            title: Some("Residential Plot for Sale".into()),
            locality: Some("Hinjewadi".into()),
            ..Default::default()
        };

        let rec = card_to_record(&card, "Pune");
        assert_eq!(rec.locality.as_deref(), Some("Hinjewadi"));
    }

    #[test]
    fn test_card_to_record_all_absent() {
        let rec = card_to_record(&RawCard::default(), "Pune");
        assert_eq!(rec.price_raw, None);
        assert_eq!(rec.price_num, None);
        assert_eq!(rec.bhk_number, None);
        assert_eq!(rec.area_sqft, None);
        assert_eq!(rec.locality, None);
        assert_eq!(rec.listing_url, None);
        assert_eq!(rec.city, "Pune");
    }
}
