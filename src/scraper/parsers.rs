use crate::models::RawCard;
use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use url::Url;

// ── Search-results page ───────────────────────────────────────────────────────

/// Extract one `RawCard` per listing card on a search-results page.
///
/// Every per-card lookup degrades to `None` on its own; a card missing a
/// field (or missing everything) still yields a `RawCard` and never affects
/// the cards after it.
pub fn parse_search_page(html: &str, origin: &Url) -> Result<Vec<RawCard>> {
    let doc = Html::parse_document(html);

    let card_sel = sel("div.mb-srp__card")?;
    let price_sel = sel("div.mb-srp__card__price--amount")?;
    // Titles move between heading levels and anchors across page variants
    let title_any_sel = sel("h2, h3, a")?;
    let title_fallback_sel = sel("h2.mb-srp__card--title")?;
    let area_sel = sel("div.mb-srp__card__summary__list--item")?;
    let locality_sel = sel("div.mb-srp__card__address--locality")?;
    let anchor_sel = sel("a[href]")?;

    let mut cards = Vec::new();

    for card in doc.select(&card_sel) {
        let price = first_text(card, &price_sel);

        let title = card
            .select(&title_any_sel)
            .map(|el| element_text(el))
            .find(|t| !t.is_empty() && t.contains("BHK"))
            .or_else(|| first_text(card, &title_fallback_sel));

        let area = first_text(card, &area_sel).or_else(|| free_text_area(card));

        let locality = first_text(card, &locality_sel);

        let href = card
            .select(&anchor_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|h| resolve_href(origin, h));

        cards.push(RawCard {
            price,
            title,
            area,
            locality,
            href,
        });
    }

    Ok(cards)
}

fn sel(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("selector `{}`: {:?}", css, e))
}

// ── Per-card lookups ──────────────────────────────────────────────────────────

/// Text of the first element under `card` matching `selector`, or `None`.
fn first_text(card: ElementRef, selector: &Selector) -> Option<String> {
    card.select(selector).next().map(element_text).filter(|t| !t.is_empty())
}

/// Whitespace-normalized text content of an element.
fn element_text(el: ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Free-text fallback for the area field: the first text node in the card
/// mentioning carpet/super/built area together with "sqft".
fn free_text_area(card: ElementRef) -> Option<String> {
    for node in card.text() {
        let lower = node.to_lowercase();
        for marker in ["carpet", "super", "built"] {
            if let Some(pos) = lower.find(marker) {
                if lower[pos..].contains("sqft") {
                    let text = node.trim();
                    if !text.is_empty() {
                        return Some(text.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Resolve a card href to an absolute URL. `Url::join` upgrades
/// scheme-relative links ("//…") and prefixes root-relative ones ("/…");
/// already-absolute links pass through.
fn resolve_href(origin: &Url, href: &str) -> Option<String> {
    origin.join(href).ok().map(|u| u.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <div class="mb-srp__card">
            <h2 class="mb-srp__card--title">2 BHK Flat for Sale in Moshi, Pune</h2>
            <div class="mb-srp__card__price--amount">&#8377;54 Lac</div>
            <div class="mb-srp__card__summary__list--item">Carpet Area651 sqft</div>
            <div class="mb-srp__card__address--locality">Moshi</div>
            <a href="/propertydetail/flat-moshi-1">View</a>
        </div>
        <div class="mb-srp__card">
            <h2 class="mb-srp__card--title">Studio Apartment for Sale in Kharadi, Pune</h2>
            <div class="mb-srp__card__desc"><span>Super Area550 sqft</span></div>
            <a href="//www.magicbricks.com/propertydetail/studio-kharadi-2">View</a>
        </div>
        <div class="mb-srp__card">
            <div class="mb-srp__card__filler">Coming soon</div>
        </div>
        </body></html>
    "#;

    fn origin() -> Url {
        Url::parse("https://www.magicbricks.com").unwrap()
    }

    #[test]
    fn test_parse_search_page_full_card() {
        let cards = parse_search_page(PAGE, &origin()).unwrap();
        assert_eq!(cards.len(), 3);

        let first = &cards[0];
        assert_eq!(first.price.as_deref(), Some("₹54 Lac"));
        assert_eq!(
            first.title.as_deref(),
            Some("2 BHK Flat for Sale in Moshi, Pune")
        );
        assert_eq!(first.area.as_deref(), Some("Carpet Area651 sqft"));
        assert_eq!(first.locality.as_deref(), Some("Moshi"));
        assert_eq!(
            first.href.as_deref(),
            Some("https://www.magicbricks.com/propertydetail/flat-moshi-1")
        );
    }

    #[test]
    fn test_missing_price_degrades_without_dropping_card() {
        let cards = parse_search_page(PAGE, &origin()).unwrap();

        let second = &cards[1];
        assert_eq!(second.price, None);
        // No BHK in any heading text: structural title fallback applies
        assert_eq!(
            second.title.as_deref(),
            Some("Studio Apartment for Sale in Kharadi, Pune")
        );
        // No summary list item: free-text area fallback applies
        assert_eq!(second.area.as_deref(), Some("Super Area550 sqft"));
        // Scheme-relative link upgraded
        assert_eq!(
            second.href.as_deref(),
            Some("https://www.magicbricks.com/propertydetail/studio-kharadi-2")
        );
    }

    #[test]
    fn test_empty_card_yields_all_absent() {
        let cards = parse_search_page(PAGE, &origin()).unwrap();
        assert_eq!(cards[2], RawCard::default());
    }

    #[test]
    fn test_no_cards_on_page() {
        let cards = parse_search_page("<html><body><p>404</p></body></html>", &origin()).unwrap();
        assert!(cards.is_empty());
    }

    #[test]
    fn test_resolve_href() {
        let o = origin();
        assert_eq!(
            resolve_href(&o, "/p/1").as_deref(),
            Some("https://www.magicbricks.com/p/1")
        );
        assert_eq!(
            resolve_href(&o, "//cdn.magicbricks.com/p/2").as_deref(),
            Some("https://cdn.magicbricks.com/p/2")
        );
        assert_eq!(
            resolve_href(&o, "https://example.com/p/3").as_deref(),
            Some("https://example.com/p/3")
        );
    }
}
