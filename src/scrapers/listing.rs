use crate::config::{ScrapeConfig, Selectors};
use crate::scrapers::types::{Absent, DetailReview, Extracted, ListingItem};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Compile a configured selector; a broken one matches nothing
fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!("Invalid selector '{}': {:?}", selector, e);
            None
        }
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty text under `selector`
fn field_text(item: ElementRef<'_>, selector: Option<&Selector>) -> Extracted<String> {
    let selector = selector.ok_or(Absent)?;
    let text = item.select(selector).next().map(text_of).ok_or(Absent)?;
    if text.is_empty() {
        Err(Absent)
    } else {
        Ok(text)
    }
}

/// Extract every listing item from a catalog page snapshot
pub fn parse_listing_items(html: &str, config: &ScrapeConfig) -> Vec<ListingItem> {
    let selectors = &config.selectors;
    let Some(item_sel) = compile(&selectors.listing_item) else {
        return Vec::new();
    };
    let link_sel = compile(&selectors.item_link);
    let score_sel = compile(&selectors.item_score);
    let adjective_sel = compile(&selectors.item_adjective);

    let document = Html::parse_document(html);
    let items: Vec<ListingItem> = document
        .select(&item_sel)
        .map(|item| {
            let anchor = link_sel.as_ref().and_then(|sel| item.select(sel).next());
            let name = anchor.map(text_of).filter(|n| !n.is_empty()).ok_or(Absent);
            let link = anchor
                .and_then(|a| a.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty())
                .map(|href| config.absolute_url(href))
                .ok_or(Absent);

            ListingItem {
                name,
                link,
                score: field_text(item, score_sel.as_ref()),
                adjective: field_text(item, adjective_sel.as_ref()),
            }
        })
        .collect();

    debug!("Parsed {} listing items", items.len());
    items
}

/// Names only, for the filter passes
pub fn parse_item_names(html: &str, config: &ScrapeConfig) -> Vec<String> {
    parse_listing_items(html, config)
        .into_iter()
        .filter_map(|item| item.name.ok())
        .collect()
}

/// Extract pros/cons lists from a review page, dropping blank entries
pub fn parse_detail_page(html: &str, selectors: &Selectors) -> DetailReview {
    let document = Html::parse_document(html);
    let collect = |selector: &str| -> Vec<String> {
        compile(selector)
            .map(|sel| {
                document
                    .select(&sel)
                    .map(text_of)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    };

    DetailReview {
        pros: collect(&selectors.pros),
        cons: collect(&selectors.cons),
    }
}
