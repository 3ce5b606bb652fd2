//! Detail-page scraping
//!
//! One-off lookups of a single item page. Each field has its own extractor with
//! an ordered list of candidate selectors; the first candidate that yields a
//! value wins. Page markup changes only ever touch one extractor.

use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::client::ArchiveSource;
use super::enricher::synthesized_description;
use super::text;
use crate::config::ArchiveConfig;
use crate::types::ItemDetails;

/// Title used when the page has no recognizable heading
pub const UNKNOWN_TITLE: &str = "Unknown Title";

const TITLE_SELECTORS: &[&str] = &["h1", "div.item-title"];
const DESCRIPTION_SELECTORS: &[&str] = &["div.item-description"];
const DESCRIPTION_META_SELECTOR: &str = r#"meta[name="description"]"#;
const YEAR_BLOCK_SELECTORS: &[&str] = &["div.key-val-big"];
const IMAGE_SELECTORS: &[&str] = &[
    "img.item-image",
    "div#theatre-ia-wrap img",
    "div.item-image-carousel img",
];
const IMAGE_LINK_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

/// Scrapes single detail pages
pub struct ItemDetailFetcher {
    source: Arc<dyn ArchiveSource>,
    config: ArchiveConfig,
}

impl ItemDetailFetcher {
    pub fn new(source: Arc<dyn ArchiveSource>, config: ArchiveConfig) -> Self {
        Self { source, config }
    }

    /// Fetch and scrape a detail page; `None` when the page cannot be fetched
    pub async fn fetch_details(&self, page_url: &Url) -> Option<ItemDetails> {
        let html = match self.source.detail_page(page_url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to fetch detail page {}: {}", page_url, e);
                return None;
            }
        };

        let details = parse_details(&html, page_url, &self.config.wikipedia_search_url);
        debug!("Scraped '{}' from {}", details.title, page_url);
        Some(details)
    }
}

/// Extract every field from detail-page markup
pub fn parse_details(html: &str, page_url: &Url, reference_template: &str) -> ItemDetails {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let description =
        extract_description(&document).unwrap_or_else(|| synthesized_description(&title));
    let year_block = extract_year_block(&document);
    let year = text::first_year([
        year_block.as_deref(),
        Some(title.as_str()),
        Some(description.as_str()),
    ]);
    let image_url = extract_image(&document, page_url);

    ItemDetails {
        reference_url: text::reference_search_url(&title, reference_template),
        title,
        year,
        image_url,
        description,
    }
}

fn extract_title(document: &Html) -> Option<String> {
    first_text(document, TITLE_SELECTORS)
}

fn extract_description(document: &Html) -> Option<String> {
    first_text(document, DESCRIPTION_SELECTORS).or_else(|| {
        first_attr(document, &[DESCRIPTION_META_SELECTOR], "content")
            .map(|content| text::normalize_whitespace(&content))
            .filter(|content| !content.is_empty())
    })
}

fn extract_year_block(document: &Html) -> Option<String> {
    first_text(document, YEAR_BLOCK_SELECTORS)
}

fn extract_image(document: &Html, page_url: &Url) -> Option<String> {
    first_attr(document, IMAGE_SELECTORS, "src")
        .or_else(|| extract_image_link(document))
        .and_then(|src| page_url.join(&src).ok())
        .map(|url| url.to_string())
}

/// First anchor pointing straight at an image file
fn extract_image_link(document: &Html) -> Option<String> {
    let selector = Selector::parse("a[href]").ok()?;
    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| {
            let lower = href.to_lowercase();
            IMAGE_LINK_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        })
        .map(str::to_string)
}

/// Cleaned text of the first candidate element that has any
fn first_text(document: &Html, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        first_element(document, candidate).and_then(|element| {
            let raw: String = element.text().collect::<Vec<_>>().join(" ");
            let cleaned = text::clean_markup(Some(&raw));
            (!cleaned.is_empty()).then_some(cleaned)
        })
    })
}

/// Non-empty attribute of the first candidate element carrying it
fn first_attr(document: &Html, candidates: &[&str], attr: &str) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        let selector = Selector::parse(candidate).ok()?;
        document
            .select(&selector)
            .filter_map(|element| element.value().attr(attr))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    })
}

fn first_element<'a>(document: &'a Html, candidate: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(candidate).ok()?;
    document.select(&selector).next()
}
