//! Per-item enrichment
//!
//! Turns one raw search hit into a [`CanonicalItem`] by fetching the item's
//! metadata, resolving a downloadable image and normalizing every text field.
//! A failing item is logged and skipped; it never fails the page it belongs to.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

use super::client::{ArchiveSource, RawFile, RawMetadataRecord, RawSearchHit};
use super::text;
use crate::config::ArchiveConfig;
use crate::types::{CanonicalItem, UNTITLED_ITEM};

/// Formats (and file extensions) accepted as a direct image
const IMAGE_FORMATS: &[&str] = &["jpeg", "jpg", "png", "gif", "tif", "tiff", "bmp"];

/// Filename markers of archive-generated thumbnails
const THUMBNAIL_MARKERS: &[&str] = &["_thumb", "thumbnail"];

/// Subject used when a hit has no title to describe
const GENERIC_SUBJECT: &str = "Retro computing item";

/// Resolves raw hits into canonical items
pub struct ItemEnricher {
    source: Arc<dyn ArchiveSource>,
    config: ArchiveConfig,
}

impl ItemEnricher {
    pub fn new(source: Arc<dyn ArchiveSource>, config: ArchiveConfig) -> Self {
        Self { source, config }
    }

    /// Enrich one hit; `None` when it cannot become a displayable record
    pub async fn enrich(&self, hit: &RawSearchHit) -> Option<CanonicalItem> {
        let identifier = hit.identifier.as_deref().map(str::trim).filter(|id| !id.is_empty());
        let Some(identifier) = identifier else {
            debug!("Skipping hit without identifier");
            return None;
        };

        let metadata = match self.source.metadata(identifier).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Could not fetch metadata for {}: {}", identifier, e);
                return None;
            }
        };

        self.build_item(identifier, hit, &metadata)
    }

    /// Enrich a page of hits concurrently, keeping the input order
    pub async fn enrich_all(&self, hits: Vec<RawSearchHit>) -> Vec<CanonicalItem> {
        let total = hits.len();
        let items: Vec<CanonicalItem> = stream::iter(hits)
            .map(|hit| async move { self.enrich(&hit).await })
            .buffered(self.config.enrich_concurrency.max(1))
            .filter_map(|item| async move { item })
            .collect()
            .await;

        debug!("Enriched {} of {} hits", items.len(), total);
        items
    }

    /// Merge a hit with its metadata into a canonical item
    pub(crate) fn build_item(
        &self,
        identifier: &str,
        hit: &RawSearchHit,
        metadata: &RawMetadataRecord,
    ) -> Option<CanonicalItem> {
        let Some(image_url) = self.resolve_image(identifier, &metadata.files) else {
            debug!("No image for {}, dropping", identifier);
            return None;
        };

        let year = text::first_year([
            metadata.metadata.year.as_deref(),
            hit.year.as_deref(),
            hit.date.as_deref(),
            hit.title.as_deref(),
            metadata.metadata.description.as_deref(),
        ]);

        let raw_title = hit.title.as_deref().map(text::normalize_whitespace).unwrap_or_default();
        let title = if raw_title.is_empty() {
            UNTITLED_ITEM.to_string()
        } else {
            raw_title.clone()
        };

        let description = [hit.description.as_deref(), metadata.metadata.description.as_deref()]
            .into_iter()
            .map(text::clean_markup)
            .find(|d| !d.is_empty())
            .unwrap_or_else(|| synthesized_description(&raw_title));
        let description = text::truncate_words(&description, self.config.description_word_limit);

        Some(CanonicalItem {
            id: format!("archive-{}", identifier),
            reference_url: text::reference_search_url(&title, &self.config.wikipedia_search_url),
            title,
            year,
            image_url,
            archive_url: format!("{}/details/{}", self.config.base(), identifier),
            description,
        })
    }

    /// Image priority: direct image file, then thumbnail, then the image service
    fn resolve_image(&self, identifier: &str, files: &[RawFile]) -> Option<String> {
        if identifier.is_empty() {
            return None;
        }

        let thumbnail = files
            .iter()
            .filter_map(|f| f.name.as_deref())
            .find(|name| is_thumbnail(name))
            .map(|name| self.download_url(identifier, name));

        let direct = files
            .iter()
            .filter(|f| is_image_file(f))
            .filter_map(|f| f.name.as_deref())
            .find(|name| !name.starts_with("./") && name.contains('.'))
            .map(|name| self.download_url(identifier, name));

        direct
            .or(thumbnail)
            .or_else(|| Some(format!("{}/services/img/{}", self.config.base(), identifier)))
    }

    fn download_url(&self, identifier: &str, name: &str) -> String {
        format!(
            "{}/download/{}/{}",
            self.config.base(),
            identifier,
            urlencoding::encode(name)
        )
    }
}

fn is_thumbnail(name: &str) -> bool {
    THUMBNAIL_MARKERS.iter().any(|marker| name.contains(marker))
}

fn is_image_file(file: &RawFile) -> bool {
    let format_matches = file
        .format
        .as_deref()
        .map(|f| IMAGE_FORMATS.contains(&f.to_lowercase().as_str()))
        .unwrap_or(false);

    let extension_matches = file
        .name
        .as_deref()
        .map(|name| {
            let lower = name.to_lowercase();
            IMAGE_FORMATS.iter().any(|ext| lower.ends_with(&format!(".{}", ext)))
        })
        .unwrap_or(false);

    format_matches || extension_matches
}

pub(crate) fn synthesized_description(title: &str) -> String {
    let subject = if title.is_empty() { GENERIC_SUBJECT } else { title };
    format!(
        "{} - A piece of computing history from the Archive.org collection.",
        subject
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::client::{RawMetadataFields, UpstreamError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use url::Url;

    /// Serves canned metadata; identifiers without an entry fail
    struct FixtureSource {
        metadata: HashMap<String, RawMetadataRecord>,
    }

    #[async_trait]
    impl ArchiveSource for FixtureSource {
        async fn search(&self, _term: &str, _page: u32) -> Result<Vec<RawSearchHit>, UpstreamError> {
            Ok(Vec::new())
        }

        async fn metadata(&self, identifier: &str) -> Result<RawMetadataRecord, UpstreamError> {
            self.metadata.get(identifier).cloned().ok_or(UpstreamError::Status {
                status: 404,
                url: identifier.to_string(),
            })
        }

        async fn detail_page(&self, url: &Url) -> Result<String, UpstreamError> {
            Err(UpstreamError::InvalidUrl(url.to_string()))
        }
    }

    fn enricher(metadata: Vec<(&str, RawMetadataRecord)>) -> ItemEnricher {
        let source = FixtureSource {
            metadata: metadata.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        };
        ItemEnricher::new(Arc::new(source), ArchiveConfig::default())
    }

    fn file(name: &str, format: &str) -> RawFile {
        RawFile {
            name: Some(name.to_string()),
            format: Some(format.to_string()),
            ..Default::default()
        }
    }

    fn hit(identifier: &str, title: &str) -> RawSearchHit {
        RawSearchHit {
            identifier: Some(identifier.to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    fn record(files: Vec<RawFile>) -> RawMetadataRecord {
        RawMetadataRecord {
            metadata: RawMetadataFields::default(),
            files,
        }
    }

    #[test]
    fn test_direct_image_preferred_over_thumbnail() {
        let e = enricher(vec![]);
        let files = vec![
            file("__ia_thumb.webp", "Item Tile"),
            file("manual.pdf", "Text PDF"),
            file("front panel.JPG", "JPEG"),
        ];
        let url = e.resolve_image("altair", &files).unwrap();
        assert_eq!(url, "https://archive.org/download/altair/front%20panel.JPG");
    }

    #[test]
    fn test_thumbnail_used_when_no_direct_image() {
        let e = enricher(vec![]);
        let files = vec![file("scan_thumb.gif_meta", "Metadata"), file("manual.pdf", "Text PDF")];
        let url = e.resolve_image("altair", &files).unwrap();
        assert_eq!(url, "https://archive.org/download/altair/scan_thumb.gif_meta");
    }

    #[test]
    fn test_relative_and_extensionless_images_skipped() {
        let e = enricher(vec![]);
        let files = vec![file("./cover.png", "PNG"), file("cover", "PNG"), file("real.png", "PNG")];
        let url = e.resolve_image("x", &files).unwrap();
        assert_eq!(url, "https://archive.org/download/x/real.png");
    }

    #[test]
    fn test_image_service_is_last_resort() {
        let e = enricher(vec![]);
        let url = e.resolve_image("kaypro-ii", &[file("doc.txt", "Text")]).unwrap();
        assert_eq!(url, "https://archive.org/services/img/kaypro-ii");
    }

    #[test]
    fn test_year_priority_chain() {
        let e = enricher(vec![]);
        let mut h = hit("pet", "Commodore PET (1977) brochure");
        h.date = Some("1979-05-01".to_string());
        let mut meta = record(vec![file("pet.jpg", "JPEG")]);

        // hit date outranks title
        let item = e.build_item("pet", &h, &meta).unwrap();
        assert_eq!(item.year, Some(1979));

        // metadata year outranks everything
        meta.metadata.year = Some("1978".to_string());
        let item = e.build_item("pet", &h, &meta).unwrap();
        assert_eq!(item.year, Some(1978));

        // an unusable metadata year falls through
        meta.metadata.year = Some("unknown".to_string());
        h.date = None;
        let item = e.build_item("pet", &h, &meta).unwrap();
        assert_eq!(item.year, Some(1977));
    }

    #[test]
    fn test_description_cleaned_and_truncated() {
        let e = enricher(vec![]);
        let mut h = hit("c64", "Commodore 64");
        let long: Vec<String> = (0..150).map(|i| format!("w{}", i)).collect();
        h.description = Some(format!("<p>{}</p>", long.join(" &nbsp; ")));

        let item = e.build_item("c64", &h, &record(vec![file("c64.png", "PNG")])).unwrap();
        assert!(item.description.ends_with("w99..."));
        assert_eq!(item.description.trim_end_matches("...").split_whitespace().count(), 100);
        assert!(!item.description.contains('<'));
    }

    #[test]
    fn test_description_fallbacks() {
        let e = enricher(vec![]);
        let mut meta = record(vec![file("a.png", "PNG")]);
        meta.metadata.description = Some("From <i>metadata</i>".to_string());

        let mut h = hit("a", "Apple Lisa");
        h.description = Some("   <br/> ".to_string());
        let item = e.build_item("a", &h, &meta).unwrap();
        assert_eq!(item.description, "From metadata");

        meta.metadata.description = None;
        let item = e.build_item("a", &h, &meta).unwrap();
        assert_eq!(
            item.description,
            "Apple Lisa - A piece of computing history from the Archive.org collection."
        );
    }

    #[test]
    fn test_untitled_hit() {
        let e = enricher(vec![]);
        let h = RawSearchHit {
            identifier: Some("mystery".to_string()),
            ..Default::default()
        };
        let item = e.build_item("mystery", &h, &record(vec![])).unwrap();
        assert_eq!(item.title, UNTITLED_ITEM);
        assert_eq!(item.id, "archive-mystery");
        assert_eq!(item.archive_url, "https://archive.org/details/mystery");
        assert!(item.description.starts_with("Retro computing item - "));
        assert!(item.is_displayable());
    }

    #[tokio::test]
    async fn test_metadata_failure_skips_item() {
        let e = enricher(vec![("ok", record(vec![file("ok.jpg", "JPEG")]))]);
        assert!(e.enrich(&hit("missing", "Gone")).await.is_none());
        assert!(e.enrich(&hit("ok", "Fine")).await.is_some());
        assert!(e.enrich(&RawSearchHit::default()).await.is_none());
    }

    #[tokio::test]
    async fn test_enrich_all_preserves_order_and_isolates_failures() {
        let e = enricher(vec![
            ("a", record(vec![file("a.jpg", "JPEG")])),
            ("c", record(vec![file("c.jpg", "JPEG")])),
            ("d", record(vec![file("d.jpg", "JPEG")])),
        ]);
        let hits = vec![hit("a", "A"), hit("b", "B"), hit("c", "C"), hit("d", "D")];
        let items = e.enrich_all(hits).await;
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["archive-a", "archive-c", "archive-d"]);
    }
}
