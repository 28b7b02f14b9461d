use std::sync::Arc;

use scraper::{Html, Selector};
use url::Url;
use wishlist_common::{ACCESS_DENIED_TITLE, ItemMetadata, UNKNOWN_TITLE};

use crate::category::classify;
use crate::fetch::{FetchError, PageFetcher, detect_block_page};
use crate::image::{normalize_image_url, resolve_image_with_fallback};
use crate::sites::SiteRegistry;
use crate::title::normalize_title;

/// Turns a product URL into [`ItemMetadata`]. Never fails: fetch problems
/// degrade to a sentinel title with no image.
///
/// Cheap to share behind an `Arc`; calls are independent of each other.
pub struct Extractor {
    fetcher: Arc<dyn PageFetcher>,
    sites: SiteRegistry,
}

impl Extractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_sites(fetcher, SiteRegistry::default())
    }

    pub fn with_sites(fetcher: Arc<dyn PageFetcher>, sites: SiteRegistry) -> Self {
        Self { fetcher, sites }
    }

    pub async fn extract(&self, url: &str) -> ItemMetadata {
        match self.fetcher.fetch(url).await {
            Ok(page) => {
                // fetchers other than HttpFetcher may not screen for block pages
                if let Some(marker) = detect_block_page(&page.html) {
                    tracing::warn!(target: "extract", %url, marker, "extract.blocked");
                    return degraded(url, ACCESS_DENIED_TITLE);
                }
                self.extract_from_html(url, &page.html)
            }
            Err(FetchError::Blocked { marker }) => {
                tracing::warn!(target: "extract", %url, marker, "extract.blocked");
                degraded(url, ACCESS_DENIED_TITLE)
            }
            Err(e) => {
                tracing::warn!(target: "extract", %url, error = %e, "extract.fetch.failed");
                degraded(url, UNKNOWN_TITLE)
            }
        }
    }

    /// Parse an already-fetched page. Site extractors get the first attempt,
    /// then the generic `<title>` and image chain.
    pub fn extract_from_html(&self, url: &str, html: &str) -> ItemMetadata {
        let doc = Html::parse_document(html);
        let page_url = Url::parse(url).ok();

        if let Some(page_url) = &page_url {
            if let Some(product) = self.sites.try_site_specific(page_url, &doc) {
                let title = normalize_title(Some(&product.title));
                let image_url = product
                    .image_url
                    .as_deref()
                    .map(|img| normalize_image_url(img, Some(page_url)))
                    .unwrap_or_default();
                let category = classify(url, &title);
                return ItemMetadata {
                    title,
                    image_url,
                    category,
                };
            }
        }

        let title = normalize_title(document_title(&doc).as_deref());
        let image_url = resolve_image_with_fallback(&doc, page_url.as_ref());
        let category = classify(url, &title);
        tracing::debug!(target: "extract", %url, %category, has_image = !image_url.is_empty(), "extract.generic");
        ItemMetadata {
            title,
            image_url,
            category,
        }
    }
}

fn document_title(doc: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    doc.select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
}

fn degraded(url: &str, title: &str) -> ItemMetadata {
    ItemMetadata {
        title: title.to_string(),
        image_url: String::new(),
        category: classify(url, title),
    }
}
