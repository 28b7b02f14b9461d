//! Product-page metadata extraction.
//!
//! - Page retrieval, direct or through a rendering proxy (`fetch`)
//! - Title cleanup (`title`)
//! - Keyword category rules (`category`)
//! - Representative image lookup (`image`)
//! - Retailer-specific structured-data readers (`sites`)
//! - The never-failing pipeline tying them together (`extractor`)
//!
//! ```no_run
//! use std::sync::Arc;
//! use wishlist_config::WishlistConfig;
//! use wishlist_extract::{Extractor, HttpFetcher};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = HttpFetcher::from_config(&WishlistConfig::default())?;
//! let extractor = Extractor::new(Arc::new(fetcher));
//! let meta = extractor.extract("https://www.nike.com/t/air-max-90").await;
//! println!("{} [{}]", meta.title, meta.category);
//! # Ok(())
//! # }
//! ```

pub mod category;
pub mod extractor;
pub mod fetch;
pub mod image;
pub mod sites;
pub mod title;

pub use category::classify;
pub use extractor::Extractor;
pub use fetch::{
    FetchError, FetchRoute, FetcherOptions, HttpFetcher, PageFetcher, ProxyOptions, RawPage,
    detect_block_page,
};
pub use image::{normalize_image_url, resolve_image, resolve_image_with_fallback};
pub use sites::{NikeExtractor, ParseError, SiteExtractor, SiteProduct, SiteRegistry};
pub use title::normalize_title;
