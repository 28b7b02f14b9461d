use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

use super::{ParseError, SiteExtractor, SiteProduct};
use crate::fetch::host_matches;

const NEXT_DATA_ID: &str = "__NEXT_DATA__";
const PRODUCT_PATH: &[&str] = &["props", "pageProps", "product"];
const TITLE_FIELDS: &[&str] = &["title", "fullTitle", "name"];
const IMAGE_LISTS: &[&str] = &["images", "imageUrls", "contentImages"];
const IMAGE_KEYS: &[&str] = &["portraitURL", "squarishURL", "imageUrl", "url"];

/// Reads the product record Nike's Next.js pages hydrate from.
#[derive(Debug, Clone, Copy, Default)]
pub struct NikeExtractor;

impl SiteExtractor for NikeExtractor {
    fn name(&self) -> &'static str {
        "nike"
    }

    fn matches(&self, url: &Url) -> bool {
        url.host_str()
            .map(|h| host_matches(&h.to_ascii_lowercase(), "nike.com"))
            .unwrap_or(false)
    }

    fn extract(&self, _url: &Url, doc: &Html) -> Result<SiteProduct, ParseError> {
        let raw = next_data_text(doc).ok_or(ParseError::MissingScript(NEXT_DATA_ID))?;
        let data: Value = serde_json::from_str(&raw)?;

        let mut product = &data;
        for (depth, key) in PRODUCT_PATH.iter().enumerate() {
            product = product
                .get(key)
                .ok_or_else(|| ParseError::MissingKey(PRODUCT_PATH[..=depth].join(".")))?;
        }

        let title = TITLE_FIELDS
            .iter()
            .filter_map(|f| product.get(f).and_then(Value::as_str))
            .map(str::trim)
            .find(|t| !t.is_empty())
            .ok_or(ParseError::EmptyField("title"))?;

        Ok(SiteProduct {
            title: title.to_string(),
            image_url: first_image(product),
        })
    }
}

fn next_data_text(doc: &Html) -> Option<String> {
    let selector = Selector::parse(&format!("script#{NEXT_DATA_ID}")).ok()?;
    let text: String = doc.select(&selector).next()?.text().collect();
    (!text.trim().is_empty()).then_some(text)
}

/// First populated image key of the first entry in the first non-empty image list.
/// Entries may also be bare URL strings.
fn first_image(product: &Value) -> Option<String> {
    let entry = IMAGE_LISTS
        .iter()
        .filter_map(|list| product.get(list).and_then(Value::as_array))
        .find_map(|items| items.first())?;

    if let Some(s) = entry.as_str() {
        return Some(s.trim().to_string()).filter(|s| !s.is_empty());
    }
    IMAGE_KEYS
        .iter()
        .filter_map(|k| entry.get(k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
