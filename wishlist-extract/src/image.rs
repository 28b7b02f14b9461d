//! Representative-image lookup over a parsed product page.

use scraper::{Html, Selector};
use url::Url;

/// Meta tags consulted in priority order.
const META_IMAGE_SELECTORS: &[&str] = &[
    r#"meta[property="og:image"], meta[name="og:image"]"#,
    r#"meta[name="twitter:image"], meta[property="twitter:image"]"#,
];

/// Retailer element-naming conventions, tried only when the main chain finds nothing.
/// Each entry lists the attributes to read, best first.
const FALLBACK_IMAGE_SELECTORS: &[(&str, &[&str])] = &[
    ("#landingImage", &["data-old-hires", "src"]),
    ("#imgTagWrapperId img", &["data-old-hires", "src"]),
    ("img.product-image", &["src", "data-src"]),
    (".product-image img", &["src", "data-src"]),
    (r#"[data-testid="product-image"] img"#, &["src", "data-src"]),
];

/// Resolve an image via `og:image`, then `twitter:image`, then the first `<img>`
/// with an absolute or scheme-relative `src`. Empty when nothing usable is found.
pub fn resolve_image(doc: &Html, page_url: Option<&Url>) -> String {
    for css in META_IMAGE_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        let found = doc
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(|c| normalize_image_url(c, page_url))
            .find(|u| !u.is_empty());
        if let Some(url) = found {
            return url;
        }
    }

    if let Ok(selector) = Selector::parse("img[src]") {
        let first = doc
            .select(&selector)
            .filter_map(|el| el.value().attr("src"))
            .map(str::trim)
            .filter(|src| src.starts_with("http") || src.starts_with("//"))
            .map(|src| normalize_image_url(src, page_url))
            .find(|u| !u.is_empty());
        if let Some(url) = first {
            return url;
        }
    }

    String::new()
}

/// [`resolve_image`], falling back to known product-image element conventions.
pub fn resolve_image_with_fallback(doc: &Html, page_url: Option<&Url>) -> String {
    let primary = resolve_image(doc, page_url);
    if !primary.is_empty() {
        return primary;
    }

    for (css, attrs) in FALLBACK_IMAGE_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        for el in doc.select(&selector) {
            let found = attrs
                .iter()
                .filter_map(|a| el.value().attr(a))
                .map(|c| normalize_image_url(c, page_url))
                .find(|u| !u.is_empty());
            if let Some(url) = found {
                tracing::debug!(target: "extract.image", selector = css, "image.fallback_selector");
                return url;
            }
        }
    }

    String::new()
}

/// Turn an image reference into an absolute `http(s)` URL, or empty if that is
/// not possible.
///
/// - `//host/p` becomes `https://host/p`
/// - `/p` becomes `https://<page host>/p`; without a page host it is unusable
/// - absolute `http(s)` URLs are re-serialised in canonical form
/// - other relative references resolve against the page URL; `data:` and other
///   schemes are dropped
pub fn normalize_image_url(candidate: &str, page_url: Option<&Url>) -> String {
    let c = candidate.trim();
    if c.is_empty() {
        return String::new();
    }

    let resolved = if let Some(rest) = c.strip_prefix("//") {
        Url::parse(&format!("https://{rest}")).ok()
    } else if c.starts_with('/') {
        page_url
            .and_then(page_authority)
            .and_then(|authority| Url::parse(&format!("https://{authority}{c}")).ok())
    } else if c.starts_with("http") {
        Url::parse(c).ok()
    } else {
        page_url.and_then(|base| base.join(c).ok())
    };

    match resolved {
        Some(u) if matches!(u.scheme(), "http" | "https") && u.has_host() => u.to_string(),
        _ => String::new(),
    }
}

fn page_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
