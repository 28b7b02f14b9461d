//! Per-retailer extractors that read embedded structured data instead of
//! generic meta tags.
//!
//! Extractors are consulted in registration order; the first one whose
//! [`SiteExtractor::matches`] accepts the URL is the only one tried. A
//! [`ParseError`] never escapes the registry: it is logged and the caller falls
//! back to the generic path.

mod nike;

pub use nike::NikeExtractor;

use scraper::Html;
use thiserror::Error;
use url::Url;

/// What a site extractor recovered. Values are raw; the orchestrator normalises them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProduct {
    pub title: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("embedded data script {0:?} not found")]
    MissingScript(&'static str),
    #[error("embedded data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing key {0}")]
    MissingKey(String),
    #[error("field {0} is empty")]
    EmptyField(&'static str),
}

pub trait SiteExtractor: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn matches(&self, url: &Url) -> bool;

    fn extract(&self, url: &Url, doc: &Html) -> Result<SiteProduct, ParseError>;
}

/// Ordered collection of [`SiteExtractor`]s.
pub struct SiteRegistry {
    extractors: Vec<Box<dyn SiteExtractor>>,
}

impl Default for SiteRegistry {
    /// Registry with every built-in extractor.
    fn default() -> Self {
        Self::empty().register(NikeExtractor)
    }
}

impl SiteRegistry {
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    pub fn register<E: SiteExtractor + 'static>(mut self, extractor: E) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Run the first extractor matching `url`. `None` when nothing matches or
    /// the matching extractor could not parse the page.
    pub fn try_site_specific(&self, url: &Url, doc: &Html) -> Option<SiteProduct> {
        let extractor = self.extractors.iter().find(|e| e.matches(url))?;
        match extractor.extract(url, doc) {
            Ok(product) => {
                tracing::debug!(
                    target: "extract.site",
                    site = extractor.name(),
                    host = url.host_str().unwrap_or_default(),
                    "site.extract.success"
                );
                Some(product)
            }
            Err(e) => {
                tracing::warn!(
                    target: "extract.site",
                    site = extractor.name(),
                    host = url.host_str().unwrap_or_default(),
                    error = %e,
                    "site.extract.failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, Result<&'static str, ()>);

    impl SiteExtractor for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn matches(&self, url: &Url) -> bool {
            url.host_str() == Some(self.0)
        }

        fn extract(&self, _url: &Url, _doc: &Html) -> Result<SiteProduct, ParseError> {
            match self.1 {
                Ok(title) => Ok(SiteProduct {
                    title: title.into(),
                    image_url: None,
                }),
                Err(()) => Err(ParseError::EmptyField("title")),
            }
        }
    }

    fn doc() -> Html {
        Html::parse_document("<html></html>")
    }

    #[test]
    fn default_registers_nike() {
        assert_eq!(SiteRegistry::default().names(), vec!["nike"]);
    }

    #[test]
    fn no_match_is_none() {
        let reg = SiteRegistry::empty().register(Fixed("shop.test", Ok("x")));
        let url = Url::parse("https://other.test/p").unwrap();
        assert_eq!(reg.try_site_specific(&url, &doc()), None);
    }

    #[test]
    fn first_match_wins_and_errors_become_none() {
        let url = Url::parse("https://shop.test/p").unwrap();

        let reg = SiteRegistry::empty()
            .register(Fixed("shop.test", Ok("first")))
            .register(Fixed("shop.test", Ok("second")));
        assert_eq!(reg.try_site_specific(&url, &doc()).unwrap().title, "first");

        // a failing first match does not fall through to later extractors
        let reg = SiteRegistry::empty()
            .register(Fixed("shop.test", Err(())))
            .register(Fixed("shop.test", Ok("second")));
        assert_eq!(reg.try_site_specific(&url, &doc()), None);
    }
}
