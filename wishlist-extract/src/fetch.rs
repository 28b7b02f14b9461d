//! Page retrieval, either directly with a browser-like header set or through a
//! third-party rendering proxy that executes JavaScript server-side.
//!
//! Every fetch is a single attempt bounded by a timeout. A response body that
//! looks like an anti-bot block page is reported as [`FetchError::Blocked`]
//! regardless of its status code.

use std::borrow::Cow;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, UPGRADE_INSECURE_REQUESTS,
    USER_AGENT,
};
use thiserror::Error;
use url::Url;
use wishlist_config::WishlistConfig;
use wishlist_http::{Auth, HttpClient, HttpError, RequestOpts};

/// Phrases that only show up on pages served to deny automated access.
pub const BLOCK_MARKERS: &[&str] = &[
    "Access Denied",
    "Request blocked",
    "Robot Check",
    "Pardon Our Interruption",
    "Enter the characters you see below",
];

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Raw HTML as returned by the target (or the proxy).
#[derive(Debug, Clone)]
pub struct RawPage {
    pub html: String,
    pub status: u16,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("blocked by target site (matched {marker:?})")]
    Blocked { marker: &'static str },
}

impl From<HttpError> for FetchError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Url(msg) => FetchError::InvalidUrl(msg),
            HttpError::Timeout(after) => FetchError::Timeout(after),
            HttpError::Network(msg) | HttpError::Build(msg) => FetchError::Network(msg),
        }
    }
}

/// Return the first block-page marker found in `body`, if any.
pub fn detect_block_page(body: &str) -> Option<&'static str> {
    BLOCK_MARKERS.iter().copied().find(|m| body.contains(m))
}

/// Source of page HTML for the extraction pipeline.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawPage, FetchError>;
}

/// Which path a given URL takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRoute {
    Direct,
    Proxy,
}

#[derive(Debug, Clone)]
pub struct ProxyOptions {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
    pub render_js: bool,
    pub always: bool,
    pub hosts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FetcherOptions {
    pub direct_timeout: Duration,
    pub user_agent: String,
    /// `None` disables the proxy path entirely.
    pub proxy: Option<ProxyOptions>,
}

impl FetcherOptions {
    /// Map loaded configuration onto fetcher options. The proxy is only enabled
    /// when an API key is actually configured.
    pub fn from_config(cfg: &WishlistConfig) -> Self {
        let proxy = cfg.proxy.api_key().map(|key| ProxyOptions {
            endpoint: cfg.proxy.endpoint.clone(),
            api_key: key.to_string(),
            timeout: Duration::from_secs(cfg.proxy.timeout_secs),
            render_js: cfg.proxy.render_js,
            always: cfg.proxy.always,
            hosts: cfg.proxy.hosts.clone(),
        });
        Self {
            direct_timeout: Duration::from_secs(cfg.fetch.direct_timeout_secs),
            user_agent: cfg.fetch.user_agent.clone(),
            proxy,
        }
    }
}

/// [`PageFetcher`] backed by the workspace HTTP client.
#[derive(Clone)]
pub struct HttpFetcher {
    http: HttpClient,
    headers: HeaderMap,
    opts: FetcherOptions,
}

impl HttpFetcher {
    pub fn new(opts: FetcherOptions) -> Result<Self, HttpError> {
        let http = HttpClient::new()?.with_timeout(opts.direct_timeout);
        let headers = browser_headers(&opts.user_agent)?;
        Ok(Self {
            http,
            headers,
            opts,
        })
    }

    pub fn from_config(cfg: &WishlistConfig) -> Result<Self, HttpError> {
        Self::new(FetcherOptions::from_config(cfg))
    }

    /// Proxy when configured and either forced or the host is on the proxy list.
    pub fn route_for(&self, url: &str) -> FetchRoute {
        let Some(proxy) = &self.opts.proxy else {
            return FetchRoute::Direct;
        };
        if proxy.always {
            return FetchRoute::Proxy;
        }
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase));
        match host {
            Some(host) if proxy.hosts.iter().any(|h| host_matches(&host, h)) => FetchRoute::Proxy,
            _ => FetchRoute::Direct,
        }
    }

    async fn fetch_direct(&self, url: &str) -> Result<wishlist_http::TextResponse, HttpError> {
        self.http
            .get_text(
                url,
                RequestOpts {
                    timeout: Some(self.opts.direct_timeout),
                    headers: Some(self.headers.clone()),
                    ..Default::default()
                },
            )
            .await
    }

    async fn fetch_proxied(
        &self,
        proxy: &ProxyOptions,
        url: &str,
    ) -> Result<wishlist_http::TextResponse, HttpError> {
        let mut query: Vec<(&str, Cow<'_, str>)> = vec![("url", Cow::Borrowed(url))];
        if proxy.render_js {
            query.push(("render", Cow::Borrowed("true")));
        }
        query.push(("keep_headers", Cow::Borrowed("true")));

        self.http
            .get_text(
                &proxy.endpoint,
                RequestOpts {
                    timeout: Some(proxy.timeout),
                    headers: Some(self.headers.clone()),
                    query: Some(query),
                    auth: Some(Auth::Query {
                        name: "api_key",
                        value: Cow::Borrowed(proxy.api_key.as_str()),
                    }),
                },
            )
            .await
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RawPage, FetchError> {
        let route = self.route_for(url);
        let started = Instant::now();
        tracing::debug!(target: "extract.fetch", ?route, %url, "fetch.start");

        let resp = match (&self.opts.proxy, route) {
            (Some(proxy), FetchRoute::Proxy) => self.fetch_proxied(proxy, url).await,
            _ => self.fetch_direct(url).await,
        }
        .map_err(FetchError::from)?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if let Some(marker) = detect_block_page(&resp.body) {
            tracing::warn!(
                target: "extract.fetch",
                ?route,
                %url,
                status = resp.status,
                marker,
                elapsed_ms,
                "fetch.blocked"
            );
            return Err(FetchError::Blocked { marker });
        }
        if !resp.is_success() {
            return Err(FetchError::Status(resp.status));
        }

        tracing::debug!(
            target: "extract.fetch",
            ?route,
            %url,
            status = resp.status,
            bytes = resp.body.len(),
            elapsed_ms,
            "fetch.success"
        );
        Ok(RawPage {
            html: resp.body,
            status: resp.status,
        })
    }
}

pub(crate) fn host_matches(host: &str, suffix: &str) -> bool {
    let suffix = suffix.trim().trim_start_matches('.').to_ascii_lowercase();
    !suffix.is_empty() && (host == suffix || host.ends_with(&format!(".{suffix}")))
}

/// Header set sent on direct fetches and passed through by the proxy.
/// Accept-Encoding is negotiated by reqwest itself (gzip/brotli features).
fn browser_headers(user_agent: &str) -> Result<HeaderMap, HttpError> {
    let mut h = HeaderMap::new();
    h.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent).map_err(|e| HttpError::Build(e.to_string()))?,
    );
    h.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    h.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    h.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    for (name, value) in [
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("sec-fetch-user", "?1"),
    ] {
        h.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(proxy: Option<ProxyOptions>) -> HttpFetcher {
        HttpFetcher::new(FetcherOptions {
            direct_timeout: Duration::from_secs(1),
            user_agent: "test-agent".into(),
            proxy,
        })
        .unwrap()
    }

    fn proxy(always: bool) -> ProxyOptions {
        ProxyOptions {
            endpoint: "https://proxy.test/".into(),
            api_key: "k".into(),
            timeout: Duration::from_secs(5),
            render_js: true,
            always,
            hosts: vec!["nike.com".into(), "amazon.com".into()],
        }
    }

    #[test]
    fn detects_block_markers() {
        assert_eq!(
            detect_block_page("<h1>Access Denied</h1> Reference #18"),
            Some("Access Denied")
        );
        assert_eq!(detect_block_page("<title>Amazon.com: Robot Check</title>"), Some("Robot Check"));
        assert_eq!(detect_block_page("<title>Cozy Hoodie</title>"), None);
    }

    #[test]
    fn routes_direct_without_proxy() {
        let f = fetcher(None);
        assert_eq!(f.route_for("https://www.nike.com/t/air-max"), FetchRoute::Direct);
    }

    #[test]
    fn routes_listed_hosts_through_proxy() {
        let f = fetcher(Some(proxy(false)));
        assert_eq!(f.route_for("https://www.nike.com/t/air-max"), FetchRoute::Proxy);
        assert_eq!(f.route_for("https://amazon.com/dp/x"), FetchRoute::Proxy);
        assert_eq!(f.route_for("https://notnike.com/t/x"), FetchRoute::Direct);
        assert_eq!(f.route_for("https://example.com/"), FetchRoute::Direct);
        assert_eq!(f.route_for("not a url"), FetchRoute::Direct);
    }

    #[test]
    fn always_forces_proxy() {
        let f = fetcher(Some(proxy(true)));
        assert_eq!(f.route_for("https://example.com/"), FetchRoute::Proxy);
    }

    #[test]
    fn browser_headers_include_sec_fetch_set() {
        let h = browser_headers("ua/1.0").unwrap();
        assert_eq!(h.get(USER_AGENT).unwrap(), "ua/1.0");
        assert_eq!(h.get("sec-fetch-mode").unwrap(), "navigate");
        assert!(h.get(ACCEPT).unwrap().to_str().unwrap().starts_with("text/html"));
    }

    #[test]
    fn invalid_user_agent_is_rejected() {
        assert!(browser_headers("bad\nagent").is_err());
    }

    #[test]
    fn options_enable_proxy_only_with_key() {
        let mut cfg = WishlistConfig::default();
        assert!(FetcherOptions::from_config(&cfg).proxy.is_none());
        cfg.proxy.api_key = Some("abc".into());
        let opts = FetcherOptions::from_config(&cfg);
        let proxy = opts.proxy.unwrap();
        assert_eq!(proxy.api_key, "abc");
        assert_eq!(proxy.timeout, Duration::from_secs(60));
        assert_eq!(opts.direct_timeout, Duration::from_secs(10));
    }
}
