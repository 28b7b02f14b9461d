//! Loader for wishlist configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are attached, and `WISHLIST__`-prefixed
//! environment variables are applied last so they always win
//! (`WISHLIST__PROXY__API_KEY=...` sets `proxy.api_key`). String values may
//! reference other environment variables as `${VAR}`; expansion is recursive up
//! to a fixed depth. Every section is optional, so an empty document is a valid
//! configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use wishlist_common::observability::{LogConfig, LogFormat};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

const ENV_PREFIX: &str = "WISHLIST";

/// Keys whose environment override is taken verbatim, never parsed as a number
/// or bool (a key like `007123` must keep its leading zeros).
const VERBATIM_ENV_KEYS: &[&[&str]] = &[&["proxy", "api_key"]];

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WishlistConfig {
    pub store: StoreSettings,
    pub fetch: FetchSettings,
    pub proxy: ProxySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("wishlist.json"),
        }
    }
}

/// Direct (non-proxied) page fetches.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub direct_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            direct_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

/// Third-party rendering proxy.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub endpoint: String,
    #[serde(deserialize_with = "string_or_number")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub render_js: bool,
    /// Route every fetch through the proxy, not just `hosts`.
    pub always: bool,
    /// Host suffixes that are fetched through the proxy when a key is configured.
    pub hosts: Vec<String>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.scraperapi.com/".into(),
            api_key: None,
            timeout_secs: 60,
            render_js: true,
            always: false,
            hosts: vec!["nike.com".into(), "amazon.com".into()],
        }
    }
}

impl ProxySettings {
    /// The API key, if one is actually configured.
    ///
    /// Blank values and placeholders whose variable was never set (still reading
    /// `${...}` after expansion) count as absent.
    ///
    /// ```
    /// use wishlist_config::ProxySettings;
    ///
    /// let mut proxy = ProxySettings::default();
    /// assert_eq!(proxy.api_key(), None);
    /// proxy.api_key = Some("${SCRAPER_API_KEY}".into());
    /// assert_eq!(proxy.api_key(), None);
    /// proxy.api_key = Some("k-123".into());
    /// assert_eq!(proxy.api_key(), Some("k-123"));
    /// ```
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !k.contains("${"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
            dir: None,
            stderr: false,
        }
    }
}

impl LoggingSettings {
    /// Logging initialiser input for the binary named `app_name`.
    ///
    /// ```
    /// use wishlist_config::LoggingSettings;
    ///
    /// let log = LoggingSettings::default().to_log_config("wishlist");
    /// assert_eq!(log.default_filter, "info");
    /// assert!(log.log_dir.is_none());
    /// ```
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.level.clone(),
        }
    }
}

/// Accepts an unquoted numeric YAML value where a string is expected.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string, found {other}"
        ))),
    }
}

/// Re-reads the raw environment value for each of [`VERBATIM_ENV_KEYS`], undoing
/// the type guessing `try_parsing` applied to it.
fn restore_verbatim_env(v: &mut Value) {
    for path in VERBATIM_ENV_KEYS {
        let Some((leaf, parents)) = path.split_last() else {
            continue;
        };
        let name = format!("{ENV_PREFIX}__{}", path.join("__").to_ascii_uppercase());
        let Ok(raw) = std::env::var(&name) else {
            continue;
        };
        if let Some(obj) = object_at(v, parents) {
            obj.insert((*leaf).to_string(), Value::String(raw));
        }
    }
}

fn object_at<'a>(
    v: &'a mut Value,
    path: &[&str],
) -> Option<&'a mut serde_json::Map<String, Value>> {
    let mut node = v;
    for key in path {
        node = node
            .as_object_mut()?
            .entry(*key)
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    node.as_object_mut()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct WishlistConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for WishlistConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WishlistConfigLoader {
    /// Start from built-in defaults; `WISHLIST__` env overrides are applied at [`load`](Self::load).
    ///
    /// ```
    /// use wishlist_config::WishlistConfigLoader;
    ///
    /// let config = WishlistConfigLoader::new()
    ///     .with_yaml_str("store:\n  path: gifts.json")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.store.path.to_str(), Some("gifts.json"));
    /// assert_eq!(config.proxy.timeout_secs, 60);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing, so headless setups can
    /// rely purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use wishlist_config::WishlistConfigLoader;
    ///
    /// let cfg = WishlistConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// proxy:
    ///   always: true
    ///   hosts: ["lego.com"]
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(cfg.proxy.always);
    /// assert_eq!(cfg.proxy.hosts, vec!["lego.com".to_string()]);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use wishlist_config::WishlistConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_SCRAPER_KEY", "injected-from-env"); }
    ///
    /// let config = WishlistConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// proxy:
    ///   api_key: "${DOC_SCRAPER_KEY}"
    ///   timeout_secs: 45
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.proxy.api_key(), Some("injected-from-env"));
    /// assert_eq!(config.proxy.timeout_secs, 45);
    ///
    /// unsafe { std::env::remove_var("DOC_SCRAPER_KEY"); }
    /// ```
    pub fn load(self) -> Result<WishlistConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        restore_verbatim_env(&mut v);
        expand_env_in_value(&mut v);

        let typed: WishlistConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
