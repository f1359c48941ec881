//! Tool settings: defaults, global config file, environment and CLI layering
//!
//! Later layers win: defaults < `~/.lockview/config.toml` < `LOCKVIEW_*`
//! environment variables < command line flags.

use std::collections::HashMap;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use lockview_core::error::LockviewError;
use lockview_registry::{FileCache, DEFAULT_TTL};
use crate::ConfigResult;

pub use lockview_registry::{DEFAULT_CONCURRENCY, DEFAULT_REGISTRY};

/// Default cache TTL in seconds (12 hours)
pub const DEFAULT_CACHE_TTL_SECS: u64 = DEFAULT_TTL.as_secs();

/// Cache file name inside the data directory
pub const CACHE_FILE_NAME: &str = FileCache::FILE_NAME;

/// Prefix of the environment variables that override settings
pub const ENV_PREFIX: &str = "LOCKVIEW_";

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Registry base URL
    pub registry_url: String,
    /// Bearer token sent to the registry
    pub registry_token: Option<String>,
    /// Freshness window of cached metadata
    pub cache_ttl_secs: u64,
    /// Ceiling on in-flight registry requests
    pub concurrency: usize,
    /// Location of the registry cache file
    pub cache_file: Utf8PathBuf,
}

/// One partial settings layer (config file or CLI flags)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SettingsLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_file: Option<Utf8PathBuf>,
}

impl Settings {
    /// Cache TTL as a duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Apply a layer on top of these settings
    fn apply(&mut self, layer: SettingsLayer) {
        if let Some(registry) = layer.registry {
            self.registry_url = registry;
        }
        if let Some(token) = layer.token {
            self.registry_token = Some(token);
        }
        if let Some(ttl) = layer.cache_ttl_secs {
            self.cache_ttl_secs = ttl;
        }
        if let Some(concurrency) = layer.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(cache_file) = layer.cache_file {
            self.cache_file = cache_file;
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY.to_string(),
            registry_token: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            concurrency: DEFAULT_CONCURRENCY,
            cache_file: default_cache_file(),
        }
    }
}

/// `<data dir>/lockview/registry-cache.json`, or under `~/.lockview` when the
/// platform has no data directory
pub fn default_cache_file() -> Utf8PathBuf {
    let data_dir = dirs::data_dir()
        .and_then(|dir| Utf8PathBuf::try_from(dir).ok())
        .map(|dir| dir.join("lockview"));

    data_dir
        .or_else(|| home_dir().map(|home| home.join(".lockview")))
        .unwrap_or_else(|| Utf8PathBuf::from(".lockview"))
        .join(CACHE_FILE_NAME)
}

/// `~/.lockview/config.toml`
pub fn global_config_path() -> Option<Utf8PathBuf> {
    home_dir().map(|home| home.join(".lockview").join("config.toml"))
}

fn home_dir() -> Option<Utf8PathBuf> {
    dirs::home_dir().and_then(|dir| Utf8PathBuf::try_from(dir).ok())
}

/// Parse a settings TOML document
pub fn parse_settings_toml(content: &str) -> ConfigResult<SettingsLayer> {
    toml::from_str(content).map_err(|e| LockviewError::TomlParse {
        message: format!("TOML parsing error: {}", e),
    })
}

/// Load and parse a settings file
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<SettingsLayer> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LockviewError::io(format!("Failed to read {}", path), e))?;

    parse_settings_toml(&content).map_err(|e| match e {
        LockviewError::TomlParse { message } => LockviewError::TomlParse {
            message: format!("In file {}: {}", path, message),
        },
        other => other,
    })
}

/// Reject settings no component can work with
pub fn validate_settings(settings: &Settings) -> ConfigResult<()> {
    let url = Url::parse(&settings.registry_url).map_err(|e| LockviewError::ConfigValidation {
        field: "registry".to_string(),
        reason: format!("'{}' is not a valid URL: {}", settings.registry_url, e),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(LockviewError::ConfigValidation {
            field: "registry".to_string(),
            reason: format!("unsupported scheme '{}', expected http or https", url.scheme()),
        });
    }

    if settings.cache_ttl_secs == 0 {
        return Err(LockviewError::ConfigValidation {
            field: "cache-ttl-secs".to_string(),
            reason: "TTL must be greater than zero".to_string(),
        });
    }

    Ok(())
}

/// Settings loading and layering
pub struct SettingsLoader {
    /// Global config file, if one can be located
    global_path: Option<Utf8PathBuf>,
}

impl SettingsLoader {
    /// Loader reading `~/.lockview/config.toml`
    pub fn new() -> Self {
        Self {
            global_path: global_config_path(),
        }
    }

    /// Loader reading the given global config file instead
    pub fn with_global_path(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            global_path: Some(path.into()),
        }
    }

    /// Load the global config file; a missing file is no layer
    pub async fn load_global(&self) -> ConfigResult<Option<SettingsLayer>> {
        let Some(path) = &self.global_path else {
            return Ok(None);
        };

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(None);
        }

        let layer = load_from_file(path).await?;
        debug!("Loaded global settings from {}", path);
        Ok(Some(layer))
    }

    /// Resolve settings from every layer
    pub async fn load(&self, env_overrides: &HashMap<String, String>, cli: SettingsLayer) -> ConfigResult<Settings> {
        let global = self.load_global().await?;
        merge_settings(global, env_overrides, cli)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge the layers over the defaults and validate the result
pub fn merge_settings(
    global: Option<SettingsLayer>,
    env_overrides: &HashMap<String, String>,
    cli: SettingsLayer,
) -> ConfigResult<Settings> {
    let mut settings = Settings::default();

    if let Some(global) = global {
        settings.apply(global);
    }
    settings.apply(env_layer(env_overrides)?);
    settings.apply(cli);

    validate_settings(&settings)?;
    Ok(settings)
}

/// Collect `LOCKVIEW_*` environment variables
pub fn collect_env_overrides() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect()
}

/// Turn environment overrides into a layer
fn env_layer(overrides: &HashMap<String, String>) -> ConfigResult<SettingsLayer> {
    let mut layer = SettingsLayer::default();

    for (key, value) in overrides {
        match key.as_str() {
            "LOCKVIEW_REGISTRY" => layer.registry = Some(value.clone()),
            "LOCKVIEW_REGISTRY_TOKEN" => layer.token = Some(value.clone()),
            "LOCKVIEW_CACHE_TTL_SECS" => layer.cache_ttl_secs = Some(parse_env_number(key, value)?),
            "LOCKVIEW_CONCURRENCY" => layer.concurrency = Some(parse_env_number(key, value)?),
            "LOCKVIEW_CACHE_FILE" => layer.cache_file = Some(Utf8PathBuf::from(value)),
            _ => {
                // Unknown environment variable, ignore
            },
        }
    }

    Ok(layer)
}

fn parse_env_number<T>(key: &str, value: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| LockviewError::ConfigValidation {
        field: key.to_string(),
        reason: format!("'{}' is not a number: {}", value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = merge_settings(None, &HashMap::new(), SettingsLayer::default()).unwrap();

        assert_eq!(settings.registry_url, DEFAULT_REGISTRY);
        assert_eq!(settings.cache_ttl(), Duration::from_secs(43_200));
        assert_eq!(settings.concurrency, 10);
        assert!(settings.cache_file.ends_with("lockview/registry-cache.json")
            || settings.cache_file.ends_with(".lockview/registry-cache.json"));
        assert!(settings.registry_token.is_none());
    }

    #[test]
    fn test_defaults_match_registry_engine() {
        let settings = Settings::default();

        assert_eq!(settings.registry_url, lockview_registry::DEFAULT_REGISTRY);
        assert_eq!(settings.concurrency, lockview_registry::DEFAULT_CONCURRENCY);
        assert_eq!(settings.cache_ttl(), lockview_registry::DEFAULT_TTL);
        assert_eq!(settings.cache_file.file_name(), Some(FileCache::FILE_NAME));
    }

    #[test]
    fn test_parse_settings_toml() {
        let layer = parse_settings_toml(
            r#"
registry = "https://npm.example.com/"
cache-ttl-secs = 600
concurrency = 4
cache-file = "/var/cache/lockview.json"
"#,
        )
        .unwrap();

        assert_eq!(layer.registry.as_deref(), Some("https://npm.example.com/"));
        assert_eq!(layer.cache_ttl_secs, Some(600));
        assert_eq!(layer.concurrency, Some(4));
        assert_eq!(layer.cache_file, Some(Utf8PathBuf::from("/var/cache/lockview.json")));
        assert!(layer.token.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse_settings_toml("registy = \"https://typo.example\"").unwrap_err();
        assert!(matches!(err, LockviewError::TomlParse { .. }));
    }

    #[test]
    fn test_layer_precedence() {
        let global = SettingsLayer {
            registry: Some("https://global.example".to_string()),
            cache_ttl_secs: Some(60),
            concurrency: Some(2),
            ..Default::default()
        };
        let env = env(&[
            ("LOCKVIEW_CONCURRENCY", "6"),
            ("LOCKVIEW_REGISTRY", "https://env.example"),
            ("LOCKVIEW_UNRELATED", "ignored"),
        ]);
        let cli = SettingsLayer {
            registry: Some("https://cli.example".to_string()),
            ..Default::default()
        };

        let settings = merge_settings(Some(global), &env, cli).unwrap();

        assert_eq!(settings.registry_url, "https://cli.example");
        assert_eq!(settings.concurrency, 6);
        assert_eq!(settings.cache_ttl_secs, 60);
    }

    #[test]
    fn test_env_token_and_cache_file() {
        let env = env(&[
            ("LOCKVIEW_REGISTRY_TOKEN", "npm_secret"),
            ("LOCKVIEW_CACHE_FILE", "/tmp/lv.json"),
        ]);

        let settings = merge_settings(None, &env, SettingsLayer::default()).unwrap();

        assert_eq!(settings.registry_token.as_deref(), Some("npm_secret"));
        assert_eq!(settings.cache_file, Utf8PathBuf::from("/tmp/lv.json"));
    }

    #[test]
    fn test_invalid_env_number() {
        let env = env(&[("LOCKVIEW_CACHE_TTL_SECS", "soon")]);

        let err = merge_settings(None, &env, SettingsLayer::default()).unwrap_err();
        assert!(matches!(
            err,
            LockviewError::ConfigValidation { ref field, .. } if field == "LOCKVIEW_CACHE_TTL_SECS"
        ));
    }

    #[test]
    fn test_validation() {
        let bad_url = SettingsLayer {
            registry: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(merge_settings(None, &HashMap::new(), bad_url).is_err());

        let bad_scheme = SettingsLayer {
            registry: Some("ftp://registry.example".to_string()),
            ..Default::default()
        };
        assert!(merge_settings(None, &HashMap::new(), bad_scheme).is_err());

        let zero_ttl = SettingsLayer {
            cache_ttl_secs: Some(0),
            ..Default::default()
        };
        let err = merge_settings(None, &HashMap::new(), zero_ttl).unwrap_err();
        assert!(err.to_string().contains("cache-ttl-secs"));
    }

    #[tokio::test]
    async fn test_loader_reads_global_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("config.toml")).unwrap();
        tokio::fs::write(&path, "concurrency = 3\n").await.unwrap();

        let loader = SettingsLoader::with_global_path(&path);
        let settings = loader.load(&HashMap::new(), SettingsLayer::default()).await.unwrap();

        assert_eq!(settings.concurrency, 3);
    }

    #[tokio::test]
    async fn test_loader_without_global_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("missing.toml")).unwrap();

        let loader = SettingsLoader::with_global_path(path);
        assert!(loader.load_global().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_loader_reports_broken_global_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("config.toml")).unwrap();
        tokio::fs::write(&path, "concurrency = [").await.unwrap();

        let err = SettingsLoader::with_global_path(&path).load_global().await.unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
