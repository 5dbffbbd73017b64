//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files, reading the
//! `WHOIS_*` environment variables, and merging them with proper precedence
//! rules. The resolver itself takes no configuration; these values are for
//! the front ends built on top of it.

use crate::error::WhoisError;
use crate::protocols::dialer::{dialer_from_env, dialer_from_url, Dialer, DirectDialer};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// server = "whois.iana.org"
/// json = false
/// pretty = true
///
/// [proxy]
/// url = "socks5://127.0.0.1:1080"
/// no_proxy = ["localhost", ".internal"]
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Outbound SOCKS5 proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Server to query instead of the built-in table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// Print the parsed record as JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    /// Print a colored summary of the parsed record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProxyConfig {
    /// `socks5://[user:pass@]host[:port]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Hosts dialed directly (exact, `.suffix` or `*`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_proxy: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `warn` or `whois_lib=debug`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Default)]
pub struct ConfigManager;

impl ConfigManager {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// `FileError` if the file is missing or unreadable, `ConfigError` if it
    /// isn't valid TOML or fails validation.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, WhoisError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(WhoisError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            WhoisError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load an explicit file when given, otherwise discover.
    pub fn load(&self, explicit: Option<&Path>) -> Result<FileConfig, WhoisError> {
        match explicit {
            Some(path) => self.load_file(path),
            None => self.discover_and_load(),
        }
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// Lowest to highest: `$XDG_CONFIG_HOME/whois/config.toml`,
    /// `~/.whois.toml`, `./whois.toml`. A file that fails to load is logged
    /// and skipped.
    pub fn discover_and_load(&self) -> Result<FileConfig, WhoisError> {
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        let mut merged_config = FileConfig::default();
        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => merged_config = self.merge_configs(merged_config, config),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        Ok(merged_config)
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./whois.toml", "./.whois.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".whois.toml", "whois.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("whois").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations; values from `higher` win field by field.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower), Some(higher)) => Some(DefaultsConfig {
                    server: higher.server.or(lower.server),
                    json: higher.json.or(lower.json),
                    pretty: higher.pretty.or(lower.pretty),
                }),
                (lower, higher) => higher.or(lower),
            },
            proxy: match (lower.proxy, higher.proxy) {
                (Some(lower), Some(higher)) => Some(ProxyConfig {
                    url: higher.url.or(lower.url),
                    no_proxy: higher.no_proxy.or(lower.no_proxy),
                }),
                (lower, higher) => higher.or(lower),
            },
            logging: match (lower.logging, higher.logging) {
                (Some(lower), Some(higher)) => Some(LoggingConfig {
                    level: higher.level.or(lower.level),
                }),
                (lower, higher) => higher.or(lower),
            },
        }
    }

    fn validate_config(&self, config: &FileConfig) -> Result<(), WhoisError> {
        if let Some(server) = config.defaults.as_ref().and_then(|d| d.server.as_ref()) {
            if server.trim().is_empty() {
                return Err(WhoisError::config("defaults.server cannot be empty"));
            }
        }

        if let Some(proxy) = &config.proxy {
            if let Some(url) = &proxy.url {
                dialer_from_url(url, &[])?;
            }
        }

        if let Some(level) = config.logging.as_ref().and_then(|l| l.level.as_ref()) {
            if level.trim().is_empty() {
                return Err(WhoisError::config("logging.level cannot be empty"));
            }
        }

        Ok(())
    }
}

impl ProxyConfig {
    /// Build the dialer this section describes; direct when no URL is set.
    pub fn dialer(&self) -> Result<Arc<dyn Dialer>, WhoisError> {
        match &self.url {
            Some(url) => dialer_from_url(url, self.no_proxy.as_deref().unwrap_or(&[])),
            None => Ok(Arc::new(DirectDialer)),
        }
    }
}

/// Choose the dialer: `ALL_PROXY` wins over the file's `[proxy]` section.
pub fn resolve_dialer(file: Option<&ProxyConfig>) -> Result<Arc<dyn Dialer>, WhoisError> {
    let env_proxy = ["ALL_PROXY", "all_proxy"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .any(|value| !value.trim().is_empty());

    match file {
        Some(proxy) if !env_proxy => proxy.dialer(),
        _ => Ok(dialer_from_env()),
    }
}

/// Environment variable configuration that mirrors CLI options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub server: Option<String>,
    pub json: Option<bool>,
    pub pretty: Option<bool>,
    pub log: Option<String>,
    pub config: Option<String>,
}

/// Load configuration from the `WHOIS_*` environment variables.
///
/// Invalid values are logged and ignored.
pub fn load_env_config() -> EnvConfig {
    EnvConfig {
        server: env_string("WHOIS_SERVER"),
        json: env_bool("WHOIS_JSON"),
        pretty: env_bool("WHOIS_PRETTY"),
        log: env_string("WHOIS_LOG"),
        config: env_string("WHOIS_CONFIG"),
    }
}

fn env_string(name: &str) -> Option<String> {
    let value = env::var(name).ok()?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    debug!("Using {}={}", name, value);
    Some(value.to_string())
}

fn env_bool(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?;
    let parsed = parse_bool(&value);
    if parsed.is_none() {
        warn!("Invalid {}='{}', use true/false", name, value);
    }
    parsed
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" on "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
server = "whois.iana.org"
pretty = true

[proxy]
url = "socks5://127.0.0.1:9050"
no_proxy = ["localhost"]

[logging]
level = "debug"
"#,
        );

        let config = ConfigManager::new().load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.server.as_deref(), Some("whois.iana.org"));
        assert_eq!(defaults.pretty, Some(true));
        assert_eq!(defaults.json, None);

        let proxy = config.proxy.unwrap();
        assert_eq!(proxy.no_proxy, Some(vec!["localhost".to_string()]));
        assert!(proxy.dialer().is_ok());

        assert_eq!(config.logging.unwrap().level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let manager = ConfigManager::new();

        let empty_server = write_config("[defaults]\nserver = \"  \"\n");
        assert!(matches!(
            manager.load_file(empty_server.path()),
            Err(WhoisError::ConfigError { .. })
        ));

        let http_proxy = write_config("[proxy]\nurl = \"http://proxy:3128\"\n");
        assert!(manager.load_file(http_proxy.path()).is_err());

        let bad_toml = write_config("[defaults\nserver = 1\n");
        assert!(matches!(
            manager.load_file(bad_toml.path()),
            Err(WhoisError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigManager::new()
            .load_file("/nonexistent/whois.toml")
            .unwrap_err();
        assert!(matches!(err, WhoisError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new();

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                server: Some("whois.iana.org".to_string()),
                json: Some(true),
                pretty: Some(false),
            }),
            logging: Some(LoggingConfig {
                level: Some("info".to_string()),
            }),
            ..Default::default()
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                pretty: Some(true),
                ..Default::default()
            }),
            proxy: Some(ProxyConfig {
                url: Some("socks5://127.0.0.1:1080".to_string()),
                no_proxy: None,
            }),
            ..Default::default()
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.server.as_deref(), Some("whois.iana.org")); // Lower preserved
        assert_eq!(defaults.json, Some(true));
        assert_eq!(defaults.pretty, Some(true)); // Higher wins
        assert!(merged.proxy.is_some());
        assert_eq!(merged.logging.unwrap().level.as_deref(), Some("info"));
    }

    #[test]
    fn test_proxy_without_url_is_direct() {
        let dialer = ProxyConfig::default().dialer().unwrap();
        assert!(format!("{:?}", dialer).contains("DirectDialer"));
    }
}
