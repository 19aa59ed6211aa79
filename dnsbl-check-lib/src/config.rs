//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `DBC_*`
//! environment variables, merging files with proper precedence rules, and
//! writing a configuration back to disk.

use crate::error::DnsblCheckError;
use crate::protocols::registry::is_valid_zone;
use crate::types::{CheckConfig, OutputFormat, MAX_CONCURRENCY};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// concurrency = 50
/// timeout = "3s"
/// output_format = "text"
///
/// [blacklists]
/// zones = ["bl.spamcop.net", "dnsbl.dronebl.org"]
/// custom = ["dnsbl.example.net"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Blacklist zone lists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blacklists: Option<BlacklistsConfig>,
}

/// Default values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Per-lookup timeout (as string, e.g. "3s", "1m", "5")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// "json" or "text"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

/// Zone lists. `zones` replaces the built-in list; `custom` is probed after it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BlacklistsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<Vec<String>>,
}

impl FileConfig {
    /// Snapshot a run configuration so it can be persisted.
    pub fn from_check_config(config: &CheckConfig) -> Self {
        Self {
            defaults: Some(DefaultsConfig {
                concurrency: Some(config.concurrency),
                timeout: Some(format!("{}s", config.timeout.as_secs())),
                output_format: Some(config.output_format.to_string()),
            }),
            blacklists: Some(BlacklistsConfig {
                zones: Some(config.blacklists.clone()),
                custom: Some(config.custom_blacklists.clone()),
            }),
        }
    }

    /// Apply the values present in this file on top of `config`.
    ///
    /// The file must already have been validated.
    pub fn apply_to(&self, mut config: CheckConfig) -> CheckConfig {
        if let Some(defaults) = &self.defaults {
            if let Some(concurrency) = defaults.concurrency {
                config.concurrency = concurrency;
            }
            if let Some(secs) = defaults.timeout.as_deref().and_then(parse_timeout_string) {
                config.timeout = std::time::Duration::from_secs(secs);
            }
            if let Some(format) = defaults
                .output_format
                .as_deref()
                .and_then(|f| f.parse::<OutputFormat>().ok())
            {
                config.output_format = format;
            }
        }

        if let Some(lists) = &self.blacklists {
            if let Some(zones) = &lists.zones {
                config.blacklists = zones.clone();
            }
            if let Some(custom) = &lists.custom {
                config.custom_blacklists = custom.clone();
            }
        }

        config
    }
}

/// Configuration discovery, loading and saving.
pub struct ConfigManager {
    /// Whether to log which files were used
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// `FileError` if the file is missing or unreadable, `ConfigError` if it
    /// does not parse or fails validation.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DnsblCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DnsblCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DnsblCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config (lowest), then `~/.dnsbl-check.toml`, then a file in the
    /// current directory (highest). Later files override earlier ones field
    /// by field. A discovered file that fails to load is an error.
    pub fn discover_and_load(&self) -> Result<FileConfig, DnsblCheckError> {
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        let mut merged = FileConfig::default();
        for path in candidates.into_iter().flatten() {
            let config = self.load_file(&path)?;
            if self.verbose {
                debug!(path = %path.display(), "loaded config file");
            }
            merged = self.merge_configs(merged, config);
        }

        Ok(merged)
    }

    /// Write `config` as TOML, creating parent directories as needed.
    pub fn save_file<P: AsRef<Path>>(
        &self,
        path: P,
        config: &FileConfig,
    ) -> Result<(), DnsblCheckError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(config)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    DnsblCheckError::file_error(
                        parent.to_string_lossy(),
                        format!("Failed to create config directory: {}", e),
                    )
                })?;
            }
        }

        fs::write(path, content).map_err(|e| {
            DnsblCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to write configuration file: {}", e),
            )
        })
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./dnsbl-check.toml", "./.dnsbl-check.toml"]
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .map(Path::to_path_buf)
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".dnsbl-check.toml", "dnsbl-check.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|p| p.exists())
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("dnsbl-check").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations. Values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut low), Some(high)) => {
                    if high.concurrency.is_some() {
                        low.concurrency = high.concurrency;
                    }
                    if high.timeout.is_some() {
                        low.timeout = high.timeout;
                    }
                    if high.output_format.is_some() {
                        low.output_format = high.output_format;
                    }
                    Some(low)
                }
                (low, high) => high.or(low),
            },
            blacklists: match (lower.blacklists, higher.blacklists) {
                (Some(mut low), Some(high)) => {
                    if high.zones.is_some() {
                        low.zones = high.zones;
                    }
                    if high.custom.is_some() {
                        low.custom = high.custom;
                    }
                    Some(low)
                }
                (low, high) => high.or(low),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DnsblCheckError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > MAX_CONCURRENCY {
                    return Err(DnsblCheckError::config(format!(
                        "Concurrency must be between 1 and {}",
                        MAX_CONCURRENCY
                    )));
                }
            }

            if let Some(timeout_str) = &defaults.timeout {
                match parse_timeout_string(timeout_str) {
                    Some(secs) if secs > 0 => {}
                    _ => {
                        return Err(DnsblCheckError::config(format!(
                            "Invalid timeout '{}'. Use a positive value like '3s', '10s', '1m'",
                            timeout_str
                        )))
                    }
                }
            }

            if let Some(format) = &defaults.output_format {
                format.parse::<OutputFormat>()?;
            }
        }

        if let Some(lists) = &config.blacklists {
            for zone in lists.zones.iter().chain(lists.custom.iter()).flatten() {
                if !is_valid_zone(zone) {
                    return Err(DnsblCheckError::config(format!(
                        "Invalid blacklist zone '{}'",
                        zone
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Values read from `DBC_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub concurrency: Option<usize>,
    pub timeout: Option<u64>,
    pub output_format: Option<OutputFormat>,
    pub custom_blacklists: Option<Vec<String>>,
    pub config: Option<String>,
}

impl EnvConfig {
    /// Apply the values present on top of `config`.
    pub fn apply_to(&self, mut config: CheckConfig) -> CheckConfig {
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(secs) = self.timeout {
            config.timeout = std::time::Duration::from_secs(secs);
        }
        if let Some(format) = self.output_format {
            config.output_format = format;
        }
        if let Some(custom) = &self.custom_blacklists {
            config.custom_blacklists = custom.clone();
        }
        config
    }
}

/// Load configuration from environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

fn load_env_config_from<F>(var: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(val) = var("DBC_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(n) if n > 0 && n <= MAX_CONCURRENCY => env_config.concurrency = Some(n),
            _ => warn!(
                "Invalid DBC_CONCURRENCY='{}', must be 1-{}",
                val, MAX_CONCURRENCY
            ),
        }
    }

    if let Some(val) = var("DBC_TIMEOUT") {
        match parse_timeout_string(&val) {
            Some(secs) if secs > 0 => env_config.timeout = Some(secs),
            _ => warn!("Invalid DBC_TIMEOUT='{}', use format like '3s', '1m'", val),
        }
    }

    if let Some(val) = var("DBC_OUTPUT_FORMAT") {
        match val.parse::<OutputFormat>() {
            Ok(format) => env_config.output_format = Some(format),
            Err(_) => warn!("Invalid DBC_OUTPUT_FORMAT='{}', use json or text", val),
        }
    }

    if let Some(val) = var("DBC_CUSTOM_BLACKLISTS") {
        let zones: Vec<String> = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(bad) = zones.iter().find(|z| !is_valid_zone(z)) {
            warn!("Invalid zone '{}' in DBC_CUSTOM_BLACKLISTS, ignoring it", bad);
        } else if !zones.is_empty() {
            env_config.custom_blacklists = Some(zones);
        }
    }

    if let Some(val) = var("DBC_CONFIG") {
        if !val.trim().is_empty() {
            env_config.config = Some(val);
        }
    }

    env_config
}

/// Parse a timeout string into seconds.
///
/// Accepts "5s", "2m", or a bare number of seconds.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok()
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("3s"), Some(3));
        assert_eq!(parse_timeout_string("30S"), Some(30));
        assert_eq!(parse_timeout_string("2m"), Some(120));
        assert_eq!(parse_timeout_string("5"), Some(5));
        assert_eq!(parse_timeout_string("invalid"), None);
        assert_eq!(parse_timeout_string("-1s"), None);
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(
            r#"
[defaults]
concurrency = 25
timeout = "5s"
output_format = "text"

[blacklists]
zones = ["bl.spamcop.net"]
custom = ["dnsbl.example.net", "bl.spamcop.net"]
"#,
        );

        let config = ConfigManager::new(false).load_file(file.path()).unwrap();
        let check = config.apply_to(CheckConfig::default());

        assert_eq!(check.concurrency, 25);
        assert_eq!(check.timeout, Duration::from_secs(5));
        assert_eq!(check.output_format, OutputFormat::Text);
        assert_eq!(check.blacklists, vec!["bl.spamcop.net"]);
        assert_eq!(
            check.effective_blacklists(),
            vec!["bl.spamcop.net", "dnsbl.example.net", "bl.spamcop.net"]
        );
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let file = write_config("[defaults]\nconcurrency = 10\n");
        let config = ConfigManager::new(false).load_file(file.path()).unwrap();
        let check = config.apply_to(CheckConfig::default());

        assert_eq!(check.concurrency, 10);
        assert_eq!(check.timeout, Duration::from_secs(3));
        assert_eq!(check.blacklists, CheckConfig::default().blacklists);
    }

    #[test]
    fn test_invalid_concurrency() {
        let file = write_config("[defaults]\nconcurrency = 0\n");
        let result = ConfigManager::new(false).load_file(file.path());
        assert!(matches!(result, Err(DnsblCheckError::ConfigError { .. })));
    }

    #[test]
    fn test_invalid_timeout_and_format() {
        for content in [
            "[defaults]\ntimeout = \"soon\"\n",
            "[defaults]\ntimeout = \"0s\"\n",
            "[defaults]\noutput_format = \"csv\"\n",
            "[blacklists]\ncustom = [\"bad zone\"]\n",
        ] {
            let file = write_config(content);
            let result = ConfigManager::new(false).load_file(file.path());
            assert!(result.is_err(), "expected error for {:?}", content);
        }
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_config("[defaults\nconcurrency = ");
        let result = ConfigManager::new(false).load_file(file.path());
        assert!(matches!(result, Err(DnsblCheckError::ConfigError { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigManager::new(false).load_file("/nonexistent/dnsbl-check.toml");
        assert!(matches!(result, Err(DnsblCheckError::FileError { .. })));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);
        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(10),
                timeout: Some("5s".into()),
                output_format: None,
            }),
            blacklists: Some(BlacklistsConfig {
                zones: None,
                custom: Some(vec!["a.example".into()]),
            }),
        };
        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(25),
                timeout: None,
                output_format: Some("text".into()),
            }),
            blacklists: None,
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();
        assert_eq!(defaults.concurrency, Some(25)); // Higher wins
        assert_eq!(defaults.timeout, Some("5s".to_string())); // Lower preserved
        assert_eq!(defaults.output_format, Some("text".to_string()));
        assert_eq!(
            merged.blacklists.unwrap().custom,
            Some(vec!["a.example".to_string()])
        );
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let manager = ConfigManager::new(false);

        let original = CheckConfig::default()
            .with_concurrency(42)
            .with_custom_blacklists(vec!["dnsbl.example.net".into()]);
        manager
            .save_file(&path, &FileConfig::from_check_config(&original))
            .unwrap();

        let reloaded = manager.load_file(&path).unwrap().apply_to(CheckConfig::default());
        assert_eq!(reloaded, original);
    }

    #[test]
    fn test_env_config() {
        let vars: HashMap<&str, &str> = [
            ("DBC_CONCURRENCY", "20"),
            ("DBC_TIMEOUT", "7s"),
            ("DBC_OUTPUT_FORMAT", "text"),
            ("DBC_CUSTOM_BLACKLISTS", "a.example, b.example,,"),
        ]
        .into_iter()
        .collect();

        let env_config = load_env_config_from(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(env_config.concurrency, Some(20));
        assert_eq!(env_config.timeout, Some(7));
        assert_eq!(env_config.output_format, Some(OutputFormat::Text));
        assert_eq!(
            env_config.custom_blacklists,
            Some(vec!["a.example".to_string(), "b.example".to_string()])
        );

        let check = env_config.apply_to(CheckConfig::default());
        assert_eq!(check.concurrency, 20);
        assert_eq!(check.timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_env_config_ignores_invalid_values() {
        let vars: HashMap<&str, &str> = [
            ("DBC_CONCURRENCY", "0"),
            ("DBC_TIMEOUT", "never"),
            ("DBC_OUTPUT_FORMAT", "xml"),
            ("DBC_CUSTOM_BLACKLISTS", "ok.example,bad zone"),
        ]
        .into_iter()
        .collect();

        let env_config = load_env_config_from(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(env_config, EnvConfig::default());
    }
}
