//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `DP_*`
//! environment variables, and merging them with proper precedence rules.
//! The CLI layers its own flags on top.

use crate::error::DomainProbeError;
use crate::types::MAX_POOL_SIZE;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for probe options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Output preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Number of concurrent workers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_size: Option<usize>,

    /// Per-attempt timeout ("10s", "1m", "15")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Zero-based input column holding the domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,

    /// User-Agent header for probes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// Results file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Print JSON to stdout instead of writing CSV
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to emit warnings for config issues
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainProbeError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainProbeError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainProbeError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            DomainProbeError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;
        debug!(path = %path.display(), "loaded configuration file");

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is loaded first, then the global file in `$HOME`, then a
    /// file in the current directory; later files override earlier ones.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainProbeError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring config file"),
            }
        }

        if self.verbose && loaded_files.len() > 1 {
            let files: Vec<String> = loaded_files
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            warn!(
                files = %files.join(", "),
                "multiple config files found, later files take precedence"
            );
        }

        Ok(merged_config)
    }

    /// Configuration file in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./domain-probe.toml", "./.domain-probe.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Configuration file in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".domain-probe.toml", "domain-probe.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Configuration file under the XDG config directory.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-probe").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations; values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower), Some(higher)) => Some(DefaultsConfig {
                    pool_size: higher.pool_size.or(lower.pool_size),
                    timeout: higher.timeout.or(lower.timeout),
                    column: higher.column.or(lower.column),
                    user_agent: higher.user_agent.or(lower.user_agent),
                }),
                (lower, higher) => higher.or(lower),
            },
            output: match (lower.output, higher.output) {
                (Some(lower), Some(higher)) => Some(OutputConfig {
                    path: higher.path.or(lower.path),
                    json: higher.json.or(lower.json),
                }),
                (lower, higher) => higher.or(lower),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainProbeError> {
        if let Some(defaults) = &config.defaults {
            if let Some(pool_size) = defaults.pool_size {
                if pool_size == 0 || pool_size > MAX_POOL_SIZE {
                    return Err(DomainProbeError::config(format!(
                        "pool_size must be between 1 and {}",
                        MAX_POOL_SIZE
                    )));
                }
            }

            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(DomainProbeError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                        timeout_str
                    )));
                }
            }

            if let Some(user_agent) = &defaults.user_agent {
                if user_agent.trim().is_empty() {
                    return Err(DomainProbeError::config("user_agent cannot be empty"));
                }
            }
        }

        if let Some(output) = &config.output {
            if let Some(path) = &output.path {
                if path.trim().is_empty() {
                    return Err(DomainProbeError::config("output path cannot be empty"));
                }
            }
        }

        Ok(())
    }
}

/// Values read from `DP_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub pool_size: Option<usize>,
    pub timeout: Option<String>,
    pub column: Option<usize>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub json: Option<bool>,
    pub config: Option<String>,
}

/// Load configuration from the process environment.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

/// Build an `EnvConfig` from any variable lookup.
pub fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(val) = lookup("DP_POOL_SIZE") {
        match val.trim().parse::<usize>() {
            Ok(size) if size > 0 && size <= MAX_POOL_SIZE => {
                debug!(pool_size = size, "using DP_POOL_SIZE");
                env_config.pool_size = Some(size);
            }
            _ => warn!(value = %val, "invalid DP_POOL_SIZE, must be 1-{}", MAX_POOL_SIZE),
        }
    }

    if let Some(val) = lookup("DP_TIMEOUT") {
        if parse_timeout_string(&val).is_some() {
            debug!(timeout = %val, "using DP_TIMEOUT");
            env_config.timeout = Some(val);
        } else {
            warn!(value = %val, "invalid DP_TIMEOUT, use format like '5s', '30s', '2m'");
        }
    }

    if let Some(val) = lookup("DP_COLUMN") {
        match val.trim().parse::<usize>() {
            Ok(column) => env_config.column = Some(column),
            Err(_) => warn!(value = %val, "invalid DP_COLUMN, must be a column index"),
        }
    }

    env_config.input = non_empty(lookup("DP_INPUT"));
    env_config.output = non_empty(lookup("DP_OUTPUT"));
    env_config.config = non_empty(lookup("DP_CONFIG"));

    if let Some(val) = lookup("DP_JSON") {
        env_config.json = parse_bool(&val);
        if env_config.json.is_none() {
            warn!(value = %val, "invalid DP_JSON, use true/false");
        }
    }

    env_config
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a timeout string like "5s", "30s", "2m" into seconds.
///
/// A bare number is taken as seconds. Zero is rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let seconds = if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok()
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    };

    seconds.filter(|s| *s > 0)
}
