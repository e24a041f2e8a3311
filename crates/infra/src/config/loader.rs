//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment, when one exists
//! 2. Attempts to load from environment variables
//! 3. If `LOOKERKIT_BASE_URL` is unset, falls back to loading from file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `LOOKERKIT_BASE_URL`: Instance URL (required)
//! - `LOOKERKIT_CLIENT_ID` / `LOOKERKIT_CLIENT_SECRET`: Client credentials
//! - `LOOKERKIT_ACCESS_TOKEN`: Static bearer token, used when no client id is set
//! - `LOOKERKIT_USER_AGENT`: Product token prepended to the user agent
//! - `LOOKERKIT_RATE_LIMIT_INTERVAL_MS`: Spacing between requests
//! - `LOOKERKIT_TIMEOUT_SECS`: Per-request timeout
//!
//! ## File Locations
//! `LOOKERKIT_CONFIG_PATH` when set, then (relative to the working
//! directory) `lookerkit.toml`, `lookerkit.json`, `config/lookerkit.toml`,
//! `config/lookerkit.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use lookerkit_domain::{AuthConfig, ClientConfig, LookerkitError, Result};

pub const ENV_BASE_URL: &str = "LOOKERKIT_BASE_URL";
pub const ENV_CLIENT_ID: &str = "LOOKERKIT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "LOOKERKIT_CLIENT_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "LOOKERKIT_ACCESS_TOKEN";
pub const ENV_USER_AGENT: &str = "LOOKERKIT_USER_AGENT";
pub const ENV_RATE_LIMIT_INTERVAL_MS: &str = "LOOKERKIT_RATE_LIMIT_INTERVAL_MS";
pub const ENV_TIMEOUT_SECS: &str = "LOOKERKIT_TIMEOUT_SECS";
pub const ENV_CONFIG_PATH: &str = "LOOKERKIT_CONFIG_PATH";

const CONFIG_CANDIDATES: [&str; 4] =
    ["lookerkit.toml", "lookerkit.json", "config/lookerkit.toml", "config/lookerkit.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `LookerkitError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<ClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `LookerkitError::Config` if `LOOKERKIT_BASE_URL` is missing, a
/// numeric variable does not parse, or the result fails validation.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(env_var(ENV_BASE_URL)?);

    config.auth = match (env_opt(ENV_CLIENT_ID), env_opt(ENV_ACCESS_TOKEN)) {
        (Some(client_id), _) => Some(AuthConfig::ClientCredentials {
            client_id,
            client_secret: env_var(ENV_CLIENT_SECRET)?,
        }),
        (None, Some(access_token)) => Some(AuthConfig::StaticToken { access_token }),
        (None, None) => None,
    };
    config.user_agent = env_opt(ENV_USER_AGENT);

    if let Some(ms) = env_opt(ENV_RATE_LIMIT_INTERVAL_MS) {
        let ms = ms.parse::<u64>().map_err(|e| {
            LookerkitError::Config(format!("Invalid rate limit interval: {}", e))
        })?;
        config.rate_limit_interval = Duration::from_millis(ms);
    }
    if let Some(secs) = env_opt(ENV_TIMEOUT_SECS) {
        let secs = secs
            .parse::<u64>()
            .map_err(|e| LookerkitError::Config(format!("Invalid timeout: {}", e)))?;
        config.timeout_secs = Some(secs);
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected
/// by file extension.
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `LookerkitError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The parsed configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LookerkitError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LookerkitError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LookerkitError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// # Errors
/// Returns `LookerkitError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LookerkitError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LookerkitError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(LookerkitError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(explicit) = env_opt(ENV_CONFIG_PATH) {
        candidates.push(PathBuf::from(explicit));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(CONFIG_CANDIDATES.iter().map(|name| cwd.join(name)));
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `LookerkitError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        LookerkitError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional environment variable; blank values count as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
