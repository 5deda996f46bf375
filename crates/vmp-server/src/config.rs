// crates/vmp-server/src/config.rs
// ============================================================================
// Module: Server Configuration
// Description: TOML-file configuration overlaid with environment variables.
// Purpose: One fail-closed config load that the CLI entry point can turn
//          into a process exit code before anything else starts.
// Dependencies: serde, toml, chrono
// ============================================================================

//! ## Overview
//! Config resolution order: defaults, then a TOML file (`--config` or
//! `VMP_CONFIG`, falling back to `vmp-server.toml` in the working
//! directory if present), then environment variables, which always win.
//! [`ServerConfig::load`] never panics; every failure is a [`ConfigError`]
//! so `main` can map it to exit code 1.

use std::env;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable that overrides the config file path.
pub const CONFIG_ENV_VAR: &str = "VMP_CONFIG";
const DEFAULT_CONFIG_NAME: &str = "vmp-server.toml";
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub base_url: String,
    pub db_url: String,
    pub storage_bucket: Option<String>,
    pub storage_region: Option<String>,
    pub storage_url_ttl_seconds: u64,
    pub kdf_work_factor: u32,
    pub invite_ttl_hours: i64,
    pub session_ttl_hours: i64,
    pub log_format: LogFormat,
}

/// `LOG_FORMAT` values: `pretty` for local development, `json` for
/// production log aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Raw, partially-optional shape deserialized straight from TOML. Every
/// field is optional here; [`ServerConfig::load`] fills gaps from
/// environment variables and defaults, then validates the result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawConfig {
    bind_addr: Option<String>,
    base_url: Option<String>,
    db_url: Option<String>,
    storage_bucket: Option<String>,
    storage_region: Option<String>,
    storage_url_ttl_seconds: Option<u64>,
    kdf_work_factor: Option<u32>,
    invite_ttl_hours: Option<i64>,
    session_ttl_hours: Option<i64>,
    log_format: Option<LogFormat>,
}

/// Failures while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("config file {path} exceeds the {MAX_CONFIG_FILE_SIZE}-byte limit")]
    TooLarge { path: PathBuf },
    #[error("could not parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ServerConfig {
    /// Loads configuration from `explicit_path` (the `--config` flag), or
    /// `VMP_CONFIG`, or the default filename if it exists; then overlays
    /// environment variables per the platform's env surface; then
    /// validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or
    /// when the merged configuration fails validation.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let raw = match Self::resolve_path(explicit_path) {
            Some(path) => Self::read_raw(&path)?,
            None => RawConfig::default(),
        };
        Self::from_raw_and_env(raw)
    }

    fn resolve_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit_path {
            return Some(path.to_path_buf());
        }
        if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(env_path));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_NAME);
        default.exists().then_some(default)
    }

    fn read_raw(path: &Path) -> Result<RawConfig, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge { path: path.to_path_buf() });
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    fn from_raw_and_env(mut raw: RawConfig) -> Result<Self, ConfigError> {
        if let Ok(v) = env::var("BASE_URL") {
            raw.base_url = Some(v);
        }
        if let Ok(v) = env::var("DB_URL") {
            raw.db_url = Some(v);
        }
        if let Ok(v) = env::var("STORAGE_BUCKET") {
            raw.storage_bucket = Some(v);
        }
        if let Ok(v) = env::var("STORAGE_REGION") {
            raw.storage_region = Some(v);
        }
        if let Ok(v) = env::var("STORAGE_URL_TTL_SECONDS") {
            raw.storage_url_ttl_seconds =
                Some(v.parse().map_err(|_| ConfigError::Invalid("STORAGE_URL_TTL_SECONDS must be a positive integer".to_string()))?);
        }
        if let Ok(v) = env::var("KDF_WORK_FACTOR") {
            raw.kdf_work_factor = Some(v.parse().map_err(|_| ConfigError::Invalid("KDF_WORK_FACTOR must be a positive integer".to_string()))?);
        }
        if let Ok(v) = env::var("INVITE_TTL_HOURS") {
            raw.invite_ttl_hours = Some(v.parse().map_err(|_| ConfigError::Invalid("INVITE_TTL_HOURS must be a positive integer".to_string()))?);
        }
        if let Ok(v) = env::var("SESSION_TTL_HOURS") {
            raw.session_ttl_hours = Some(v.parse().map_err(|_| ConfigError::Invalid("SESSION_TTL_HOURS must be a positive integer".to_string()))?);
        }
        if let Ok(v) = env::var("LOG_FORMAT") {
            raw.log_format = Some(match v.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                other => return Err(ConfigError::Invalid(format!("LOG_FORMAT must be \"json\" or \"pretty\", got {other:?}"))),
            });
        }

        let bind_addr = raw
            .bind_addr
            .as_deref()
            .unwrap_or("0.0.0.0:8080")
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::Invalid(format!("invalid bindAddr: {err}")))?;
        let base_url = raw.base_url.unwrap_or_else(|| "http://localhost:8080".to_string());
        let db_url = raw.db_url.unwrap_or_else(|| "vmp.sqlite3".to_string());
        let storage_url_ttl_seconds = raw.storage_url_ttl_seconds.unwrap_or(vmp_storage::DEFAULT_SIGNED_URL_TTL_SECONDS);
        let kdf_work_factor = raw.kdf_work_factor.unwrap_or(12);
        let invite_ttl_hours = raw.invite_ttl_hours.unwrap_or(168);
        let session_ttl_hours = raw.session_ttl_hours.unwrap_or(24);
        let log_format = raw.log_format.unwrap_or(LogFormat::Pretty);

        if storage_url_ttl_seconds == 0 || storage_url_ttl_seconds > vmp_storage::MAX_SIGNED_URL_TTL_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "storageUrlTtlSeconds must be in 1..={}",
                vmp_storage::MAX_SIGNED_URL_TTL_SECONDS
            )));
        }
        if kdf_work_factor < 12 {
            return Err(ConfigError::Invalid("kdfWorkFactor must be >= 12".to_string()));
        }
        if invite_ttl_hours <= 0 {
            return Err(ConfigError::Invalid("inviteTtlHours must be positive".to_string()));
        }
        if session_ttl_hours <= 0 {
            return Err(ConfigError::Invalid("sessionTtlHours must be positive".to_string()));
        }
        if base_url.is_empty() {
            return Err(ConfigError::Invalid("baseUrl must not be empty".to_string()));
        }

        Ok(Self {
            bind_addr,
            base_url,
            db_url,
            storage_bucket: raw.storage_bucket,
            storage_region: raw.storage_region,
            storage_url_ttl_seconds,
            kdf_work_factor,
            invite_ttl_hours,
            session_ttl_hours,
            log_format,
        })
    }
}
