// crates/flatfile-config/src/config.rs
// ============================================================================
// Module: Ingestion Configuration
// Description: Store and import settings loaded from the process environment.
// Purpose: Provide immutable, validated configuration with lazy credential checks.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! [`IngestConfig`] bundles the remote-store connection settings and the
//! local import settings. Loading never touches the network; validation
//! covers structural concerns (endpoint scheme, bucket presence, flag
//! syntax) and fails closed. Credential presence is the store client's
//! concern, surfaced on first use rather than at load time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the store access key.
pub(crate) const ACCESS_KEY_VAR: &str = "FLATFILE_ACCESS_KEY";
/// Environment variable holding the store secret key.
pub(crate) const SECRET_KEY_VAR: &str = "FLATFILE_SECRET_KEY";
/// Environment variable overriding the store endpoint.
pub(crate) const ENDPOINT_VAR: &str = "FLATFILE_ENDPOINT";
/// Environment variable overriding the bucket name.
pub(crate) const BUCKET_VAR: &str = "FLATFILE_BUCKET";
/// Environment variable supplying an optional region hint.
pub(crate) const REGION_VAR: &str = "FLATFILE_REGION";
/// Environment variable enabling path-style addressing.
pub(crate) const FORCE_PATH_STYLE_VAR: &str = "FLATFILE_FORCE_PATH_STYLE";
/// Environment variable permitting non-TLS endpoints.
pub(crate) const ALLOW_HTTP_VAR: &str = "FLATFILE_ALLOW_HTTP";
/// Environment variable overriding the import destination directory.
pub(crate) const IMPORT_DIR_VAR: &str = "FLATFILE_IMPORT_DIR";
/// Environment variable enabling raw-download cleanup on late failures.
pub(crate) const REMOVE_RAW_ON_ERROR_VAR: &str = "FLATFILE_REMOVE_RAW_ON_ERROR";

/// Well-known public flat-file endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://flatfiles.example-data.net";
/// Well-known default bucket used when none is configured.
pub const DEFAULT_BUCKET: &str = "flatfiles";
/// Default import destination under the application upload area.
pub const DEFAULT_IMPORT_DIR: &str = "uploads/flat-file-imports";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting is structurally invalid.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Store Settings
// ============================================================================

/// Remote object-store connection settings.
///
/// Immutable once constructed; reconfiguration means building a new value
/// and a new client from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Access key; absence is surfaced by the client on first use.
    #[serde(default)]
    pub access_key: Option<String>,
    /// Secret key; absence is surfaced by the client on first use.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Store endpoint URL.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Optional region hint for request signing.
    #[serde(default)]
    pub region: Option<String>,
    /// Force path-style addressing (S3-compatible stores).
    #[serde(default)]
    pub force_path_style: bool,
    /// Allow non-TLS endpoints (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
}

impl StoreConfig {
    /// Validates structural store settings.
    ///
    /// Credentials are intentionally not checked here; see the module
    /// overview.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the endpoint or bucket is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Invalid("endpoint must be set".to_string()));
        }
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ConfigError::Invalid(
                "endpoint must include http:// or https://".to_string(),
            ));
        }
        if endpoint.starts_with("http://") && !self.allow_http {
            return Err(ConfigError::Invalid(
                "endpoint uses http:// without allow_http".to_string(),
            ));
        }
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid("bucket must be set".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Import Settings
// ============================================================================

/// Local import destination and cleanup policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Directory downloaded and extracted files are written under.
    pub destination_dir: PathBuf,
    /// Delete the raw download when extraction or counting fails afterwards.
    ///
    /// Defaults to `false`: the raw file may still be independently useful
    /// for diagnosis, so retention is the documented default.
    #[serde(default)]
    pub remove_raw_on_error: bool,
}

impl ImportConfig {
    /// Validates import settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the destination directory is unset.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.destination_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("destination_dir must be set".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Aggregate Configuration
// ============================================================================

/// Complete pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Remote store connection settings.
    pub store: StoreConfig,
    /// Local import settings.
    pub import: ImportConfig,
}

impl IngestConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a setting is structurally invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|name| env::var(name).ok())
    }

    /// Loads configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a setting is structurally invalid.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            store: StoreConfig {
                access_key: non_empty(lookup(ACCESS_KEY_VAR)),
                secret_key: non_empty(lookup(SECRET_KEY_VAR)),
                endpoint: non_empty(lookup(ENDPOINT_VAR))
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                bucket: non_empty(lookup(BUCKET_VAR)).unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
                region: non_empty(lookup(REGION_VAR)),
                force_path_style: parse_flag(FORCE_PATH_STYLE_VAR, lookup(FORCE_PATH_STYLE_VAR))?,
                allow_http: parse_flag(ALLOW_HTTP_VAR, lookup(ALLOW_HTTP_VAR))?,
            },
            import: ImportConfig {
                destination_dir: non_empty(lookup(IMPORT_DIR_VAR))
                    .map_or_else(|| PathBuf::from(DEFAULT_IMPORT_DIR), PathBuf::from),
                remove_raw_on_error: parse_flag(
                    REMOVE_RAW_ON_ERROR_VAR,
                    lookup(REMOVE_RAW_ON_ERROR_VAR),
                )?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.import.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Parsing Helpers
// ============================================================================

/// Trims a variable value and drops empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|raw| raw.trim().to_string()).filter(|trimmed| !trimmed.is_empty())
}

/// Parses a boolean flag variable, failing closed on unknown syntax.
fn parse_flag(name: &str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(raw) = non_empty(value) else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ConfigError::Invalid(format!("{name} must be true or false"))),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
