// crates/flatfile-config/src/lib.rs
// ============================================================================
// Module: Flat-File Configuration Library
// Description: Environment-driven configuration for the ingestion pipeline.
// Purpose: Provide strict, fail-closed settings with documented defaults.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Configuration is read from the process environment with documented
//! defaults for the public endpoint and bucket. Structural settings are
//! validated eagerly and fail closed; credentials are deliberately NOT
//! checked here, because the store client is constructed lazily and reports
//! missing credentials on first use.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::DEFAULT_BUCKET;
pub use config::DEFAULT_ENDPOINT;
pub use config::DEFAULT_IMPORT_DIR;
pub use config::ImportConfig;
pub use config::IngestConfig;
pub use config::StoreConfig;
