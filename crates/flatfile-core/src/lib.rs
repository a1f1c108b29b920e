// crates/flatfile-core/src/lib.rs
// ============================================================================
// Module: Flat-File Core Library
// Description: Shared data model and error taxonomy for the ingestion pipeline.
// Purpose: Expose value types and bounds used by every pipeline component.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types for the remote flat-file ingestion pipeline: listing pages,
//! download grants, preview and import results, the request-bound clamping
//! helpers, and the single error taxonomy surfaced to callers. Everything in
//! this crate is a transient per-request value; no state is held here.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod model;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::IngestError;
pub use model::DEFAULT_GRANT_EXPIRY_SECONDS;
pub use model::DEFAULT_LIST_MAX_KEYS;
pub use model::DEFAULT_PREVIEW_MAX_LINES;
pub use model::DownloadGrant;
pub use model::ImportResult;
pub use model::ListingPage;
pub use model::MAX_GRANT_EXPIRY_SECONDS;
pub use model::MAX_LIST_MAX_KEYS;
pub use model::MAX_PREVIEW_MAX_LINES;
pub use model::MIN_GRANT_EXPIRY_SECONDS;
pub use model::MIN_LIST_MAX_KEYS;
pub use model::MIN_PREVIEW_MAX_LINES;
pub use model::ObjectSummary;
pub use model::PreviewResult;
pub use model::clamp_grant_expiry;
pub use model::clamp_list_max_keys;
pub use model::clamp_preview_lines;
