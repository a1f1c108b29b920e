// crates/flatfile-core/src/error.rs
// ============================================================================
// Module: Ingestion Error Taxonomy
// Description: The single error surface of the flat-file ingestion pipeline.
// Purpose: Let callers distinguish configuration, argument, store, stream, and
//          filesystem failures without parsing messages.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every pipeline operation fails with exactly one [`IngestError`]. Nothing is
//! retried at this layer and nothing is swallowed; retry policy belongs to the
//! external caller. Variants carry enough text to report upstream verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Error Taxonomy
// ============================================================================

/// Errors surfaced by the flat-file ingestion pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Credentials missing or invalid at client construction time.
    #[error("store configuration invalid: {0}")]
    Configuration(String),
    /// Caller supplied a missing or malformed required field.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The remote store returned an error; propagated without local retry.
    #[error("object store error: {0}")]
    Store(String),
    /// The referenced object does not exist in the store.
    #[error("object not found: {key}")]
    NotFound {
        /// Key that failed to resolve.
        key: String,
    },
    /// Failure while reading a stream body.
    #[error("stream read failed: {0}")]
    StreamRead(String),
    /// Failure while decompressing a stream body (e.g. a misnamed object).
    #[error("corrupt compressed stream: {0}")]
    CorruptStream(String),
    /// Local directory creation or file I/O failure during import.
    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl IngestError {
    /// Returns whether the failure is attributable to the caller's request.
    ///
    /// The external layer maps these to a client-error status; everything
    /// else is a server-side failure.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::NotFound { .. })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
