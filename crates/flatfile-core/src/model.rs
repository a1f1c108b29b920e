// crates/flatfile-core/src/model.rs
// ============================================================================
// Module: Flat-File Data Model
// Description: Value types exchanged between the pipeline and its callers.
// Purpose: Provide serializable, never-mutated result shapes with stable bounds.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the value types produced by the ingestion pipeline and
//! the clamping helpers that bound caller-supplied limits. Every type is
//! constructed per request and never mutated afterwards; the remote store
//! remains authoritative for object identity and ordering.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default page size for listing calls.
pub const DEFAULT_LIST_MAX_KEYS: i32 = 50;
/// Minimum page size accepted for listing calls.
pub const MIN_LIST_MAX_KEYS: i32 = 1;
/// Maximum page size accepted for listing calls.
pub const MAX_LIST_MAX_KEYS: i32 = 1000;
/// Default validity window for download grants, in seconds.
pub const DEFAULT_GRANT_EXPIRY_SECONDS: u64 = 300;
/// Minimum validity window for download grants, in seconds.
pub const MIN_GRANT_EXPIRY_SECONDS: u64 = 60;
/// Maximum validity window for download grants, in seconds.
pub const MAX_GRANT_EXPIRY_SECONDS: u64 = 3600;
/// Default number of lines returned by a preview.
pub const DEFAULT_PREVIEW_MAX_LINES: usize = 10;
/// Minimum number of lines accepted for a preview.
pub const MIN_PREVIEW_MAX_LINES: usize = 1;
/// Maximum number of lines accepted for a preview.
pub const MAX_PREVIEW_MAX_LINES: usize = 50;

// ============================================================================
// SECTION: Listing Types
// ============================================================================

/// Summary of a single remote object, as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Object key, possibly containing path separators.
    pub key: String,
    /// Last-modified timestamp in RFC 3339 form, when the store reports one.
    pub last_modified: Option<String>,
    /// Object size in bytes, when the store reports one.
    pub size: Option<i64>,
    /// Storage class label, when the store reports one.
    pub storage_class: Option<String>,
}

/// One page of a paginated listing, in store order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPage {
    /// Objects on this page, in the order the store returned them.
    pub items: Vec<ObjectSummary>,
    /// Whether further pages exist beyond this one.
    pub is_truncated: bool,
    /// Opaque cursor for the next page; present exactly when truncated.
    pub continuation_token: Option<String>,
}

impl ListingPage {
    /// Builds a page, deriving the truncation flag from token presence.
    ///
    /// The store protocol technically allows the two to disagree on a final
    /// page; keying truncation off the token keeps the page invariant
    /// (`continuation_token.is_some() == is_truncated`) true by construction.
    #[must_use]
    pub fn new(items: Vec<ObjectSummary>, continuation_token: Option<String>) -> Self {
        Self {
            items,
            is_truncated: continuation_token.is_some(),
            continuation_token,
        }
    }
}

// ============================================================================
// SECTION: Grant and Result Types
// ============================================================================

/// Short-lived, read-only download URL for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadGrant {
    /// Signed URL; its validity window is enforced by the remote store.
    pub url: String,
    /// Effective validity window in seconds, after clamping.
    pub expires_in_seconds: u64,
}

/// Bounded sample of an object's leading lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewResult {
    /// Key of the sampled object.
    pub object_key: String,
    /// Lines actually consumed before stopping; always equals `sample.len()`.
    pub total_lines_read: u64,
    /// Leading logical lines, at most the requested maximum.
    pub sample: Vec<String>,
    /// Whether the object was read through the decompression stage.
    pub compressed: bool,
}

/// Outcome of materializing an object locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Key of the imported object.
    pub object_key: String,
    /// Local path of the raw download.
    pub saved_to: PathBuf,
    /// Local path of the decompressed content; absent for uncompressed objects.
    pub extracted_path: Option<PathBuf>,
    /// Logical line count of the extracted file; absent for uncompressed objects.
    pub row_count: Option<u64>,
}

// ============================================================================
// SECTION: Bound Clamping
// ============================================================================

/// Clamps a requested listing page size into `[1, 1000]`, defaulting to 50.
#[must_use]
pub fn clamp_list_max_keys(requested: Option<i32>) -> i32 {
    requested
        .unwrap_or(DEFAULT_LIST_MAX_KEYS)
        .clamp(MIN_LIST_MAX_KEYS, MAX_LIST_MAX_KEYS)
}

/// Clamps a requested grant expiry into `[60, 3600]` seconds, defaulting to 300.
#[must_use]
pub fn clamp_grant_expiry(requested: Option<u64>) -> u64 {
    requested
        .unwrap_or(DEFAULT_GRANT_EXPIRY_SECONDS)
        .clamp(MIN_GRANT_EXPIRY_SECONDS, MAX_GRANT_EXPIRY_SECONDS)
}

/// Clamps a requested preview line budget into `[1, 50]`, defaulting to 10.
#[must_use]
pub fn clamp_preview_lines(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_PREVIEW_MAX_LINES)
        .clamp(MIN_PREVIEW_MAX_LINES, MAX_PREVIEW_MAX_LINES)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
