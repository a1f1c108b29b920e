// crates/flatfile-store/src/presign.rs
// ============================================================================
// Module: Signed-URL Issuer
// Description: Short-lived, read-only download grants for single objects.
// Purpose: Bound credential exposure without an existence round trip.
// Dependencies: flatfile-core
// ============================================================================

//! ## Overview
//! Issuance is pure credential signing: the store is never consulted about
//! the referenced object, so a grant for a missing key succeeds and fails
//! only at resolution time. The validity window is clamped locally; its
//! enforcement is the remote store's.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use flatfile_core::DownloadGrant;
use flatfile_core::IngestError;
use flatfile_core::clamp_grant_expiry;
use tracing::debug;

use crate::client::ObjectStoreClient;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Issues a download grant for one object.
///
/// `expires_in_seconds` is clamped to `[60, 3600]` (default 300).
///
/// # Errors
///
/// Returns [`IngestError::InvalidArgument`] for an empty key, rejected
/// before any store interaction, and [`IngestError::Store`] when signing
/// fails.
pub async fn download_url(
    client: &dyn ObjectStoreClient,
    object_key: &str,
    expires_in_seconds: Option<u64>,
) -> Result<DownloadGrant, IngestError> {
    let key = object_key.trim();
    if key.is_empty() {
        return Err(IngestError::InvalidArgument("object key must be set".to_string()));
    }
    let expiry = clamp_grant_expiry(expires_in_seconds);
    let url = client.presign_get(key, Duration::from_secs(expiry)).await?;
    debug!(key, expires_in = expiry, "issued download grant");
    Ok(DownloadGrant {
        url,
        expires_in_seconds: expiry,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
