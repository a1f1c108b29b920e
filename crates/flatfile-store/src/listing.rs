// crates/flatfile-store/src/listing.rs
// ============================================================================
// Module: Listing Service
// Description: Paginated enumeration of flat files under a prefix.
// Purpose: Translate store-native pagination into the stable page contract.
// Dependencies: flatfile-core
// ============================================================================

//! ## Overview
//! One store call per invocation, no retry, no side effects beyond the call
//! itself. The returned page upholds the token-iff-truncated invariant by
//! construction; callers drive pagination purely off the token's presence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use flatfile_core::IngestError;
use flatfile_core::ListingPage;
use flatfile_core::clamp_list_max_keys;
use tracing::debug;

use crate::client::ObjectStoreClient;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Lists one page of flat files under `prefix`.
///
/// `max_keys` is clamped to `[1, 1000]` (default 50). An empty prefix
/// matches every object in the bucket.
///
/// # Errors
///
/// Returns [`IngestError::Store`] when the store rejects the request;
/// nothing is retried locally.
pub async fn list_flat_files(
    client: &dyn ObjectStoreClient,
    prefix: &str,
    continuation_token: Option<&str>,
    max_keys: Option<i32>,
) -> Result<ListingPage, IngestError> {
    let limit = clamp_list_max_keys(max_keys);
    let page = client.list(prefix, continuation_token, limit).await?;
    debug!(prefix, count = page.items.len(), truncated = page.is_truncated, "listed flat files");
    Ok(page)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
