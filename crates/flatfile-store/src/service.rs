// crates/flatfile-store/src/service.rs
// ============================================================================
// Module: Flat-File Service
// Description: Facade bundling the shared client with the pipeline operations.
// Purpose: Give the external layer one handle for list, grant, sample, import.
// Dependencies: flatfile-config, flatfile-core
// ============================================================================

//! ## Overview
//! [`FlatFileService`] owns the lazily constructed store client and the
//! import settings, and exposes the four pipeline operations. It holds no
//! other cross-request state and is safe to share across concurrent calls.

// ============================================================================
// SECTION: Imports
// ============================================================================

#[cfg(test)]
use std::sync::Arc;

use flatfile_config::ImportConfig;
use flatfile_config::IngestConfig;
use flatfile_core::DownloadGrant;
use flatfile_core::ImportResult;
use flatfile_core::IngestError;
use flatfile_core::ListingPage;
use flatfile_core::PreviewResult;

#[cfg(test)]
use crate::client::ObjectStoreClient;
use crate::client::SharedStoreClient;
use crate::import;
use crate::listing;
use crate::presign;
use crate::preview;

// ============================================================================
// SECTION: Service Facade
// ============================================================================

/// Entry point for the flat-file ingestion operations.
pub struct FlatFileService {
    /// Lazily constructed store client, shared across operations.
    client: SharedStoreClient,
    /// Import destination and cleanup policy.
    import: ImportConfig,
}

impl FlatFileService {
    /// Creates a service from validated configuration.
    ///
    /// No client is constructed yet; credentials are checked on the first
    /// operation that needs the store.
    #[must_use]
    pub fn new(config: IngestConfig) -> Self {
        Self {
            client: SharedStoreClient::new(config.store),
            import: config.import,
        }
    }

    /// Creates a service around an existing client (tests only).
    #[cfg(test)]
    pub(crate) fn from_client(client: Arc<dyn ObjectStoreClient>, import: ImportConfig) -> Self {
        Self {
            client: SharedStoreClient::preset(client),
            import,
        }
    }

    /// Lists one page of flat files under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] as documented for
    /// [`listing::list_flat_files`].
    pub async fn list(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: Option<i32>,
    ) -> Result<ListingPage, IngestError> {
        let client = self.client.client().await?;
        listing::list_flat_files(client.as_ref(), prefix, continuation_token, max_keys).await
    }

    /// Issues a download grant for one object.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] as documented for [`presign::download_url`].
    pub async fn download_url(
        &self,
        object_key: &str,
        expires_in_seconds: Option<u64>,
    ) -> Result<DownloadGrant, IngestError> {
        let client = self.client.client().await?;
        presign::download_url(client.as_ref(), object_key, expires_in_seconds).await
    }

    /// Samples the leading lines of one flat file.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] as documented for
    /// [`preview::preview_flat_file`].
    pub async fn sample(
        &self,
        object_key: &str,
        max_lines: Option<usize>,
    ) -> Result<PreviewResult, IngestError> {
        let client = self.client.client().await?;
        preview::preview_flat_file(client.as_ref(), object_key, max_lines).await
    }

    /// Imports one flat file into the configured destination.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] as documented for
    /// [`import::import_flat_file`].
    pub async fn import(&self, object_key: &str) -> Result<ImportResult, IngestError> {
        let client = self.client.client().await?;
        import::import_flat_file(client.as_ref(), &self.import, object_key).await
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
