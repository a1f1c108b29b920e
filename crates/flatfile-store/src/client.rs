// crates/flatfile-store/src/client.rs
// ============================================================================
// Module: Object Store Client
// Description: Authenticated access to the remote flat-file object store.
// Purpose: Single point of truth for credentials and low-level store requests.
// Dependencies: aws-config, aws-sdk-s3, async-trait, tokio
// ============================================================================

//! ## Overview
//! [`ObjectStoreClient`] is the narrow seam between the pipeline and the
//! remote store: paginated listing, presigned GET issuance, and streaming
//! object opens. [`S3StoreClient`] is the production implementation;
//! [`SharedStoreClient`] defers construction to first use and then reuses
//! the validated instance for the process lifetime. Credentials are checked
//! exactly once, before any network call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::DateTimeFormat;
use flatfile_config::StoreConfig;
use flatfile_core::IngestError;
use flatfile_core::ListingPage;
use flatfile_core::ObjectSummary;
use tokio::io::AsyncBufRead;
use tokio::io::BufReader;
use tokio::sync::OnceCell;
use tracing::debug;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Region used for request signing when none is configured.
const DEFAULT_REGION: &str = "us-east-1";
/// Provider name attached to explicitly supplied credentials.
const CREDENTIALS_PROVIDER_NAME: &str = "flatfile-config";
/// Buffer capacity applied to raw object body streams.
const STREAM_BUFFER_BYTES: usize = 8192;

// ============================================================================
// SECTION: Client Trait
// ============================================================================

/// Streaming handle to one object's bytes.
pub type ObjectReader = Box<dyn AsyncBufRead + Send + Unpin>;

/// Minimal object-store operations the pipeline depends on.
///
/// Each method performs its store call exactly once; retry policy belongs to
/// the caller.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync + Debug {
    /// Lists objects under a prefix, one page per call.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Store`] when the store rejects the request.
    async fn list(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> Result<ListingPage, IngestError>;

    /// Issues a time-limited, read-only URL for one object.
    ///
    /// Pure credential signing; the referenced object is never resolved, so
    /// issuance succeeds for keys that do not exist.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Store`] when signing fails.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, IngestError>;

    /// Opens a streaming reader over one object's raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NotFound`] when the key does not resolve and
    /// [`IngestError::Store`] for other store failures.
    async fn open(&self, key: &str) -> Result<ObjectReader, IngestError>;
}

// ============================================================================
// SECTION: S3 Implementation
// ============================================================================

/// S3-backed store client.
#[derive(Debug)]
pub struct S3StoreClient {
    /// Underlying SDK client.
    client: Client,
    /// Bucket all operations are scoped to.
    bucket: String,
}

impl S3StoreClient {
    /// Builds a client from validated store settings.
    ///
    /// Fails before any network interaction when either credential is absent
    /// or empty; configuration is assumed static for the process lifetime, so
    /// the check never reruns for a constructed instance.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] when credentials are missing.
    pub async fn new(config: &StoreConfig) -> Result<Self, IngestError> {
        let access_key = require_credential(config.access_key.as_deref(), "access key")?;
        let secret_key = require_credential(config.secret_key.as_deref(), "secret key")?;
        let credentials =
            Credentials::new(access_key, secret_key, None, None, CREDENTIALS_PROVIDER_NAME);
        let region = config.region.clone().unwrap_or_else(|| DEFAULT_REGION.to_string());
        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(region))
            .endpoint_url(config.endpoint.trim())
            .load()
            .await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }
        debug!(
            bucket = config.bucket.as_str(),
            endpoint = config.endpoint.as_str(),
            "constructed store client"
        );
        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.trim().to_string(),
        })
    }
}

#[async_trait]
impl ObjectStoreClient for S3StoreClient {
    async fn list(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> Result<ListingPage, IngestError> {
        let mut request = self.client.list_objects_v2().bucket(&self.bucket).max_keys(max_keys);
        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }
        let output = request
            .set_continuation_token(continuation_token.map(str::to_string))
            .send()
            .await
            .map_err(|err| IngestError::Store(err.into_service_error().to_string()))?;
        let items = output
            .contents()
            .iter()
            .map(|object| ObjectSummary {
                key: object.key().unwrap_or_default().to_string(),
                last_modified: object
                    .last_modified()
                    .and_then(|stamp| stamp.fmt(DateTimeFormat::DateTime).ok()),
                size: object.size(),
                storage_class: object.storage_class().map(|class| class.as_str().to_string()),
            })
            .collect();
        let token = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };
        Ok(ListingPage::new(items, token))
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, IngestError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|err| IngestError::Store(err.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|err| IngestError::Store(err.into_service_error().to_string()))?;
        Ok(request.uri().to_string())
    }

    async fn open(&self, key: &str) -> Result<ObjectReader, IngestError> {
        let output =
            self.client.get_object().bucket(&self.bucket).key(key).send().await.map_err(|err| {
                let service_error = err.into_service_error();
                if service_error.is_no_such_key() {
                    IngestError::NotFound {
                        key: key.to_string(),
                    }
                } else {
                    IngestError::Store(service_error.to_string())
                }
            })?;
        Ok(Box::new(BufReader::with_capacity(STREAM_BUFFER_BYTES, output.body.into_async_read())))
    }
}

// ============================================================================
// SECTION: Shared Lazy Handle
// ============================================================================

/// Process-wide handle that constructs the store client on first use.
///
/// Construction (and its credential check) happens at most once; every later
/// call returns the same instance. A failed construction leaves the handle
/// empty, so the next call re-reports the error instead of caching a broken
/// client. The handle is immutable after creation; reconfiguration means
/// building a new handle.
pub struct SharedStoreClient {
    /// Store settings used for deferred construction.
    config: StoreConfig,
    /// Lazily initialized client instance.
    cell: OnceCell<Arc<dyn ObjectStoreClient>>,
}

impl SharedStoreClient {
    /// Creates an empty handle from store settings.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// Creates a handle pre-filled with an existing client (tests only).
    #[cfg(test)]
    pub(crate) fn preset(client: Arc<dyn ObjectStoreClient>) -> Self {
        Self {
            config: StoreConfig {
                access_key: None,
                secret_key: None,
                endpoint: String::new(),
                bucket: String::new(),
                region: None,
                force_path_style: false,
                allow_http: false,
            },
            cell: OnceCell::new_with(Some(client)),
        }
    }

    /// Returns the shared client, constructing it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] when credentials are missing.
    pub async fn client(&self) -> Result<Arc<dyn ObjectStoreClient>, IngestError> {
        let client = self
            .cell
            .get_or_try_init(|| async {
                let client = S3StoreClient::new(&self.config).await?;
                Ok::<_, IngestError>(Arc::new(client) as Arc<dyn ObjectStoreClient>)
            })
            .await?;
        Ok(Arc::clone(client))
    }
}

// ============================================================================
// SECTION: Credential Validation
// ============================================================================

/// Requires a credential value to be present and non-empty.
fn require_credential<'a>(value: Option<&'a str>, label: &str) -> Result<&'a str, IngestError> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .ok_or_else(|| IngestError::Configuration(format!("{label} must be set")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
