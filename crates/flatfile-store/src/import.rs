// crates/flatfile-store/src/import.rs
// ============================================================================
// Module: Import Pipeline
// Description: Full download, conditional extraction, and row accounting.
// Purpose: Materialize one remote flat file locally with bounded memory.
// Dependencies: async-compression, flatfile-config, flatfile-core, tokio
// ============================================================================

//! ## Overview
//! The pipeline runs three strictly serialized stages. Stage one streams
//! the object body to disk. Stage two, for `.gz` names only, decompresses
//! to a sibling path with the suffix stripped. Stage three counts logical
//! rows in the extracted file. Serialization is deliberate: a failure while
//! counting can never corrupt the extracted file, because it was fully
//! written beforehand.
//!
//! Partial artifacts of a failed stage are removed best-effort. The raw
//! download is the one exception: when extraction or counting fails it is
//! retained by default (it may still be useful for diagnosis) and deleted
//! only under the explicit `remove_raw_on_error` policy.
//!
//! The local filename is the basename of the object key; keys sharing a
//! basename under different prefixes collide, and concurrent imports of the
//! same key into one destination race. Both are the caller's to namespace.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::path::Path;

use async_compression::tokio::bufread::GzipDecoder;
use flatfile_config::ImportConfig;
use flatfile_core::ImportResult;
use flatfile_core::IngestError;
use tokio::fs;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::client::ObjectStoreClient;
use crate::decode::COMPRESSED_SUFFIX;
use crate::decode::DECODE_BUFFER_BYTES;
use crate::decode::count_logical_lines;
use crate::decode::is_corrupt_kind;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Imports one flat file into the configured destination directory.
///
/// # Errors
///
/// Returns [`IngestError::InvalidArgument`] for an empty key or one with no
/// filename, [`IngestError::NotFound`] / [`IngestError::Store`] when the
/// object cannot be opened, [`IngestError::StreamRead`] for failures while
/// streaming the body, [`IngestError::CorruptStream`] when the object is not
/// valid gzip despite its suffix, and [`IngestError::Filesystem`] for local
/// I/O failures.
pub async fn import_flat_file(
    client: &dyn ObjectStoreClient,
    config: &ImportConfig,
    object_key: &str,
) -> Result<ImportResult, IngestError> {
    let key = object_key.trim();
    if key.is_empty() {
        return Err(IngestError::InvalidArgument("object key must be set".to_string()));
    }
    let file_name = key.rsplit('/').next().unwrap_or(key);
    if file_name.is_empty() {
        return Err(IngestError::InvalidArgument("object key must name a file".to_string()));
    }
    let stem = file_name.strip_suffix(COMPRESSED_SUFFIX);
    if stem == Some("") {
        return Err(IngestError::InvalidArgument(
            "object key must name a file before the compressed suffix".to_string(),
        ));
    }

    fs::create_dir_all(&config.destination_dir)
        .await
        .map_err(|err| IngestError::Filesystem(err.to_string()))?;
    let saved_to = config.destination_dir.join(file_name);
    download_object(client, key, &saved_to).await?;

    let Some(stem) = stem else {
        info!(key, path = %saved_to.display(), "imported flat file without extraction");
        return Ok(ImportResult {
            object_key: key.to_string(),
            saved_to,
            extracted_path: None,
            row_count: None,
        });
    };

    let extracted_path = config.destination_dir.join(stem);
    if let Err(err) = extract_raw_file(&saved_to, &extracted_path).await {
        remove_artifact(&extracted_path).await;
        if config.remove_raw_on_error {
            remove_artifact(&saved_to).await;
        }
        return Err(err);
    }
    let row_count = match count_rows(&extracted_path).await {
        Ok(rows) => rows,
        Err(err) => {
            if config.remove_raw_on_error {
                remove_artifact(&saved_to).await;
            }
            return Err(err);
        }
    };
    info!(key, rows = row_count, path = %extracted_path.display(), "imported and extracted flat file");
    Ok(ImportResult {
        object_key: key.to_string(),
        saved_to,
        extracted_path: Some(extracted_path),
        row_count: Some(row_count),
    })
}

// ============================================================================
// SECTION: Pipeline Stages
// ============================================================================

/// Streams the raw object body to `saved_to`.
///
/// A failed transfer removes the partial file before surfacing the error, so
/// a download failure leaves no artifacts at all.
async fn download_object(
    client: &dyn ObjectStoreClient,
    key: &str,
    saved_to: &Path,
) -> Result<u64, IngestError> {
    let mut reader = client.open(key).await?;
    let mut file =
        File::create(saved_to).await.map_err(|err| IngestError::Filesystem(err.to_string()))?;
    let copied = match tokio::io::copy(&mut reader, &mut file).await {
        Ok(bytes) => bytes,
        Err(err) => {
            drop(file);
            remove_artifact(saved_to).await;
            return Err(IngestError::StreamRead(format!("download of {key} failed: {err}")));
        }
    };
    if let Err(err) = file.flush().await {
        drop(file);
        remove_artifact(saved_to).await;
        return Err(IngestError::Filesystem(err.to_string()));
    }
    debug!(key, bytes = copied, "downloaded object body");
    Ok(copied)
}

/// Stream-decompresses the raw download into `extracted_path`.
///
/// The transform consumes and emits incrementally; memory use is bounded
/// independent of object size.
async fn extract_raw_file(saved_to: &Path, extracted_path: &Path) -> Result<(), IngestError> {
    let raw =
        File::open(saved_to).await.map_err(|err| IngestError::Filesystem(err.to_string()))?;
    let mut decoder = GzipDecoder::new(BufReader::with_capacity(DECODE_BUFFER_BYTES, raw));
    let mut target = File::create(extracted_path)
        .await
        .map_err(|err| IngestError::Filesystem(err.to_string()))?;
    if let Err(err) = tokio::io::copy(&mut decoder, &mut target).await {
        return Err(lower_extract_error(&err));
    }
    target.flush().await.map_err(|err| IngestError::Filesystem(err.to_string()))?;
    Ok(())
}

/// Counts logical rows in the fully written extracted file.
async fn count_rows(extracted_path: &Path) -> Result<u64, IngestError> {
    let file = File::open(extracted_path)
        .await
        .map_err(|err| IngestError::Filesystem(err.to_string()))?;
    let mut reader = BufReader::with_capacity(DECODE_BUFFER_BYTES, file);
    count_logical_lines(&mut reader).await.map_err(|err| IngestError::Filesystem(err.to_string()))
}

// ============================================================================
// SECTION: Cleanup
// ============================================================================

/// Lowers an extraction copy failure into the pipeline taxonomy.
///
/// Both ends of the extraction copy are local, so a non-corrupt failure is a
/// filesystem problem rather than a transport one.
fn lower_extract_error(err: &io::Error) -> IngestError {
    if is_corrupt_kind(err) {
        IngestError::CorruptStream(err.to_string())
    } else {
        IngestError::Filesystem(err.to_string())
    }
}

/// Removes a partial artifact, logging (not failing) when removal is refused.
async fn remove_artifact(path: &Path) {
    if let Err(err) = fs::remove_file(path).await
        && err.kind() != io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %err, "failed to remove partial artifact");
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
