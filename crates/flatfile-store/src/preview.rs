// crates/flatfile-store/src/preview.rs
// ============================================================================
// Module: Preview Engine
// Description: Bounded sampling of an object's leading lines.
// Purpose: Inspect candidates without downloading or draining whole objects.
// Dependencies: flatfile-core, tokio
// ============================================================================

//! ## Overview
//! Reads logical lines until the requested budget is met or the stream ends,
//! whichever comes first. The decoded stream is owned by this operation and
//! dropped on every exit path (success, early truncation, and error alike),
//! which tears down the underlying transfer instead of draining it. Errors
//! discard any partial sample; the operation is all-or-nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use flatfile_core::IngestError;
use flatfile_core::PreviewResult;
use flatfile_core::clamp_preview_lines;
use tracing::debug;

use crate::client::ObjectStoreClient;
use crate::decode::DecodedStream;
use crate::decode::classify_read_error;
use crate::decode::read_logical_line;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Upper bound on a single sampled line, keeping previews memory-bounded.
const MAX_SAMPLE_LINE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Samples the leading lines of one flat file.
///
/// `max_lines` is clamped to `[1, 50]` (default 10). CR, LF, and CRLF all
/// terminate a logical line; a final unterminated line still counts. The
/// result's `total_lines_read` always equals `sample.len()`.
///
/// # Errors
///
/// Returns [`IngestError::InvalidArgument`] for an empty key,
/// [`IngestError::NotFound`] / [`IngestError::Store`] when the object cannot
/// be opened, [`IngestError::CorruptStream`] when decompression fails, and
/// [`IngestError::StreamRead`] for transport failures mid-body.
pub async fn preview_flat_file(
    client: &dyn ObjectStoreClient,
    object_key: &str,
    max_lines: Option<usize>,
) -> Result<PreviewResult, IngestError> {
    let key = object_key.trim();
    if key.is_empty() {
        return Err(IngestError::InvalidArgument("object key must be set".to_string()));
    }
    let limit = clamp_preview_lines(max_lines);
    let reader = client.open(key).await?;
    let mut stream = DecodedStream::open(key, reader);
    let compressed = stream.compressed();
    let mut sample = Vec::with_capacity(limit);
    let mut total_lines_read: u64 = 0;
    while sample.len() < limit {
        match read_logical_line(&mut stream, MAX_SAMPLE_LINE_BYTES).await {
            Ok(Some(line)) => {
                total_lines_read += 1;
                sample.push(line);
            }
            Ok(None) => break,
            Err(err) => return Err(classify_read_error(&err, compressed)),
        }
    }
    debug!(key, lines = total_lines_read, compressed, "sampled flat file");
    Ok(PreviewResult {
        object_key: key.to_string(),
        total_lines_read,
        sample,
        compressed,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
