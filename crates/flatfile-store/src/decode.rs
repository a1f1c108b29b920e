// crates/flatfile-store/src/decode.rs
// ============================================================================
// Module: Streaming Decoder
// Description: Suffix-selected decompression and logical-line reading.
// Purpose: Give preview and import one bounded-memory view of object bytes.
// Dependencies: async-compression, tokio
// ============================================================================

//! ## Overview
//! Decompression is selected purely by the object key's name: a `.gz` suffix
//! routes the byte stream through a streaming gzip stage, anything else
//! passes through untouched. The branch is kept inspectable as the tagged
//! [`DecodedStream`] so both variants can be exercised directly. A non-gzip
//! body under the suffix fails at read time, not at open time.
//!
//! Logical lines terminate at CR, LF, or CRLF; a final line without a
//! terminator still counts. This module never manages stream lifecycle;
//! consumers own their reader and release it by dropping it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use async_compression::tokio::bufread::GzipDecoder;
use flatfile_core::IngestError;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::BufReader;
use tokio::io::ReadBuf;
use tracing::debug;

use crate::client::ObjectReader;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Filename suffix selecting the decompression stage.
pub const COMPRESSED_SUFFIX: &str = ".gz";
/// Buffer capacity applied to the decompression stage.
pub(crate) const DECODE_BUFFER_BYTES: usize = 8192;

// ============================================================================
// SECTION: Suffix Dispatch
// ============================================================================

/// Returns whether a key selects the decompression stage.
#[must_use]
pub fn is_compressed_key(key: &str) -> bool {
    key.ends_with(COMPRESSED_SUFFIX)
}

/// Object byte stream, tagged by whether a decompression stage is attached.
pub enum DecodedStream {
    /// Raw object bytes, passed through untouched.
    Plain(ObjectReader),
    /// Object bytes routed through a streaming gzip stage.
    Gzip(BufReader<GzipDecoder<ObjectReader>>),
}

impl DecodedStream {
    /// Wraps a raw object stream, attaching gzip decoding when the key ends
    /// in [`COMPRESSED_SUFFIX`].
    #[must_use]
    pub fn open(key: &str, reader: ObjectReader) -> Self {
        if is_compressed_key(key) {
            debug!(key, "opening object stream through gzip stage");
            Self::Gzip(BufReader::with_capacity(DECODE_BUFFER_BYTES, GzipDecoder::new(reader)))
        } else {
            debug!(key, "opening object stream as plain bytes");
            Self::Plain(reader)
        }
    }

    /// Returns whether reads pass through the decompression stage.
    #[must_use]
    pub const fn compressed(&self) -> bool {
        matches!(self, Self::Gzip(_))
    }
}

impl AsyncRead for DecodedStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(reader) => Pin::new(reader).poll_read(cx, buf),
            Self::Gzip(reader) => Pin::new(reader).poll_read(cx, buf),
        }
    }
}

impl AsyncBufRead for DecodedStream {
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        match self.get_mut() {
            Self::Plain(reader) => Pin::new(reader).poll_fill_buf(cx),
            Self::Gzip(reader) => Pin::new(reader).poll_fill_buf(cx),
        }
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        match self.get_mut() {
            Self::Plain(reader) => Pin::new(reader).consume(amt),
            Self::Gzip(reader) => Pin::new(reader).consume(amt),
        }
    }
}

// ============================================================================
// SECTION: Error Classification
// ============================================================================

/// Returns whether an I/O error indicates a corrupt compressed body.
pub(crate) fn is_corrupt_kind(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof
    )
}

/// Lowers a stream read failure into the pipeline taxonomy.
///
/// Decode failures only exist on compressed streams; everything else is a
/// transport-level read failure.
pub(crate) fn classify_read_error(err: &io::Error, compressed: bool) -> IngestError {
    if compressed && is_corrupt_kind(err) {
        IngestError::CorruptStream(err.to_string())
    } else {
        IngestError::StreamRead(err.to_string())
    }
}

// ============================================================================
// SECTION: Logical Lines
// ============================================================================

/// Outcome of scanning one buffered chunk for a line terminator.
enum Scan {
    /// No terminator yet; the whole chunk belongs to the current line.
    Partial(usize),
    /// Line terminated within the chunk.
    Done(usize),
    /// Line terminated by a CR that ends the chunk; a following LF (if any)
    /// still belongs to this terminator.
    DoneCrAtEnd(usize),
}

/// Reads the next logical line, treating CR, LF, and CRLF as terminators.
///
/// Returns `Ok(None)` at end of stream. A final line without a trailing
/// terminator is still returned. Content is decoded lossily, so a preview of
/// non-UTF-8 bytes degrades instead of failing. A CRLF pair split across
/// read chunks counts as a single terminator.
///
/// # Errors
///
/// Returns the underlying I/O error, or one with a descriptive message when
/// a single line exceeds `max_bytes`.
pub async fn read_logical_line<R>(reader: &mut R, max_bytes: usize) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line: Vec<u8> = Vec::new();
    loop {
        let scan = {
            let chunk = reader.fill_buf().await?;
            if chunk.is_empty() {
                if line.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }
            match chunk.iter().position(|byte| *byte == b'\n' || *byte == b'\r') {
                None => {
                    line.extend_from_slice(chunk);
                    Scan::Partial(chunk.len())
                }
                Some(at) => {
                    line.extend_from_slice(&chunk[.. at]);
                    if chunk[at] == b'\n' {
                        Scan::Done(at + 1)
                    } else if at + 1 < chunk.len() {
                        let consumed = if chunk[at + 1] == b'\n' { at + 2 } else { at + 1 };
                        Scan::Done(consumed)
                    } else {
                        Scan::DoneCrAtEnd(at + 1)
                    }
                }
            }
        };
        if line.len() > max_bytes {
            return Err(io::Error::other("line exceeds length limit"));
        }
        match scan {
            Scan::Partial(consumed) => reader.consume(consumed),
            Scan::Done(consumed) => {
                reader.consume(consumed);
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }
            Scan::DoneCrAtEnd(consumed) => {
                reader.consume(consumed);
                let next = reader.fill_buf().await?;
                if next.first() == Some(&b'\n') {
                    reader.consume(1);
                }
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }
        }
    }
}

/// Counts logical lines without retaining any content.
///
/// Terminator handling matches [`read_logical_line`]; memory use is bounded
/// by the reader's buffer alone.
///
/// # Errors
///
/// Returns the underlying I/O error.
pub async fn count_logical_lines<R>(reader: &mut R) -> io::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut count: u64 = 0;
    let mut open_line = false;
    let mut last_was_cr = false;
    loop {
        let chunk_len = {
            let chunk = reader.fill_buf().await?;
            if chunk.is_empty() {
                if open_line {
                    count += 1;
                }
                return Ok(count);
            }
            for byte in chunk {
                match *byte {
                    b'\n' => {
                        // An LF right after a CR closes the same terminator.
                        if !last_was_cr {
                            count += 1;
                        }
                        last_was_cr = false;
                        open_line = false;
                    }
                    b'\r' => {
                        count += 1;
                        last_was_cr = true;
                        open_line = false;
                    }
                    _ => {
                        last_was_cr = false;
                        open_line = true;
                    }
                }
            }
            chunk.len()
        };
        reader.consume(chunk_len);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
