// crates/flatfile-store/src/testkit.rs
// ============================================================================
// Module: Test Support
// Description: In-memory store double and stream fixtures for unit tests.
// Purpose: Assert call counts, handle release, and chunk-boundary behavior.
// Dependencies: async-compression, async-trait, tokio
// ============================================================================

//! ## Overview
//! [`InMemoryStoreClient`] implements [`ObjectStoreClient`] over a sorted
//! map, records how often each operation was invoked (so tests can prove an
//! operation never reached the store), and counts open reader handles
//! through a drop-tracking wrapper (so tests can prove streams are released
//! on every exit path). [`SplitReader`] caps chunk sizes to exercise
//! terminators straddling read boundaries, and [`FailingStoreClient`] yields
//! a body prefix before erroring mid-stream.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only helpers favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::task::Context;
use std::task::Poll;
use std::time::Duration;

use async_compression::tokio::bufread::GzipEncoder;
use async_trait::async_trait;
use flatfile_core::IngestError;
use flatfile_core::ListingPage;
use flatfile_core::ObjectSummary;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::ReadBuf;

use crate::client::ObjectReader;
use crate::client::ObjectStoreClient;

// ============================================================================
// SECTION: In-Memory Store Client
// ============================================================================

/// In-memory [`ObjectStoreClient`] double with call and handle accounting.
#[derive(Debug)]
pub(crate) struct InMemoryStoreClient {
    /// Objects by key, lexicographically ordered like the real store.
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    /// Number of listing calls served.
    list_calls: AtomicUsize,
    /// Number of presign calls served.
    presign_calls: AtomicUsize,
    /// Number of open calls served.
    open_calls: AtomicUsize,
    /// Readers currently alive (incremented on open, decremented on drop).
    open_handles: Arc<AtomicUsize>,
}

impl InMemoryStoreClient {
    /// Creates an empty store.
    pub(crate) fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            list_calls: AtomicUsize::new(0),
            presign_calls: AtomicUsize::new(0),
            open_calls: AtomicUsize::new(0),
            open_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a store pre-populated with the given objects.
    pub(crate) fn with_objects(entries: &[(&str, &[u8])]) -> Self {
        let store = Self::new();
        for (key, bytes) in entries {
            store.insert(key, bytes.to_vec());
        }
        store
    }

    /// Inserts or replaces one object.
    pub(crate) fn insert(&self, key: &str, bytes: Vec<u8>) {
        self.objects.lock().expect("store lock").insert(key.to_string(), bytes);
    }

    /// Returns the number of listing calls served so far.
    pub(crate) fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Returns the number of presign calls served so far.
    pub(crate) fn presign_call_count(&self) -> usize {
        self.presign_calls.load(Ordering::SeqCst)
    }

    /// Returns the number of open calls served so far.
    pub(crate) fn open_call_count(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }

    /// Returns the number of reader handles currently alive.
    pub(crate) fn open_handle_count(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStoreClient for InMemoryStoreClient {
    async fn list(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> Result<ListingPage, IngestError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let objects = self.objects.lock().expect("store lock");
        let mut matching: Vec<(&String, &Vec<u8>)> =
            objects.iter().filter(|(key, _)| key.starts_with(prefix)).collect();
        if let Some(token) = continuation_token {
            matching.retain(|(key, _)| key.as_str() > token);
        }
        let limit = usize::try_from(max_keys).unwrap_or(0);
        let truncated = matching.len() > limit;
        matching.truncate(limit);
        let token = if truncated {
            matching.last().map(|(key, _)| (*key).clone())
        } else {
            None
        };
        let items = matching
            .into_iter()
            .map(|(key, bytes)| ObjectSummary {
                key: key.clone(),
                last_modified: Some("2024-01-15T08:30:00Z".to_string()),
                size: Some(i64::try_from(bytes.len()).unwrap_or(i64::MAX)),
                storage_class: Some("STANDARD".to_string()),
            })
            .collect();
        Ok(ListingPage::new(items, token))
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, IngestError> {
        self.presign_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("memory://bucket/{key}?expires_in={}", expires_in.as_secs()))
    }

    async fn open(&self, key: &str) -> Result<ObjectReader, IngestError> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        let bytes = self
            .objects
            .lock()
            .expect("store lock")
            .get(key)
            .cloned()
            .ok_or_else(|| IngestError::NotFound {
                key: key.to_string(),
            })?;
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedReader {
            inner: Cursor::new(bytes),
            open_handles: Arc::clone(&self.open_handles),
        }))
    }
}

// ============================================================================
// SECTION: Tracked Reader
// ============================================================================

/// Reader wrapper that decrements the live-handle counter on drop.
struct TrackedReader {
    /// Buffered object bytes.
    inner: Cursor<Vec<u8>>,
    /// Live-handle counter shared with the owning store.
    open_handles: Arc<AtomicUsize>,
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AsyncRead for TrackedReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl AsyncBufRead for TrackedReader {
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        Pin::new(&mut self.get_mut().inner).poll_fill_buf(cx)
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        Pin::new(&mut self.get_mut().inner).consume(amt);
    }
}

// ============================================================================
// SECTION: Failing Store Client
// ============================================================================

/// Store double whose object bodies fail partway through.
#[derive(Debug)]
pub(crate) struct FailingStoreClient {
    /// Bytes yielded before the mid-stream failure.
    body_prefix: Vec<u8>,
}

impl FailingStoreClient {
    /// Creates a client that yields `body_prefix` and then errors.
    pub(crate) fn new(body_prefix: &[u8]) -> Self {
        Self {
            body_prefix: body_prefix.to_vec(),
        }
    }
}

#[async_trait]
impl ObjectStoreClient for FailingStoreClient {
    async fn list(
        &self,
        _prefix: &str,
        _continuation_token: Option<&str>,
        _max_keys: i32,
    ) -> Result<ListingPage, IngestError> {
        Err(IngestError::Store("listing unavailable".to_string()))
    }

    async fn presign_get(&self, _key: &str, _expires_in: Duration) -> Result<String, IngestError> {
        Err(IngestError::Store("signing unavailable".to_string()))
    }

    async fn open(&self, _key: &str) -> Result<ObjectReader, IngestError> {
        Ok(Box::new(FailingReader {
            remaining: self.body_prefix.clone(),
        }))
    }
}

/// Reader that serves a prefix and then reports a connection reset.
struct FailingReader {
    /// Bytes not yet served.
    remaining: Vec<u8>,
}

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.remaining.is_empty() {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset mid-body",
            )));
        }
        let take = this.remaining.len().min(buf.remaining());
        let served: Vec<u8> = this.remaining.drain(.. take).collect();
        buf.put_slice(&served);
        Poll::Ready(Ok(()))
    }
}

impl AsyncBufRead for FailingReader {
    fn poll_fill_buf(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        let this = self.get_mut();
        if this.remaining.is_empty() {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset mid-body",
            )));
        }
        Poll::Ready(Ok(this.remaining.as_slice()))
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        drop(self.get_mut().remaining.drain(.. amt));
    }
}

// ============================================================================
// SECTION: Chunked Reader
// ============================================================================

/// Reader that never yields more than `chunk` bytes per fill.
///
/// Used to exercise terminators straddling read-chunk boundaries.
pub(crate) struct SplitReader {
    /// Full backing data.
    data: Vec<u8>,
    /// Read position.
    pos: usize,
    /// Maximum bytes exposed per fill.
    chunk: usize,
}

impl SplitReader {
    /// Creates a reader over `data` yielding at most `chunk` bytes per fill.
    pub(crate) fn new(data: &[u8], chunk: usize) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            chunk: chunk.max(1),
        }
    }
}

impl AsyncRead for SplitReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let end = (this.pos + this.chunk).min(this.data.len());
        let take = (end - this.pos).min(buf.remaining());
        buf.put_slice(&this.data[this.pos .. this.pos + take]);
        this.pos += take;
        Poll::Ready(Ok(()))
    }
}

impl AsyncBufRead for SplitReader {
    fn poll_fill_buf(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        let this = self.get_mut();
        let end = (this.pos + this.chunk).min(this.data.len());
        Poll::Ready(Ok(&this.data[this.pos .. end]))
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        self.get_mut().pos += amt;
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Gzip-compresses a byte slice for compressed-object fixtures.
pub(crate) async fn gzip_bytes(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzipEncoder::new(data);
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).await.expect("gzip fixture");
    compressed
}

/// Builds a newline-terminated body of `count` numbered lines.
pub(crate) fn numbered_lines(count: usize) -> Vec<u8> {
    let mut body = String::new();
    for index in 0 .. count {
        body.push_str(&format!("line-{index}\n"));
    }
    body.into_bytes()
}
