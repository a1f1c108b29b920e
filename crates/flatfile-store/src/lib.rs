// crates/flatfile-store/src/lib.rs
// ============================================================================
// Module: Flat-File Store Library
// Description: Remote flat-file ingestion pipeline over an object store.
// Purpose: Expose listing, grants, streaming preview, and local import.
// Dependencies: crate::{client, decode, import, listing, presign, preview}
// ============================================================================

//! ## Overview
//! The ingestion pipeline: enumerate objects in a remote bucket, issue
//! time-bounded download grants, sample object contents through an optional
//! gzip stage without unbounded memory, and materialize objects locally with
//! row accounting. All components share one lazily constructed store client;
//! none hold cross-request state beyond it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod decode;
pub mod import;
pub mod listing;
pub mod presign;
pub mod preview;
pub mod service;
#[cfg(test)]
pub(crate) mod testkit;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::ObjectReader;
pub use client::ObjectStoreClient;
pub use client::S3StoreClient;
pub use client::SharedStoreClient;
pub use decode::COMPRESSED_SUFFIX;
pub use decode::DecodedStream;
pub use decode::count_logical_lines;
pub use decode::is_compressed_key;
pub use decode::read_logical_line;
pub use import::import_flat_file;
pub use listing::list_flat_files;
pub use presign::download_url;
pub use preview::preview_flat_file;
pub use service::FlatFileService;
