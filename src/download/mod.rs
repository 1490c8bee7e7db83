//! Chunked HTTP download with streaming support.
//!
//! This module streams a remote file into a caller-supplied sink in bounded
//! chunks, invoking a progress callback synchronously after each chunk is
//! written and before the next read. Memory use is bounded by the chunk size;
//! the body is never buffered whole.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large release archives)
//! - Per-chunk progress callback with running total and declared length
//! - Per-client TLS floor (1.2 by default) and timeout configuration
//! - Structured error types identifying the failing stage (connect/read/write)
//!
//! # Example
//!
//! ```no_run
//! use relayup::download::HttpClient;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let bytes = client
//!     .download_to_file(
//!         "https://example.com/release.zip",
//!         Path::new("/tmp/release.zip"),
//!         16 * 1024,
//!         |progress| println!("{}/{}", progress.bytes_so_far, progress.content_length),
//!     )
//!     .await?;
//! println!("Downloaded {bytes} bytes");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{ChunkProgress, HttpClient, HttpClientOptions};
pub use error::DownloadError;

// Note: no module-local Result aliases. Use `Result<T, DownloadError>`
// explicitly in function signatures.
