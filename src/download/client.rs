//! HTTP client wrapper for streaming chunked downloads.
//!
//! This module provides the `HttpClient` struct which streams a response body
//! into a caller-supplied sink in bounded chunks, with a synchronous progress
//! callback between every chunk write and the next read.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::DownloadError;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large release archives).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// User-Agent for installer requests (identifies the tool).
fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("relayup/{version}")
}

/// Progress report for a single downloaded chunk.
///
/// Delivered to the chunk callback once per chunk actually written, in
/// order, strictly after the chunk hits the sink and strictly before the
/// next read is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkProgress {
    /// Size of this chunk in bytes. Always `> 0` and `<= buffer_size`.
    pub chunk_len: usize,
    /// Running total of bytes written to the sink, this chunk included.
    pub bytes_so_far: u64,
    /// Content length declared by the server for the whole body.
    pub content_length: u64,
}

/// Connection options applied per client, not process-wide.
///
/// The TLS floor lives here so that one client's negotiation policy can
/// never leak into another's.
#[derive(Debug, Clone)]
pub struct HttpClientOptions {
    /// Connect timeout for the initial request.
    pub connect_timeout: Duration,
    /// Overall read timeout for the response body.
    pub read_timeout: Duration,
    /// Minimum accepted TLS protocol version.
    pub min_tls_version: reqwest::tls::Version,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            min_tls_version: reqwest::tls::Version::TLS_1_2,
        }
    }
}

/// HTTP client for streaming downloads into a sink.
///
/// Designed to be created once and reused, taking advantage of connection
/// pooling. The client never closes a sink it did not open: callers of
/// [`download_to_sink`](Self::download_to_sink) own the sink's lifecycle on
/// both the empty-body and data paths; the client only flushes.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default options (TLS 1.2 floor,
    /// 30s connect / 5min read timeouts).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(HttpClientOptions::default())
    }

    /// Creates a new HTTP client with explicit connection options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_options(options: HttpClientOptions) -> Self {
        let client = Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.read_timeout)
            .min_tls_version(options.min_tls_version)
            .gzip(true)
            .user_agent(default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Streams the body of `url` into `sink` in chunks of at most
    /// `buffer_size` bytes, invoking `on_chunk` after each chunk is written
    /// and before the next read.
    ///
    /// When the server declares no body (content length absent or zero) the
    /// call succeeds trivially with `Ok(0)`: no chunk callback fires and the
    /// sink is left untouched, not even flushed. On the data path the sink
    /// is flushed after the final chunk. It is never closed on either path;
    /// the caller owns it.
    ///
    /// # Returns
    ///
    /// Total bytes written to the sink.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - `buffer_size` is zero (no network call is made)
    /// - The URL is invalid (no network call is made)
    /// - Connecting fails or times out
    /// - The server returns an error status (4xx, 5xx)
    /// - Reading the body or writing to the sink fails
    ///
    /// No failure is retried here; retry policy belongs to the caller.
    #[instrument(level = "debug", skip(self, sink, on_chunk), fields(url = %url))]
    pub async fn download_to_sink<W, F>(
        &self,
        url: &str,
        sink: &mut W,
        buffer_size: usize,
        mut on_chunk: F,
    ) -> Result<u64, DownloadError>
    where
        W: AsyncWrite + Unpin,
        F: FnMut(ChunkProgress),
    {
        if buffer_size == 0 {
            return Err(DownloadError::InvalidBufferSize);
        }
        let parsed_url =
            Url::parse(url).map_err(|_| DownloadError::invalid_url(url.to_string()))?;

        let response = self.client.get(parsed_url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::connect(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let content_length = response.content_length().unwrap_or(0);
        if content_length == 0 {
            debug!("server declared no body; nothing to write");
            return Ok(0);
        }

        let mut stream = response.bytes_stream();
        let mut bytes_so_far: u64 = 0;

        while let Some(chunk_result) = stream.next().await {
            let bytes = chunk_result.map_err(|e| {
                if e.is_timeout() {
                    DownloadError::timeout(url)
                } else {
                    DownloadError::read(url, e)
                }
            })?;

            // Transport chunks arrive in arbitrary sizes; re-slice so each
            // reported chunk is at most buffer_size bytes.
            for piece in bytes.chunks(buffer_size) {
                sink.write_all(piece).await.map_err(DownloadError::sink)?;
                bytes_so_far += piece.len() as u64;
                on_chunk(ChunkProgress {
                    chunk_len: piece.len(),
                    bytes_so_far,
                    content_length,
                });
            }
        }

        sink.flush().await.map_err(DownloadError::sink)?;

        debug!(bytes = bytes_so_far, "body exhausted");
        Ok(bytes_so_far)
    }

    /// Downloads `url` into a fresh file at `path` (created or truncated),
    /// buffering writes and flushing on completion.
    ///
    /// Unlike [`download_to_sink`](Self::download_to_sink), this method owns
    /// the file it opens and closes it on both paths. A partial file is
    /// removed if the transfer fails.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`download_to_sink`](Self::download_to_sink),
    /// plus `DownloadError::Io` if the file cannot be created.
    #[must_use = "download result contains the number of bytes written"]
    #[instrument(skip(self, on_chunk), fields(url = %url, path = %path.display()))]
    pub async fn download_to_file<F>(
        &self,
        url: &str,
        path: &Path,
        buffer_size: usize,
        on_chunk: F,
    ) -> Result<u64, DownloadError>
    where
        F: FnMut(ChunkProgress),
    {
        let file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        let mut writer = BufWriter::new(file);

        let result = self
            .download_to_sink(url, &mut writer, buffer_size, on_chunk)
            .await;

        match result {
            Ok(bytes) => {
                // This method opened the file, so it closes it.
                writer
                    .shutdown()
                    .await
                    .map_err(|e| DownloadError::io(path, e))?;
                info!(bytes, "download complete");
                Ok(bytes)
            }
            Err(error) => {
                drop(writer);
                debug!("cleaning up partial file after error");
                let _ = tokio::fs::remove_file(path).await;
                Err(error)
            }
        }
    }
}
