//! Error types for the download module.
//!
//! Transfer failures carry the stage at which they occurred (connect, read,
//! write) in the variant itself, so callers and logs can distinguish a
//! refused connection from a mid-body read failure or a full disk.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while streaming a file download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The caller supplied a zero chunk buffer size.
    #[error("buffer size must be greater than zero")]
    InvalidBufferSize,

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Connection-stage failure (DNS resolution, refused connection, TLS
    /// negotiation below the configured floor, etc.)
    #[error("connect failed for {url}: {source}")]
    Connect {
        /// The URL that failed to connect.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Read-stage failure while streaming the response body.
    #[error("read failed for {url}: {source}")]
    Read {
        /// The URL whose body failed mid-stream.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Write-stage failure while writing a chunk to the output sink.
    #[error("write to download sink failed: {source}")]
    Sink {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// File system error around the download file itself (create, remove).
    #[error("IO error at {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a connect-stage error from a reqwest error.
    pub fn connect(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Connect {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a read-stage error from a reqwest error.
    pub fn read(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Read {
            url: url.into(),
            source,
        }
    }

    /// Creates a write-stage (sink) error.
    pub fn sink(source: std::io::Error) -> Self {
        Self::Sink { source }
    }

    /// Creates an IO error tied to the download file path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` or
// `From<std::io::Error>` because the variants require context (url, path,
// stage) that the source errors don't provide. The helper constructors are
// the pattern here: callers supply the missing context at the call site.
