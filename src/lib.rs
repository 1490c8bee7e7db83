//! Relayup Core Library
//!
//! This library implements the download-and-install pipeline for the relay
//! self-updating installer: stream the packaged release archive over HTTPS,
//! unpack it, stage the validated tree into the per-user installation
//! directory, and register the installed binaries on the user's search path.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`download`] - Chunked HTTP download with streaming and progress callbacks
//! - [`archive`] - Zip extraction into a pre-existing empty directory
//! - [`stage`] - Two-phase directory mirroring (directories first, then files)
//! - [`install`] - Orchestration of download → extract → validate → stage → register
//! - [`pathenv`] - Idempotent search-path variable registration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod download;
pub mod install;
pub mod pathenv;
pub mod stage;

// Re-export commonly used types
pub use archive::{ArchiveError, extract_zip};
pub use download::{ChunkProgress, DownloadError, HttpClient, HttpClientOptions};
pub use install::{
    DEFAULT_BUFFER_SIZE, EXIT_MISSING_REQUIRED_DIR, EXIT_SUCCESS, InstallError, InstallLayout,
    InstallReport, Installer, ReplaceStrategy,
};
pub use pathenv::{
    PathEnvError, PathStore, ProcessEnvStore, SEARCH_PATH_VAR, ensure_on_search_path,
};
pub use stage::{StageError, mirror};
