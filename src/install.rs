//! Installation orchestration.
//!
//! [`Installer::run`] drives the pipeline as a linear sequence with no
//! retries: download the release archive into a fresh temporary file,
//! extract it into a reset temporary directory, validate that the required
//! executables directory came out of the archive, stage the tree into the
//! final installation directory, and register the bin directory on the
//! user's search path. The first failure aborts the remaining steps.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::archive::{self, ArchiveError};
use crate::download::{ChunkProgress, DownloadError, HttpClient};
use crate::pathenv::{self, PathEnvError, PathStore, SEARCH_PATH_VAR};
use crate::stage::{self, StageError};

/// Process exit code for a completed installation.
pub const EXIT_SUCCESS: i32 = 0;

/// Process exit code when the extracted archive lacks the required
/// executables directory. Distinct sentinel so callers can tell a bad
/// archive from an environment failure.
pub const EXIT_MISSING_REQUIRED_DIR: i32 = 5000;

/// Process exit code for all other failures.
const EXIT_FAILURE: i32 = 1;

/// Default chunk buffer size for the archive download (16 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Subdirectory the extracted archive must contain.
pub const DEFAULT_REQUIRED_SUBDIR: &str = "bin";

/// Paths owned by one installation run.
///
/// `download_path` and `extract_dir` are created fresh for each run; any
/// pre-existing entity at the same location is destroyed first. Nothing
/// survives across runs except the user's search-path variable.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    /// URL of the packaged release archive.
    pub archive_url: String,
    /// Temporary file the archive is downloaded into.
    pub download_path: PathBuf,
    /// Temporary directory the archive is extracted into.
    pub extract_dir: PathBuf,
    /// Final installation directory.
    pub install_dir: PathBuf,
    /// Subdirectory that must exist under the extracted root (and that is
    /// registered on the search path under the installation directory).
    pub required_subdir: String,
}

impl InstallLayout {
    /// Creates a layout with temporary paths under the OS temp directory
    /// and the default required subdirectory.
    #[must_use]
    pub fn new(archive_url: impl Into<String>, install_dir: impl Into<PathBuf>) -> Self {
        let tmp = std::env::temp_dir();
        Self {
            archive_url: archive_url.into(),
            download_path: tmp.join("relay-download.zip"),
            extract_dir: tmp.join("relay-extract"),
            install_dir: install_dir.into(),
            required_subdir: DEFAULT_REQUIRED_SUBDIR.to_string(),
        }
    }

    /// Creates a layout installing into the per-user local application-data
    /// directory. `None` when no home directory can be determined.
    #[must_use]
    pub fn in_user_data_dir(archive_url: impl Into<String>) -> Option<Self> {
        let base = directories::BaseDirs::new()?;
        Some(Self::new(
            archive_url,
            base.data_local_dir().join("relay"),
        ))
    }

    /// Directory registered on the search path after staging.
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.install_dir.join(&self.required_subdir)
    }
}

/// How the final installation directory is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplaceStrategy {
    /// Mirror into a sibling staging directory, then swap it into the final
    /// location with a single rename once fully staged. The previous
    /// installation stays intact until the new tree is complete.
    #[default]
    StagedSwap,
    /// Legacy mode: delete and recreate the final directory, then mirror
    /// directly into it. A failure mid-copy can leave the installation
    /// empty or partially populated.
    InPlace,
}

/// Summary of a completed installation run.
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Bytes streamed for the release archive.
    pub bytes_downloaded: u64,
    /// Where the release was installed.
    pub install_dir: PathBuf,
    /// Whether the search-path variable was rewritten (false when the bin
    /// directory was already registered).
    pub path_updated: bool,
}

/// Errors that can occur during an installation run.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The archive download failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The downloaded archive could not be extracted.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Staging into the installation directory failed.
    #[error(transparent)]
    Stage(#[from] StageError),

    /// The extracted archive lacks the required executables directory.
    #[error("required directory missing after extraction: {path}")]
    MissingRequiredDir {
        /// The expected directory that was not found.
        path: PathBuf,
    },

    /// The search-path variable could not be read or rewritten.
    #[error(transparent)]
    PathEnv(#[from] PathEnvError),

    /// File system error while preparing or swapping run directories.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A blocking filesystem task was cancelled or panicked.
    #[error("background task failed: {source}")]
    Task {
        /// The underlying join error.
        #[source]
        source: tokio::task::JoinError,
    },
}

impl InstallError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Maps this failure to the process exit code contract: `5000` for a
    /// missing required directory, `1` for everything else.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingRequiredDir { .. } => EXIT_MISSING_REQUIRED_DIR,
            _ => EXIT_FAILURE,
        }
    }
}

/// Drives one installation run end to end.
#[derive(Debug)]
pub struct Installer {
    client: HttpClient,
    layout: InstallLayout,
    strategy: ReplaceStrategy,
    buffer_size: usize,
}

impl Installer {
    /// Creates an installer with the default staged-swap strategy and
    /// download buffer size.
    #[must_use]
    pub fn new(client: HttpClient, layout: InstallLayout) -> Self {
        Self {
            client,
            layout,
            strategy: ReplaceStrategy::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Overrides the replacement strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ReplaceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Overrides the download chunk buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Runs the pipeline: download → extract → validate → stage → register.
    ///
    /// `on_chunk` observes download progress; `store` receives the
    /// search-path update. Neither the existing installation nor the
    /// variable is touched when validation fails.
    ///
    /// # Errors
    ///
    /// Returns the first step's failure; remaining steps are not attempted
    /// and nothing is retried. [`InstallError::exit_code`] maps the failure
    /// to the process exit contract.
    #[instrument(skip(self, store, on_chunk), fields(url = %self.layout.archive_url))]
    pub async fn run(
        &self,
        store: &mut dyn PathStore,
        on_chunk: impl FnMut(ChunkProgress),
    ) -> Result<InstallReport, InstallError> {
        info!(path = %self.layout.download_path.display(), "downloading release archive");
        let bytes_downloaded = self
            .client
            .download_to_file(
                &self.layout.archive_url,
                &self.layout.download_path,
                self.buffer_size,
                on_chunk,
            )
            .await?;

        info!(dir = %self.layout.extract_dir.display(), "extracting archive");
        reset_dir(&self.layout.extract_dir).await?;
        run_blocking({
            let archive_path = self.layout.download_path.clone();
            let extract_dir = self.layout.extract_dir.clone();
            move || archive::extract_zip(&archive_path, &extract_dir)
        })
        .await??;

        let required = self.layout.extract_dir.join(&self.layout.required_subdir);
        if !required.is_dir() {
            warn!(path = %required.display(), "extracted archive lacks required directory");
            return Err(InstallError::MissingRequiredDir { path: required });
        }

        info!(dir = %self.layout.install_dir.display(), strategy = ?self.strategy, "staging installation");
        match self.strategy {
            ReplaceStrategy::StagedSwap => self.stage_with_swap().await?,
            ReplaceStrategy::InPlace => self.stage_in_place().await?,
        }

        let bin_dir = self.layout.bin_dir();
        let path_updated = pathenv::ensure_on_search_path(store, SEARCH_PATH_VAR, &bin_dir)?;

        self.cleanup_temp_artifacts().await;

        info!(dir = %self.layout.install_dir.display(), "installation complete");
        Ok(InstallReport {
            bytes_downloaded,
            install_dir: self.layout.install_dir.clone(),
            path_updated,
        })
    }

    /// Mirrors into a sibling staging directory, then swaps it into place
    /// with a single rename. The old installation is removed only after the
    /// new tree is fully staged; a failed attempt removes the staging
    /// directory it created.
    async fn stage_with_swap(&self) -> Result<(), InstallError> {
        let staging = staging_dir_for(&self.layout.install_dir);
        let result = self.stage_and_rename(&staging).await;
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_dir_all(&staging).await {
                debug!(path = %staging.display(), error = %e, "staging dir not removed");
            }
        }
        result
    }

    async fn stage_and_rename(&self, staging: &Path) -> Result<(), InstallError> {
        reset_dir(staging).await?;
        run_blocking({
            let source = self.layout.extract_dir.clone();
            let dest = staging.to_path_buf();
            move || stage::mirror(&source, &dest)
        })
        .await??;

        if let Some(parent) = self.layout.install_dir.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InstallError::io(parent, e))?;
        }
        match tokio::fs::remove_dir_all(&self.layout.install_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(InstallError::io(&self.layout.install_dir, e)),
        }
        tokio::fs::rename(staging, &self.layout.install_dir)
            .await
            .map_err(|e| InstallError::io(&self.layout.install_dir, e))
    }

    /// Legacy destructive replace: reset the installation directory and
    /// mirror straight into it.
    async fn stage_in_place(&self) -> Result<(), InstallError> {
        reset_dir(&self.layout.install_dir).await?;
        run_blocking({
            let source = self.layout.extract_dir.clone();
            let dest = self.layout.install_dir.clone();
            move || stage::mirror(&source, &dest)
        })
        .await?
        .map_err(InstallError::from)
    }

    /// Best-effort removal of the run's temporary artifacts.
    async fn cleanup_temp_artifacts(&self) {
        if let Err(e) = tokio::fs::remove_file(&self.layout.download_path).await {
            debug!(path = %self.layout.download_path.display(), error = %e, "temp file not removed");
        }
        if let Err(e) = tokio::fs::remove_dir_all(&self.layout.extract_dir).await {
            debug!(path = %self.layout.extract_dir.display(), error = %e, "temp dir not removed");
        }
    }
}

/// Sibling staging directory for the staged-swap strategy.
fn staging_dir_for(install_dir: &Path) -> PathBuf {
    let mut name = install_dir
        .file_name()
        .map_or_else(|| std::ffi::OsString::from("install"), ToOwned::to_owned);
    name.push(".staging");
    install_dir.with_file_name(name)
}

/// Deletes the directory if it exists, then recreates it empty.
async fn reset_dir(path: &Path) -> Result<(), InstallError> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(InstallError::io(path, e)),
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| InstallError::io(path, e))
}

async fn run_blocking<T, F>(task: F) -> Result<T, InstallError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|source| InstallError::Task { source })
}
