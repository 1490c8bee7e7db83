//! Two-phase directory staging.
//!
//! [`mirror`] copies a validated source tree into a destination directory:
//! first every directory is created, then every file is copied. No file copy
//! can target a directory that does not yet exist; that two-phase separation
//! is the only ordering guarantee. Existing destination files are
//! overwritten (last-write-wins), and a failure aborts the whole mirror
//! without cleaning up a partially populated destination.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};
use walkdir::WalkDir;

/// Errors that can occur while mirroring a directory tree.
#[derive(Debug, Error)]
pub enum StageError {
    /// Failure enumerating the source tree.
    #[error("failed to enumerate {path}: {source}")]
    Walk {
        /// The path that could not be enumerated.
        path: PathBuf,
        /// The underlying walkdir error.
        #[source]
        source: walkdir::Error,
    },

    /// Failure creating a destination directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Failure copying a file into the destination.
    #[error("failed to copy {from} to {to}: {source}")]
    CopyFile {
        /// Source file path.
        from: PathBuf,
        /// Destination file path.
        to: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Mirrors `source_root` into `dest_root`.
///
/// Phase 1 creates the structurally corresponding directory under
/// `dest_root` for every directory under `source_root` (parents included)
/// and completes for the whole tree before phase 2 copies any file.
/// Enumeration order within a phase is unspecified.
///
/// # Errors
///
/// Returns [`StageError`] naming the offending path on the first failure;
/// the destination may be left partially populated.
#[instrument(fields(source = %source_root.display(), dest = %dest_root.display()))]
pub fn mirror(source_root: &Path, dest_root: &Path) -> Result<(), StageError> {
    let mut pending_files: Vec<(PathBuf, PathBuf)> = Vec::new();

    // Phase 1: create every directory, collecting file copies for phase 2.
    for entry in WalkDir::new(source_root) {
        let entry = entry.map_err(|e| StageError::Walk {
            path: e
                .path()
                .map_or_else(|| source_root.to_path_buf(), Path::to_path_buf),
            source: e,
        })?;
        let Ok(relative) = entry.path().strip_prefix(source_root) else {
            continue;
        };
        let target = dest_root.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|source| StageError::CreateDir {
                path: target.clone(),
                source,
            })?;
        } else {
            pending_files.push((entry.into_path(), target));
        }
    }

    // Phase 2: copy every file, overwriting existing destinations.
    let file_count = pending_files.len();
    for (from, to) in pending_files {
        std::fs::copy(&from, &to).map_err(|source| StageError::CopyFile { from, to, source })?;
    }

    debug!(files = file_count, "mirror complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn build_source_tree(root: &Path) {
        std::fs::create_dir_all(root.join("bin")).unwrap();
        std::fs::create_dir_all(root.join("lib/plugins")).unwrap();
        std::fs::write(root.join("bin/app"), b"app binary").unwrap();
        std::fs::write(root.join("lib/data.bin"), b"data").unwrap();
        std::fs::write(root.join("lib/plugins/extra.so"), b"plugin").unwrap();
    }

    #[test]
    fn test_mirror_preserves_structure_and_contents() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source");
        let dest = temp_dir.path().join("dest");
        build_source_tree(&source);

        mirror(&source, &dest).unwrap();

        assert!(dest.join("bin").is_dir());
        assert!(dest.join("lib/plugins").is_dir());
        assert_eq!(std::fs::read(dest.join("bin/app")).unwrap(), b"app binary");
        assert_eq!(std::fs::read(dest.join("lib/data.bin")).unwrap(), b"data");
        assert_eq!(
            std::fs::read(dest.join("lib/plugins/extra.so")).unwrap(),
            b"plugin"
        );
    }

    #[test]
    fn test_mirror_overwrites_existing_files() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source");
        let dest = temp_dir.path().join("dest");
        build_source_tree(&source);

        mirror(&source, &dest).unwrap();

        // Modify the source and re-run: destination content must follow.
        std::fs::write(source.join("bin/app"), b"updated binary").unwrap();
        mirror(&source, &dest).unwrap();

        assert_eq!(
            std::fs::read(dest.join("bin/app")).unwrap(),
            b"updated binary"
        );
        // Untouched files survive the re-run.
        assert_eq!(std::fs::read(dest.join("lib/data.bin")).unwrap(), b"data");
    }

    #[test]
    fn test_mirror_creates_empty_directories() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source");
        let dest = temp_dir.path().join("dest");
        std::fs::create_dir_all(source.join("empty/nested")).unwrap();

        mirror(&source, &dest).unwrap();

        assert!(dest.join("empty/nested").is_dir());
    }

    #[test]
    fn test_mirror_missing_source_fails_with_walk_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = mirror(&temp_dir.path().join("absent"), &temp_dir.path().join("d"));
        assert!(matches!(result, Err(StageError::Walk { .. })));
    }

    #[test]
    fn test_mirror_preexisting_destination_is_merged_over() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source");
        let dest = temp_dir.path().join("dest");
        build_source_tree(&source);
        std::fs::create_dir_all(dest.join("bin")).unwrap();
        std::fs::write(dest.join("bin/app"), b"stale").unwrap();

        mirror(&source, &dest).unwrap();

        assert_eq!(std::fs::read(dest.join("bin/app")).unwrap(), b"app binary");
    }
}
