//! Zip extraction for downloaded release archives.
//!
//! The destination directory is assumed to exist and be empty; relative
//! directory structure from the archive is preserved exactly. Entries whose
//! names would escape the destination are skipped.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument, warn};
use zip::ZipArchive;
use zip::result::ZipError;

/// Errors that can occur while extracting a release archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive cannot be parsed as a zip container.
    #[error("archive {path} is corrupt: {source}")]
    Corrupt {
        /// Path of the unreadable archive.
        path: PathBuf,
        /// The underlying zip error.
        #[source]
        source: ZipError,
    },

    /// File system error while reading the archive or writing an entry.
    #[error("IO error extracting to {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    fn corrupt(path: impl Into<PathBuf>, source: ZipError) -> Self {
        Self::Corrupt {
            path: path.into(),
            source,
        }
    }

    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Extracts the zip archive at `archive_path` into `dest_dir`, preserving
/// the archive's relative directory structure.
///
/// # Errors
///
/// Returns [`ArchiveError::Corrupt`] when the container is malformed and
/// [`ArchiveError::Io`] on filesystem failure.
#[instrument(fields(archive = %archive_path.display(), dest = %dest_dir.display()))]
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<(), ArchiveError> {
    let file = File::open(archive_path).map_err(|e| ArchiveError::io(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| ArchiveError::corrupt(archive_path, e))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| ArchiveError::corrupt(archive_path, e))?;

        // enclosed_name() rejects entries that would escape dest_dir.
        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = %entry.name(), "skipping entry with unsafe path");
            continue;
        };
        let out_path = dest_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| ArchiveError::io(&out_path, e))?;
        } else {
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
            }
            let mut out_file =
                File::create(&out_path).map_err(|e| ArchiveError::io(&out_path, e))?;
            io::copy(&mut entry, &mut out_file).map_err(|e| ArchiveError::io(&out_path, e))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))
                    .map_err(|e| ArchiveError::io(&out_path, e))?;
            }
        }
    }

    debug!(entries = archive.len(), "extraction complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn write_test_archive(path: &Path) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        writer.add_directory("bin/", options).unwrap();
        writer.start_file("bin/app", options).unwrap();
        writer.write_all(b"binary payload").unwrap();
        writer.add_directory("lib/", options).unwrap();
        writer.start_file("lib/data.bin", options).unwrap();
        writer.write_all(b"data payload").unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn test_extract_preserves_relative_structure() {
        let temp_dir = TempDir::new().unwrap();
        let archive_path = temp_dir.path().join("release.zip");
        let dest = temp_dir.path().join("extracted");
        std::fs::create_dir_all(&dest).unwrap();
        write_test_archive(&archive_path);

        extract_zip(&archive_path, &dest).unwrap();

        assert!(dest.join("bin").is_dir());
        assert_eq!(
            std::fs::read(dest.join("bin/app")).unwrap(),
            b"binary payload"
        );
        assert_eq!(
            std::fs::read(dest.join("lib/data.bin")).unwrap(),
            b"data payload"
        );
    }

    #[test]
    fn test_extract_creates_parent_dirs_for_bare_file_entries() {
        // Some zip writers omit explicit directory entries.
        let temp_dir = TempDir::new().unwrap();
        let archive_path = temp_dir.path().join("release.zip");
        let dest = temp_dir.path().join("extracted");
        std::fs::create_dir_all(&dest).unwrap();

        let file = File::create(&archive_path).unwrap();
        let mut writer = ZipWriter::new(file);
        writer
            .start_file("deep/nested/file.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"nested").unwrap();
        writer.finish().unwrap();

        extract_zip(&archive_path, &dest).unwrap();
        assert_eq!(
            std::fs::read(dest.join("deep/nested/file.txt")).unwrap(),
            b"nested"
        );
    }

    #[test]
    fn test_extract_rejects_corrupt_archive() {
        let temp_dir = TempDir::new().unwrap();
        let archive_path = temp_dir.path().join("broken.zip");
        std::fs::write(&archive_path, b"this is not a zip container").unwrap();
        let dest = temp_dir.path().join("extracted");
        std::fs::create_dir_all(&dest).unwrap();

        let result = extract_zip(&archive_path, &dest);
        assert!(matches!(result, Err(ArchiveError::Corrupt { .. })));
    }

    #[test]
    fn test_extract_missing_archive_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = extract_zip(&temp_dir.path().join("absent.zip"), temp_dir.path());
        assert!(matches!(result, Err(ArchiveError::Io { .. })));
    }
}
