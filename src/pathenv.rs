//! Idempotent search-path variable registration.
//!
//! Membership is tested by tokenizing the delimiter-joined value into
//! discrete entries and comparing them for equality, not by raw substring
//! containment, so accidental substring overlap never counts as a duplicate.
//! An empty or absent variable ends up holding just the new directory with
//! no leading delimiter.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

/// Name of the user's executable search-path variable.
pub const SEARCH_PATH_VAR: &str = "PATH";

/// Errors that can occur reading or rewriting the search-path variable.
#[derive(Debug, Error)]
pub enum PathEnvError {
    /// Failure reading the variable from the store.
    #[error("failed to read {name}: {message}")]
    Read {
        /// Variable name.
        name: String,
        /// Store-specific failure description.
        message: String,
    },

    /// Failure writing the variable back to the store.
    #[error("failed to write {name}: {message}")]
    Write {
        /// Variable name.
        name: String,
        /// Store-specific failure description.
        message: String,
    },

    /// The new entry cannot be joined into the existing value
    /// (e.g. it contains the path-list delimiter).
    #[error("cannot join search path entries for {name}: {source}")]
    Join {
        /// Variable name.
        name: String,
        /// The underlying join error.
        #[source]
        source: env::JoinPathsError,
    },
}

impl PathEnvError {
    /// Creates a read error.
    pub fn read(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a write error.
    pub fn write(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// A user-scoped variable store.
///
/// Abstracts where the search-path variable lives so registration logic can
/// be exercised against an in-memory store in tests and a persistent
/// platform store in production builds.
pub trait PathStore {
    /// Reads the current value of `name`, `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`PathEnvError::Read`] when the store cannot be read.
    fn read(&self, name: &str) -> Result<Option<OsString>, PathEnvError>;

    /// Writes `value` as the new value of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PathEnvError::Write`] when the store cannot be written.
    fn write(&mut self, name: &str, value: &OsStr) -> Result<(), PathEnvError>;
}

/// [`PathStore`] backed by the process environment.
///
/// Scope note: mutations are visible to this process and its children.
/// Persisting the change for future sessions is a platform concern left to
/// other [`PathStore`] implementations.
#[derive(Debug, Default)]
pub struct ProcessEnvStore;

impl PathStore for ProcessEnvStore {
    fn read(&self, name: &str) -> Result<Option<OsString>, PathEnvError> {
        Ok(env::var_os(name))
    }

    fn write(&mut self, name: &str, value: &OsStr) -> Result<(), PathEnvError> {
        // SAFETY: the installer mutates the environment from its single
        // logical thread of control; no other thread reads the environment
        // concurrently during a run.
        unsafe {
            env::set_var(name, value);
        }
        Ok(())
    }
}

/// Ensures `dir` appears on the delimiter-joined list stored under
/// `var_name`, appending it when absent.
///
/// The check is exact entry equality after tokenization; an entry that
/// merely contains `dir` as a substring does not count. Empty entries in
/// the existing value are dropped on rewrite.
///
/// # Returns
///
/// `true` when the variable was rewritten, `false` when `dir` was already
/// present (the variable is left untouched).
///
/// # Errors
///
/// Returns [`PathEnvError`] when the store cannot be read or written, or
/// when `dir` cannot be joined into a path list.
pub fn ensure_on_search_path(
    store: &mut dyn PathStore,
    var_name: &str,
    dir: &Path,
) -> Result<bool, PathEnvError> {
    let current = store.read(var_name)?;

    if let Some(value) = &current {
        if env::split_paths(value).any(|entry| entry == dir) {
            debug!(var = var_name, dir = %dir.display(), "already on search path");
            return Ok(false);
        }
    }

    let entries = current
        .iter()
        .flat_map(env::split_paths)
        .filter(|entry| !entry.as_os_str().is_empty())
        .chain(std::iter::once(dir.to_path_buf()));
    let joined = env::join_paths(entries).map_err(|source| PathEnvError::Join {
        name: var_name.to_string(),
        source,
    })?;

    store.write(var_name, &joined)?;
    info!(var = var_name, dir = %dir.display(), "registered on search path");
    Ok(true)
}
