//! Repository root discovery
//!
//! Walks parent directories of a starting path until one of them holds a
//! `.git` entry. The search works purely on paths and never touches the
//! process working directory.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Name of the version-control metadata entry marking a repository root.
///
/// It is a directory in ordinary clones and a file in worktrees and
/// submodules, so both count.
pub const GIT_MARKER: &str = ".git";

/// Errors that can occur while locating a repository
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("No git repository found at or above '{}'", start.display())]
    NotFound { start: PathBuf },

    #[error("Failed to resolve '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Find the root of the repository containing `start`
///
/// `start` may be a file or a directory. The returned path is canonical.
pub fn find_repository_root(start: &Path) -> Result<PathBuf, RepositoryError> {
    let canonical = start.canonicalize().map_err(|source| RepositoryError::Io {
        path: start.to_path_buf(),
        source,
    })?;

    let mut current = if canonical.is_file() {
        match canonical.parent() {
            Some(parent) => parent.to_path_buf(),
            None => {
                return Err(RepositoryError::NotFound {
                    start: start.to_path_buf(),
                });
            }
        }
    } else {
        canonical
    };

    loop {
        if current.join(GIT_MARKER).exists() {
            log::debug!("Repository root: {}", current.display());
            return Ok(current);
        }

        // Move to parent directory
        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            break;
        }
    }

    Err(RepositoryError::NotFound {
        start: start.to_path_buf(),
    })
}
