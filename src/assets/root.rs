//! Asset root discovery and confined file loading

use hyper::body::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

use crate::error::StartupError;
use crate::logger;

/// The directory the server was started against. Chosen once, never changed.
#[derive(Debug, Clone)]
pub struct AssetRoot {
    path: PathBuf,
    canonical: PathBuf,
}

/// A file read from under the root
#[derive(Debug)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub data: Bytes,
    pub modified: Option<SystemTime>,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("not found")]
    NotFound,
    #[error("'{0}' resolves outside the asset root")]
    Escaped(PathBuf),
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Return the first candidate that is an existing directory.
///
/// Runs before the listener is bound; there is no degraded mode.
pub fn select_asset_root(candidates: &[PathBuf]) -> Result<AssetRoot, StartupError> {
    for candidate in candidates {
        if !candidate.is_dir() {
            logger::log_candidate_missing(candidate);
            continue;
        }
        match AssetRoot::new(candidate.clone()) {
            Ok(root) => {
                log_contents(candidate);
                return Ok(root);
            }
            Err(e) => {
                logger::log_warning(&format!(
                    "Asset directory '{}' is unusable: {e}",
                    candidate.display()
                ));
            }
        }
    }

    Err(StartupError::NoAssetRoot {
        candidates: candidates.to_vec(),
    })
}

fn log_contents(dir: &Path) {
    logger::log_candidate_found(dir);
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let size = entry.metadata().map_or(0, |m| m.len());
                logger::log_candidate_entry(&entry.file_name().to_string_lossy(), size);
            }
        }
        Err(e) => logger::log_warning(&format!("Error reading directory: {e}")),
    }
}

impl AssetRoot {
    pub fn new(path: PathBuf) -> io::Result<Self> {
        let canonical = path.canonicalize()?;
        Ok(Self { path, canonical })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read `relative` from under the root.
    ///
    /// A directory resolves to its `index_file`. Anything that cannot be
    /// resolved (missing, broken symlink, not a directory along the way) is
    /// `NotFound`; a path whose canonical form leaves the root is `Escaped`.
    pub async fn load(&self, relative: &Path, index_file: &str) -> Result<LoadedFile, ResolveError> {
        let mut target = self.confine(&self.canonical.join(relative)).await?;

        let meta = fs::metadata(&target).await.map_err(|_| ResolveError::NotFound)?;
        if meta.is_dir() {
            target = self.confine(&target.join(index_file)).await?;
        }

        let meta = fs::metadata(&target).await.map_err(|_| ResolveError::NotFound)?;
        if !meta.is_file() {
            return Err(ResolveError::NotFound);
        }

        let data = fs::read(&target)
            .await
            .map_err(|source| read_error(&target, source))?;

        Ok(LoadedFile {
            modified: meta.modified().ok(),
            path: target,
            data: Bytes::from(data),
        })
    }

    async fn confine(&self, candidate: &Path) -> Result<PathBuf, ResolveError> {
        // File not found is common, no need to log
        let canonical = fs::canonicalize(candidate)
            .await
            .map_err(|_| ResolveError::NotFound)?;
        if canonical.starts_with(&self.canonical) {
            Ok(canonical)
        } else {
            Err(ResolveError::Escaped(canonical))
        }
    }
}

/// A file that vanished between the metadata probe and the read is simply
/// missing; every other read failure is a server error.
fn read_error(path: &Path, source: io::Error) -> ResolveError {
    match source.kind() {
        io::ErrorKind::NotFound => ResolveError::NotFound,
        _ => ResolveError::Io {
            path: path.to_path_buf(),
            source,
        },
    }
}
