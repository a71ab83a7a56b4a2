use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize seen ids: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("flush task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Set of job ids that have already been notified
///
/// Entries are only ever added. The on-disk copy is a JSON array of strings
/// and is rewritten wholesale on every flush.
#[derive(Debug)]
pub struct SeenStore {
    path: Option<PathBuf>,
    ids: BTreeSet<String>,
}

impl SeenStore {
    /// Load the store from `path`
    ///
    /// A missing, unreadable or corrupt file yields an empty store; startup
    /// never fails here.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ids = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeSet::new(),
            Ok(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(ids) => {
                    info!("Loaded {} seen job(s) from {}", ids.len(), path.display());
                    ids.into_iter().collect()
                }
                Err(e) => {
                    warn!("Seen file {} is corrupt, starting empty: {}", path.display(), e);
                    BTreeSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No seen file at {}, starting empty", path.display());
                BTreeSet::new()
            }
            Err(e) => {
                warn!("Failed to read seen file {}, starting empty: {}", path.display(), e);
                BTreeSet::new()
            }
        };

        Self {
            path: Some(path),
            ids,
        }
    }

    /// Store without a backing file; `flush` is a no-op
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            ids: BTreeSet::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record `id` as notified. Returns false if it was already present.
    pub fn mark_seen(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Copy of the current set, to be written without holding the store
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            path: self.path.clone(),
            ids: self.ids.clone(),
        }
    }

    /// Write the full set to disk
    #[cfg(test)]
    pub fn flush(&self) -> Result<(), StoreError> {
        self.snapshot().write()
    }
}

/// Point-in-time copy of the seen set and its target file
#[derive(Debug)]
pub struct Snapshot {
    path: Option<PathBuf>,
    ids: BTreeSet<String>,
}

impl Snapshot {
    /// Persist the snapshot
    ///
    /// The data goes to a sibling `.tmp` file which is synced and then
    /// renamed over the target, so readers see either the old or the new file.
    pub fn write(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.ids)?;
        let tmp_path = tmp_path_for(path);
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { path, source }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let mut file = fs::File::create(&tmp_path).map_err(io_err(&tmp_path))?;
        file.write_all(json.as_bytes()).map_err(io_err(&tmp_path))?;
        file.sync_all().map_err(io_err(&tmp_path))?;
        drop(file);

        fs::rename(&tmp_path, path).map_err(io_err(path))?;
        debug!("Flushed {} seen job(s) to {}", self.ids.len(), path.display());
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
