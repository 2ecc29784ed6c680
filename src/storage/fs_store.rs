use super::{DeleteOutcome, ObjectStore, StoreError, StoreResult};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;

const TEMP_FILE_PREFIX: &str = ".openaq-tmp";

/// Object store backed by a local directory tree
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key to a path under the root, rejecting keys that escape it
    fn resolve(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
                reason: "empty key".to_string(),
            });
        }

        let relative = Path::new(key);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(StoreError::InvalidKey {
                        key: key.to_string(),
                        reason: "keys must be relative and must not contain '..'".to_string(),
                    })
                }
            }
        }

        Ok(self.root.join(relative))
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Some(parts.join("/"))
    }

    /// Directory that contains every key starting with `prefix`
    fn listing_root(&self, prefix: &str) -> PathBuf {
        match prefix.rfind('/') {
            Some(pos) => self.root.join(&prefix[..pos]),
            None => self.root.clone(),
        }
    }
}

impl ObjectStore for FsObjectStore {
    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let start = self.listing_root(prefix);
        if !start.exists() {
            debug!("Listing root {} does not exist", start.display());
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&start).follow_links(true) {
            let entry = entry.map_err(|e| {
                StoreError::io(
                    prefix,
                    e.into_io_error()
                        .unwrap_or_else(|| {
                            std::io::Error::new(std::io::ErrorKind::Other, "directory walk failed")
                        }),
                )
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            if entry
                .file_name()
                .to_string_lossy()
                .starts_with(TEMP_FILE_PREFIX)
            {
                continue;
            }

            if let Some(key) = self.key_for(entry.path()) {
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        let path = self.resolve(key)?;
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => StoreError::io(key, e),
        })
    }

    fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        let path = self.resolve(key)?;
        let parent = path.parent().unwrap_or(&self.root);
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(key, e))?;

        // Write beside the target then rename, so a failed write leaves nothing behind
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .tempfile_in(parent)
            .map_err(|e| StoreError::io(key, e))?;
        write_all(&mut temp, bytes).map_err(|e| StoreError::io(key, e))?;
        temp.persist(&path)
            .map_err(|e| StoreError::io(key, e.error))?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn delete_many(&self, keys: &[String]) -> Vec<DeleteOutcome> {
        keys.iter()
            .map(|key| {
                let path = match self.resolve(key) {
                    Ok(path) => path,
                    Err(e) => return DeleteOutcome::failed(key.as_str(), e),
                };
                match std::fs::remove_file(&path) {
                    Ok(()) => DeleteOutcome::ok(key.as_str()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        DeleteOutcome::ok(key.as_str())
                    }
                    Err(e) => DeleteOutcome::failed(key.as_str(), StoreError::io(key.as_str(), e)),
                }
            })
            .collect()
    }
}

fn write_all(temp: &mut NamedTempFile, bytes: &[u8]) -> std::io::Result<()> {
    temp.write_all(bytes)?;
    temp.as_file().sync_all()
}
