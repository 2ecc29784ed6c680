use super::{DeleteOutcome, ObjectStore, StoreError, StoreResult};
use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

/// In-memory object store with optional per-key failure injection.
///
/// Useful for dry runs and tests; a key (or listing prefix) marked with
/// [`MemoryObjectStore::fail_on`] makes every operation touching it fail.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
    failing: RwLock<HashSet<String>>,
    max_delete_batch: Option<usize>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_delete_batch(mut self, size: usize) -> Self {
        self.max_delete_batch = Some(size.max(1));
        self
    }

    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.objects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), bytes.into());
    }

    /// Make every subsequent operation on `key` fail
    pub fn fail_on(&self, key: impl Into<String>) {
        self.failing
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, key: &str) -> StoreResult<()> {
        if self
            .failing
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
        {
            return Err(StoreError::Unavailable(format!(
                "injected failure for '{}'",
                key
            )));
        }
        Ok(())
    }
}

impl ObjectStore for MemoryObjectStore {
    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.check(prefix)?;
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.check(key)?;
        self.objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        self.check(key)?;
        self.insert(key, bytes);
        Ok(())
    }

    fn delete_many(&self, keys: &[String]) -> Vec<DeleteOutcome> {
        keys.iter()
            .map(|key| match self.check(key) {
                Ok(()) => {
                    self.objects
                        .write()
                        .unwrap_or_else(|e| e.into_inner())
                        .remove(key);
                    DeleteOutcome::ok(key.as_str())
                }
                Err(e) => DeleteOutcome::failed(key.as_str(), e),
            })
            .collect()
    }

    fn max_delete_batch(&self) -> usize {
        self.max_delete_batch
            .unwrap_or(crate::utils::constants::DEFAULT_DELETE_BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_uses_prefix_order() {
        let store = MemoryObjectStore::new();
        store.insert("day/2", "b");
        store.insert("day/1", "a");
        store.insert("other/1", "c");

        assert_eq!(store.list("day/").unwrap(), vec!["day/1", "day/2"]);
        assert!(store.list("none/").unwrap().is_empty());
    }

    #[test]
    fn test_injected_failures() {
        let store = MemoryObjectStore::new();
        store.insert("temp/a", "a");
        store.fail_on("temp/a");

        assert!(matches!(store.get("temp/a"), Err(StoreError::Unavailable(_))));
        assert!(store.put("temp/a", b"x").is_err());

        let outcomes = store.delete_many(&["temp/a".to_string()]);
        assert!(!outcomes[0].is_ok());
        assert!(store.contains("temp/a"));
    }
}
