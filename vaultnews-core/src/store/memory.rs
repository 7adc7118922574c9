//! In-memory document store for testing.

use super::{DocumentStore, Listing, MtimePolicy, StoreError};
use crate::models::Document;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::io;

#[derive(Debug, Clone)]
struct MemoryFile {
    content: String,
    modified: DateTime<Utc>,
}

/// Document store backed by a `BTreeMap`, listed in path order.
///
/// Paths registered with [`MemoryStore::fail_reads`],
/// [`MemoryStore::fail_stat`], [`MemoryStore::fail_writes`] or
/// [`MemoryStore::fail_renames`] error out, which lets tests exercise the
/// skip-and-continue paths.
pub struct MemoryStore {
    files: RwLock<BTreeMap<String, MemoryFile>>,
    unreadable: RwLock<BTreeSet<String>>,
    unstatable: RwLock<BTreeSet<String>>,
    unwritable: RwLock<BTreeSet<String>>,
    vanishing: RwLock<BTreeSet<String>>,
    clock: RwLock<Option<DateTime<Utc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            unreadable: RwLock::new(BTreeSet::new()),
            unstatable: RwLock::new(BTreeSet::new()),
            unwritable: RwLock::new(BTreeSet::new()),
            vanishing: RwLock::new(BTreeSet::new()),
            clock: RwLock::new(None),
        }
    }

    /// Builder-style insert
    pub fn with(self, path: &str, content: &str, modified: DateTime<Utc>) -> Self {
        self.insert(path, content, modified);
        self
    }

    pub fn insert(&self, path: &str, content: &str, modified: DateTime<Utc>) {
        self.files.write().insert(
            path.to_string(),
            MemoryFile {
                content: content.to_string(),
                modified,
            },
        );
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.files.read().get(path).map(|f| f.content.clone())
    }

    pub fn modified(&self, path: &str) -> Option<DateTime<Utc>> {
        self.files.read().get(path).map(|f| f.modified)
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.read().keys().cloned().collect()
    }

    pub fn fail_reads(&self, path: &str) {
        self.unreadable.write().insert(path.to_string());
    }

    pub fn fail_stat(&self, path: &str) {
        self.unstatable.write().insert(path.to_string());
    }

    pub fn fail_writes(&self, path: &str) {
        self.unwritable.write().insert(path.to_string());
    }

    /// Renaming `path` fails as if it had been deleted after listing
    pub fn fail_renames(&self, path: &str) {
        self.vanishing.write().insert(path.to_string());
    }

    /// Time stamped on touching writes (defaults to the wall clock)
    pub fn set_clock(&self, now: DateTime<Utc>) {
        *self.clock.write() = Some(now);
    }

    fn now(&self) -> DateTime<Utc> {
        let clock = *self.clock.read();
        clock.unwrap_or_else(Utc::now)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn list_documents(&self) -> Result<Listing, StoreError> {
        let unstatable = self.unstatable.read();
        Ok(self
            .files
            .read()
            .iter()
            .map(|(path, file)| {
                if unstatable.contains(path) {
                    Err(StoreError::io(
                        path,
                        io::Error::new(io::ErrorKind::PermissionDenied, "stat failed"),
                    ))
                } else {
                    Ok(Document::new(path.clone(), file.modified))
                }
            })
            .collect())
    }

    fn read_content(&self, path: &str) -> Result<String, StoreError> {
        if self.unreadable.read().contains(path) {
            return Err(StoreError::io(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "read failed"),
            ));
        }
        self.content(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn write_content(&self, path: &str, content: &str, mtime: MtimePolicy) -> Result<(), StoreError> {
        if self.unwritable.read().contains(path) {
            return Err(StoreError::io(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "write failed"),
            ));
        }
        let modified = match mtime {
            MtimePolicy::Touch => self.now(),
            MtimePolicy::Preserve(ts) => ts,
        };
        self.insert(path, content, modified);
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        if self.vanishing.read().contains(from) {
            return Err(StoreError::NotFound(from.to_string()));
        }
        let mut files = self.files.write();
        if files.contains_key(to) {
            return Err(StoreError::AlreadyExists(to.to_string()));
        }
        let file = files
            .remove(from)
            .ok_or_else(|| StoreError::NotFound(from.to_string()))?;
        files.insert(to.to_string(), file);
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.files.read().contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_memory_store_roundtrip() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let store = MemoryStore::new().with("b.md", "bee", t0).with("a.md", "ay", t0);
        store.set_clock(t1);

        let listed: Vec<String> = store
            .list_documents()
            .unwrap()
            .into_iter()
            .map(|d| d.unwrap().path)
            .collect();
        assert_eq!(listed, vec!["a.md", "b.md"]);

        store.write_content("a.md", "new", MtimePolicy::Touch).unwrap();
        assert_eq!(store.modified("a.md"), Some(t1));

        store
            .write_content("b.md", "new", MtimePolicy::Preserve(t0))
            .unwrap();
        assert_eq!(store.modified("b.md"), Some(t0));

        store.rename("b.md", "c.md").unwrap();
        assert_eq!(store.content("c.md").as_deref(), Some("new"));
        assert_eq!(store.modified("c.md"), Some(t0));
    }

    #[test]
    fn test_failure_injection() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let store = MemoryStore::new().with("a.md", "ay", t0).with("b.md", "bee", t0);
        store.fail_reads("a.md");
        store.fail_stat("b.md");

        assert!(store.read_content("a.md").is_err());
        let listing = store.list_documents().unwrap();
        assert!(listing[0].is_ok());
        assert!(listing[1].is_err());

        store.fail_writes("a.md");
        store.fail_renames("b.md");
        assert!(store
            .write_content("a.md", "new", MtimePolicy::Touch)
            .is_err());
        assert_eq!(store.content("a.md").as_deref(), Some("ay"));
        assert!(matches!(
            store.rename("b.md", "c.md"),
            Err(StoreError::NotFound(_))
        ));
        assert!(store.exists("b.md"));
    }
}
