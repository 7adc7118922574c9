//! Filesystem-backed document store.

use super::{DocumentStore, Listing, MtimePolicy, StoreError};
use crate::models::Document;
use chrono::{DateTime, Utc};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Markdown files under a vault directory.
///
/// Hidden entries (`.obsidian`, `.git`, dotfiles) are never listed.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute path for a vault-relative document path
    pub fn absolute(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn document_for(&self, entry: &DirEntry) -> Result<Document, StoreError> {
        let rel = self.relative(entry.path());
        let modified = entry
            .metadata()
            .map_err(|err| StoreError::io(&rel, err.into()))?
            .modified()
            .map_err(|err| StoreError::io(&rel, err))?;
        Ok(Document::new(rel, DateTime::<Utc>::from(modified)))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

fn is_markdown(path: &Path) -> bool {
    path.extension().map(|ext| ext == "md").unwrap_or(false)
}

impl DocumentStore for FsStore {
    fn list_documents(&self) -> Result<Listing, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::NotFound(self.root.display().to_string()));
        }

        let mut listing = Vec::new();
        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_markdown(entry.path()) => {
                    listing.push(self.document_for(&entry));
                }
                Ok(_) => {}
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| self.relative(p))
                        .unwrap_or_else(|| self.root.display().to_string());
                    listing.push(Err(StoreError::io(path, err.into())));
                }
            }
        }

        Ok(listing)
    }

    fn read_content(&self, path: &str) -> Result<String, StoreError> {
        fs::read_to_string(self.absolute(path)).map_err(|err| StoreError::io(path, err))
    }

    fn write_content(&self, path: &str, content: &str, mtime: MtimePolicy) -> Result<(), StoreError> {
        let abs = self.absolute(path);
        fs::write(&abs, content).map_err(|err| StoreError::io(path, err))?;

        if let MtimePolicy::Preserve(modified) = mtime {
            let stamp = FileTime::from_system_time(modified.into());
            filetime::set_file_mtime(&abs, stamp).map_err(|err| StoreError::io(path, err))?;
        }
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let src = self.absolute(from);
        let dst = self.absolute(to);

        if !src.exists() {
            return Err(StoreError::NotFound(from.to_string()));
        }
        if dst.exists() {
            return Err(StoreError::AlreadyExists(to.to_string()));
        }
        fs::rename(&src, &dst).map_err(|err| StoreError::io(from, err))
    }

    fn exists(&self, path: &str) -> bool {
        self.absolute(path).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_lists_markdown_sorted_and_skips_hidden() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("notes")).unwrap();
        fs::create_dir_all(dir.path().join(".obsidian")).unwrap();
        fs::write(dir.path().join("b.md"), "b").unwrap();
        fs::write(dir.path().join("a.md"), "a").unwrap();
        fs::write(dir.path().join("notes/c.md"), "c").unwrap();
        fs::write(dir.path().join("image.png"), "png").unwrap();
        fs::write(dir.path().join(".obsidian/workspace.md"), "x").unwrap();

        let store = FsStore::new(dir.path());
        let paths: Vec<String> = store
            .list_documents()
            .unwrap()
            .into_iter()
            .map(|doc| doc.unwrap().path)
            .collect();

        assert_eq!(paths, vec!["a.md", "b.md", "notes/c.md"]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path().join("nope"));
        assert!(matches!(store.list_documents(), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_write_preserves_mtime() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path());
        fs::write(dir.path().join("doc.md"), "before").unwrap();

        let old = Utc.with_ymd_and_hms(2020, 5, 12, 10, 50, 21).unwrap();
        store
            .write_content("doc.md", "after", MtimePolicy::Preserve(old))
            .unwrap();

        let listed = store.list_documents().unwrap().remove(0).unwrap();
        assert_eq!(listed.modified, old);
        assert_eq!(store.read_content("doc.md").unwrap(), "after");
    }

    #[test]
    fn test_rename_never_overwrites() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path());
        fs::write(dir.path().join("a.md"), "a").unwrap();
        fs::write(dir.path().join("b.md"), "b").unwrap();

        assert!(matches!(
            store.rename("a.md", "b.md"),
            Err(StoreError::AlreadyExists(_))
        ));
        assert!(matches!(
            store.rename("missing.md", "c.md"),
            Err(StoreError::NotFound(_))
        ));

        store.rename("a.md", "c.md").unwrap();
        assert!(!store.exists("a.md"));
        assert!(store.exists("c.md"));
    }

    #[test]
    fn test_resolve_by_bare_name() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("deep")).unwrap();
        fs::write(dir.path().join("deep/Target.md"), "t").unwrap();

        let store = FsStore::new(dir.path());
        let found = store.resolve_by_bare_name("Target").unwrap().unwrap();
        assert_eq!(found.path, "deep/Target.md");
        assert!(store.resolve_by_bare_name("Other").unwrap().is_none());
    }
}
