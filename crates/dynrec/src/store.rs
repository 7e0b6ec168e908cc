//! Where records are loaded from and saved to.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

pub trait FileStore {
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    fn write(&self, path: &str, data: &[u8]) -> io::Result<()>;
}

/// The local file system. Paths may carry a `file:` prefix.
#[derive(Debug, Clone, Default)]
pub struct OsFileStore {
    root: Option<PathBuf>,
}

impl OsFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path.strip_prefix("file:").unwrap_or(path));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl FileStore for OsFileStore {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let resolved = self.resolve(path);
        debug!(path = %resolved.display(), "reading");
        fs::read(resolved)
    }

    fn write(&self, path: &str, data: &[u8]) -> io::Result<()> {
        let resolved = self.resolve(path);
        debug!(path = %resolved.display(), bytes = data.len(), "writing");
        fs::write(resolved, data)
    }
}

/// Files kept in memory, keyed by path.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }
}

impl FileStore for MemoryFileStore {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }

    fn write(&self, path: &str, data: &[u8]) -> io::Result<()> {
        self.files.lock().insert(path.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_prefix_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let store = OsFileStore::rooted(dir.path());
        store.write("file:a.json", b"{}").unwrap();
        assert_eq!(store.read("a.json").unwrap(), b"{}");
        assert_eq!(fs::read(dir.path().join("a.json")).unwrap(), b"{}");

        let absolute = dir.path().join("b.json");
        let plain = OsFileStore::new();
        plain.write(&format!("file:{}", absolute.display()), b"[]").unwrap();
        assert_eq!(plain.read(absolute.to_str().unwrap()).unwrap(), b"[]");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = OsFileStore::rooted(dir.path()).read("absent").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(MemoryFileStore::new().read("absent").unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryFileStore::new();
        assert!(store.is_empty());
        store.write("x", b"1").unwrap();
        store.write("x", b"2").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.read("x").unwrap(), b"2");
    }
}
