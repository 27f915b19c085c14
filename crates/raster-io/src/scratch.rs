//! Injectable provisioning of temporary backing resources.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;

use crate::error::{RasterIoError, Result};

/// Identifies one provisioned scratch resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchHandle {
    name: String,
    path: Option<PathBuf>,
}

impl ScratchHandle {
    /// Unique name of the resource within its store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filesystem location, for stores that back resources with files.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Provisioning of temporary backing resources for aligned views.
///
/// Injected rather than ambient process temp state, so the owner decides
/// where resources live and tests can count what is still provisioned.
pub trait ScratchStore: Send + Sync {
    /// Provision a resource. `hint` seeds the name; the store guarantees
    /// uniqueness among live resources by suffixing when needed.
    fn create(&self, hint: &str) -> Result<ScratchHandle>;

    /// Remove a previously provisioned resource. Removing a handle twice
    /// is an error; callers that want idempotence track release themselves.
    fn remove(&self, handle: &ScratchHandle) -> Result<()>;

    /// Number of currently provisioned resources.
    fn live_count(&self) -> usize;
}

fn unique_name(live: &HashSet<String>, hint: &str) -> String {
    if !live.contains(hint) {
        return hint.to_string();
    }
    let mut i = 1usize;
    loop {
        let candidate = format!("{}.{}", hint, i);
        if !live.contains(&candidate) {
            return candidate;
        }
        i += 1;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A poisoned registry only means another thread panicked mid-update;
    // the set itself is still usable.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scratch resources as real files inside one temporary directory owned by
/// the store; the directory disappears with the store.
pub struct TempScratch {
    dir: TempDir,
    live: Mutex<HashSet<String>>,
}

impl TempScratch {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
            live: Mutex::new(HashSet::new()),
        })
    }

    /// Directory holding the live resources.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

impl ScratchStore for TempScratch {
    fn create(&self, hint: &str) -> Result<ScratchHandle> {
        let mut live = lock(&self.live);
        let name = unique_name(&live, hint);
        let path = self.dir.path().join(&name);
        fs::File::create(&path)?;
        live.insert(name.clone());
        Ok(ScratchHandle {
            name,
            path: Some(path),
        })
    }

    fn remove(&self, handle: &ScratchHandle) -> Result<()> {
        let mut live = lock(&self.live);
        if !live.remove(handle.name()) {
            return Err(RasterIoError::scratch(format!(
                "unknown or already removed resource '{}'",
                handle.name()
            )));
        }
        if let Some(path) = handle.path() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn live_count(&self) -> usize {
        lock(&self.live).len()
    }
}

/// Purely in-memory scratch bookkeeping; nothing touches the filesystem.
#[derive(Debug, Default)]
pub struct MemoryScratch {
    live: Mutex<HashSet<String>>,
}

impl MemoryScratch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScratchStore for MemoryScratch {
    fn create(&self, hint: &str) -> Result<ScratchHandle> {
        let mut live = lock(&self.live);
        let name = unique_name(&live, hint);
        live.insert(name.clone());
        Ok(ScratchHandle { name, path: None })
    }

    fn remove(&self, handle: &ScratchHandle) -> Result<()> {
        if !lock(&self.live).remove(handle.name()) {
            return Err(RasterIoError::scratch(format!(
                "unknown or already removed resource '{}'",
                handle.name()
            )));
        }
        Ok(())
    }

    fn live_count(&self) -> usize {
        lock(&self.live).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_scratch_create_remove() {
        let store = MemoryScratch::new();
        assert_eq!(store.live_count(), 0);

        let a = store.create("a.vrt").unwrap();
        let b = store.create("b.vrt").unwrap();
        assert_eq!(store.live_count(), 2);

        store.remove(&a).unwrap();
        assert_eq!(store.live_count(), 1);
        store.remove(&b).unwrap();
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_double_remove_is_an_error() {
        let store = MemoryScratch::new();
        let handle = store.create("x.vrt").unwrap();
        store.remove(&handle).unwrap();
        assert!(matches!(
            store.remove(&handle),
            Err(RasterIoError::Scratch(_))
        ));
    }

    #[test]
    fn test_colliding_hints_get_unique_names() {
        let store = MemoryScratch::new();
        let a = store.create("same.vrt").unwrap();
        let b = store.create("same.vrt").unwrap();
        assert_ne!(a.name(), b.name());
        assert_eq!(store.live_count(), 2);
    }

    #[test]
    fn test_temp_scratch_backs_resources_with_files() {
        let store = TempScratch::new().unwrap();
        let handle = store.create("view.vrt").unwrap();

        let path = handle.path().unwrap().to_path_buf();
        assert!(path.exists());
        assert_eq!(store.live_count(), 1);

        store.remove(&handle).unwrap();
        assert!(!path.exists());
        assert_eq!(store.live_count(), 0);
    }
}
