//! Snapshot store: the working and stable configuration directories.
//!
//! The stable snapshot is only ever replaced as a whole, through a staging
//! copy that is renamed into place.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pagetree_core::BotError;
use tracing::{info, warn};
use uuid::Uuid;

/// Which snapshot a reload attempt reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Working,
    Stable,
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotKind::Working => f.write_str("working"),
            SnapshotKind::Stable => f.write_str("stable"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    working: PathBuf,
    stable: PathBuf,
}

impl SnapshotStore {
    pub fn new(working: impl Into<PathBuf>, stable: impl Into<PathBuf>) -> Self {
        Self {
            working: working.into(),
            stable: stable.into(),
        }
    }

    pub fn working(&self) -> &Path {
        &self.working
    }

    pub fn stable(&self) -> &Path {
        &self.stable
    }

    pub fn path(&self, kind: SnapshotKind) -> &Path {
        match kind {
            SnapshotKind::Working => &self.working,
            SnapshotKind::Stable => &self.stable,
        }
    }

    pub fn stable_exists(&self) -> bool {
        self.stable.is_dir()
    }

    /// Replace the stable snapshot with a full copy of the working one.
    pub async fn persist_stable(&self) -> Result<(), BotError> {
        let working = self.working.clone();
        let stable = self.stable.clone();
        info!(from = %working.display(), to = %stable.display(), "Saving new stable configuration");

        tokio::task::spawn_blocking(move || replace_dir(&working, &stable))
            .await
            .map_err(|e| BotError::Other(e.into()))?
            .map_err(|e| BotError::io(&self.stable, e))?;

        info!("Done saving new stable configuration");
        Ok(())
    }
}

/// Copy `src` to a staging sibling of `dest`, then swap it in.
fn replace_dir(src: &Path, dest: &Path) -> io::Result<()> {
    let staging = sibling(dest, "staging")?;
    if let Err(e) = copy_dir_all(src, &staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }
    swap_into_place(&staging, dest)
}

/// Hidden, uniquely named path next to `dest`: `.<name>.<label>-<uuid>`.
pub(crate) fn sibling(dest: &Path, label: &str) -> io::Result<PathBuf> {
    let name = dest.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "snapshot dir has no file name")
    })?;
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let tag = Uuid::new_v4().simple().to_string();
    Ok(parent.join(format!(".{}.{label}-{tag}", name.to_string_lossy())))
}

/// Rename a fully written `staging` dir over `dest`. On failure the previous
/// `dest` is put back and `staging` removed.
pub(crate) fn swap_into_place(staging: &Path, dest: &Path) -> io::Result<()> {
    let retired = sibling(dest, "retired")?;
    let had_previous = dest.exists();
    if had_previous {
        if let Err(e) = fs::rename(dest, &retired) {
            let _ = fs::remove_dir_all(staging);
            return Err(e);
        }
    }
    if let Err(e) = fs::rename(staging, dest) {
        if had_previous {
            if let Err(restore) = fs::rename(&retired, dest) {
                warn!(error = %restore, "Failed to restore previous snapshot dir");
            }
        }
        let _ = fs::remove_dir_all(staging);
        return Err(e);
    }
    if had_previous {
        fs::remove_dir_all(&retired)?;
    }
    Ok(())
}

pub fn copy_dir_all(src: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn persist_replaces_stable_contents() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("commands"), tmp.path().join("stable"));

        fs::create_dir_all(store.working().join("weather")).unwrap();
        fs::write(store.working().join("weather").join("descr.md"), "new").unwrap();
        fs::create_dir_all(store.stable().join("old")).unwrap();
        fs::write(store.stable().join("old").join("descr.md"), "old").unwrap();

        store.persist_stable().await.unwrap();

        assert!(store.stable_exists());
        assert!(!store.stable().join("old").exists());
        assert_eq!(
            fs::read_to_string(store.stable().join("weather").join("descr.md")).unwrap(),
            "new"
        );
        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn persist_creates_missing_stable() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("commands"), tmp.path().join("stable"));
        fs::create_dir_all(store.working()).unwrap();
        fs::write(store.working().join("help_message.md"), "h").unwrap();

        assert!(!store.stable_exists());
        store.persist_stable().await.unwrap();
        assert!(store.stable().join("help_message.md").is_file());
    }

    #[tokio::test]
    async fn missing_working_dir_keeps_stable() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("absent"), tmp.path().join("stable"));
        fs::create_dir_all(store.stable()).unwrap();
        fs::write(store.stable().join("keep.md"), "k").unwrap();

        assert!(store.persist_stable().await.is_err());
        assert!(store.stable().join("keep.md").is_file());
    }
}
