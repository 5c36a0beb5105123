//! Archive ingestion: unpack an uploaded zip over the working snapshot.

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};

use pagetree_core::BotError;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::snapshot::{copy_dir_all, sibling, swap_into_place};

pub const ZIP_MIME_TYPES: &[&str] = &["application/zip", "application/x-zip-compressed"];

pub fn is_zip_mime(mime_type: &str) -> bool {
    ZIP_MIME_TYPES
        .iter()
        .any(|m| m.eq_ignore_ascii_case(mime_type.trim()))
}

/// Extract `bytes` over `dest`, returning the number of files written.
///
/// The archive is unpacked into a staging copy of `dest` that replaces it
/// only once every entry is written; on any failure `dest` is untouched.
pub async fn extract_archive(bytes: Vec<u8>, dest: &Path) -> Result<usize, BotError> {
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || apply_archive(&bytes, &dest))
        .await
        .map_err(|e| BotError::Other(e.into()))?
}

fn archive_err(e: impl std::fmt::Display) -> BotError {
    BotError::Archive(e.to_string())
}

fn apply_archive(bytes: &[u8], dest: &Path) -> Result<usize, BotError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(archive_err)?;
    let staging = sibling(dest, "upload").map_err(|e| BotError::io(dest, e))?;

    let prepared = if dest.is_dir() {
        copy_dir_all(dest, &staging)
    } else {
        fs::create_dir_all(&staging)
    };
    let written = prepared
        .map_err(|e| BotError::io(&staging, e))
        .and_then(|()| extract_zip(&mut archive, &staging, dest.file_name()));

    let written = match written {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }
    };
    swap_into_place(&staging, dest).map_err(|e| BotError::io(dest, e))?;

    info!(files = written, dest = %dest.display(), "Applied configuration archive");
    Ok(written)
}

fn extract_zip(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    out_dir: &Path,
    dest_name: Option<&OsStr>,
) -> Result<usize, BotError> {
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let file = archive.by_index(i).map_err(archive_err)?;
        let Some(path) = file.enclosed_name().map(|p| p.to_path_buf()) else {
            warn!(name = %file.name(), "Skipping archive entry outside the target dir");
            continue;
        };
        if path.starts_with("__MACOSX") {
            continue;
        }
        entries.push((i, path, file.is_dir()));
    }

    let prefix = dest_name.and_then(|name| shared_root(&entries, name));
    let mut written = 0;
    for (i, path, is_dir) in entries {
        let relative = match &prefix {
            Some(root) => path.strip_prefix(root).unwrap_or(&path).to_path_buf(),
            None => path,
        };
        if relative.as_os_str().is_empty() {
            continue;
        }
        let out = out_dir.join(&relative);
        if is_dir {
            fs::create_dir_all(&out).map_err(|e| BotError::io(&out, e))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|e| BotError::io(parent, e))?;
        }
        let mut file = archive.by_index(i).map_err(archive_err)?;
        let mut target = fs::File::create(&out).map_err(|e| BotError::io(&out, e))?;
        io::copy(&mut file, &mut target).map_err(|e| BotError::io(&out, e))?;
        debug!(path = %relative.display(), "Extracted");
        written += 1;
    }
    Ok(written)
}

/// When every entry sits under one folder named like the destination (an
/// archive of the `commands/` folder itself), return that folder so it can
/// be stripped.
fn shared_root(entries: &[(usize, PathBuf, bool)], dest_name: &OsStr) -> Option<PathBuf> {
    let all_under = !entries.is_empty()
        && entries.iter().all(|(_, path, _)| {
            matches!(path.components().next(), Some(Component::Normal(first)) if first == dest_name)
        });
    all_under.then(|| PathBuf::from(dest_name))
}
