use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::SourceError;
use crate::models::SourceFile;

/// Collect every regular file under `root`, oldest first.
///
/// Ties on modification time are broken by relative path so the order is
/// deterministic. Symlinks are not followed and are never returned. Entries
/// that cannot be read are logged and skipped.
pub fn enumerate_source(root: &Path) -> Result<Vec<SourceFile>, SourceError> {
    let root_meta = match fs::metadata(root) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SourceError::NotFound(root.to_path_buf()))
        }
        Err(e) => {
            return Err(SourceError::Io {
                path: root.to_path_buf(),
                source: e,
            })
        }
    };
    if !root_meta.is_dir() {
        return Err(SourceError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(SourceError::Io {
                    path: root.to_path_buf(),
                    source: e.into(),
                })
            }
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Skipping {}: failed to read metadata: {}", entry.path().display(), e);
                continue;
            }
        };
        let modified = match metadata.modified() {
            Ok(time) => DateTime::<Utc>::from(time),
            Err(e) => {
                warn!("Skipping {}: no modification time: {}", entry.path().display(), e);
                continue;
            }
        };

        let relative = match entry.path().strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        files.push(SourceFile {
            path: entry.path().to_path_buf(),
            relative_path,
            modified,
            size: metadata.len(),
        });
    }

    if files.is_empty() {
        return Err(SourceError::EmptySource(root.to_path_buf()));
    }

    files.sort_by(|a, b| {
        a.modified
            .cmp(&b.modified)
            .then_with(|| a.relative_path.cmp(&b.relative_path))
    });
    debug!("Found {} files under {}", files.len(), root.display());
    Ok(files)
}
