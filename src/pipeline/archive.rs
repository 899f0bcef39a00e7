use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use crate::constants::ARCHIVE_EXTENSION;
use crate::error::ArchiveError;
use crate::models::SourceFile;
use crate::utils::compress::Compressor;

/// A compressed archive sitting in the scratch directory.
///
/// The file is removed when this value is dropped, so an archive can never
/// outlive the processing step that created it, whichever way that step ends.
#[derive(Debug)]
pub struct ScratchArchive {
    path: PathBuf,
    size: u64,
    armed: bool,
}

impl ScratchArchive {
    fn pending(path: PathBuf) -> Self {
        ScratchArchive { path, size: 0, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Remove the archive now and report whether that worked.
    pub fn discard(mut self) -> io::Result<()> {
        self.armed = false;
        remove_if_present(&self.path)
    }
}

impl Drop for ScratchArchive {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = remove_if_present(&self.path) {
            warn!("Failed to remove scratch archive {}: {}", self.path.display(), e);
        }
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Packs one source file at a time into `<scratch>/<file-name>.zip`.
pub struct Archiver {
    compressor: Arc<dyn Compressor>,
    scratch_dir: PathBuf,
}

impl Archiver {
    pub fn new(compressor: Arc<dyn Compressor>, scratch_dir: impl Into<PathBuf>) -> Self {
        Archiver {
            compressor,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Scratch location the archive for `file` is written to
    pub fn archive_path(&self, file: &SourceFile) -> PathBuf {
        self.scratch_dir
            .join(format!("{}.{}", file.file_name(), ARCHIVE_EXTENSION))
    }

    /// Compress `file` into the scratch directory.
    ///
    /// Compression runs on the blocking pool. A partially written archive is
    /// removed before the error is returned.
    pub async fn archive(&self, file: &SourceFile) -> Result<ScratchArchive, ArchiveError> {
        let mut archive = ScratchArchive::pending(self.archive_path(file));
        let compressor = Arc::clone(&self.compressor);
        let input = file.path.clone();
        let output = archive.path.clone();

        let failed = |reason: String| ArchiveError {
            path: file.path.clone(),
            reason,
        };

        tokio::task::spawn_blocking(move || compressor.compress_single_file(&input, &output))
            .await
            .map_err(|e| failed(format!("compression task failed: {}", e)))?
            .map_err(|e| failed(format!("{:#}", e)))?;

        archive.size = fs::metadata(&archive.path)
            .map_err(|e| failed(format!("archive missing after compression: {}", e)))?
            .len();

        debug!(
            "Archived {} ({} bytes) to {} ({} bytes)",
            file.relative_path,
            file.size,
            archive.path.display(),
            archive.size
        );
        Ok(archive)
    }
}
