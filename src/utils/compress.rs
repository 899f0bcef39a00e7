use std::fs;
use std::io::{Read, Write, BufReader};
use std::path::Path;
use std::time::{Instant, SystemTime};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Datelike, Local, Timelike};
use log::debug;
use zip::{write::FileOptions, ZipWriter};

use crate::constants::{
    COMPRESSION_CHUNK_SIZE as CHUNK_SIZE,
    LARGE_FILE_COMPRESSION_THRESHOLD,
    COMPRESSED_EXTENSIONS
};

/// Capability that packs one file into a single-entry archive.
///
/// Implementations must leave `input` untouched and must name the entry
/// after the base name of `input` only.
pub trait Compressor: Send + Sync {
    fn compress_single_file(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Deflate-based ZIP compressor.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipCompressor;

/// Determine compression options based on file type and size.
///
/// Files that are already compressed (like JPEGs, MP3s) or very large files
/// use the fastest deflate level. The entry keeps the source's modification
/// time when it is representable in ZIP's DOS date format.
pub fn get_compression_options(path: &Path, metadata: &fs::Metadata) -> FileOptions {
    let low_compression = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => COMPRESSED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        _ => false,
    };
    let large_file = metadata.len() > LARGE_FILE_COMPRESSION_THRESHOLD;

    let level = if low_compression || large_file { 1 } else { 6 };

    let mut options = FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .compression_level(Some(level))
        .unix_permissions(0o644)
        .large_file(metadata.len() >= u32::MAX as u64);

    if let Some(modified) = metadata.modified().ok().and_then(to_zip_datetime) {
        options = options.last_modified_time(modified);
    }
    options
}

fn to_zip_datetime(time: SystemTime) -> Option<zip::DateTime> {
    let local: DateTime<Local> = time.into();
    let year = u16::try_from(local.year()).ok()?;
    zip::DateTime::from_date_and_time(
        year,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}

impl Compressor for ZipCompressor {
    fn compress_single_file(&self, input: &Path, output: &Path) -> Result<()> {
        let start = Instant::now();

        let entry_name = input
            .file_name()
            .ok_or_else(|| anyhow!("Invalid file path - no filename component: {}", input.display()))?
            .to_string_lossy()
            .to_string();

        let source = fs::File::open(input)
            .context(format!("Failed to open {}", input.display()))?;
        let metadata = source.metadata()
            .context(format!("Failed to read metadata for {}", input.display()))?;
        let options = get_compression_options(input, &metadata);

        let zip_file = fs::File::create(output)
            .context(format!("Failed to create archive {}", output.display()))?;
        let mut zip = ZipWriter::new(zip_file);

        zip.start_file(entry_name.clone(), options)
            .context(format!("Failed to start file entry for {}", entry_name))?;

        // Stream file content in chunks to avoid large memory usage
        let mut reader = BufReader::new(source);
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            let bytes_read = reader.read(&mut buffer)
                .context(format!("Failed to read from {}", input.display()))?;
            if bytes_read == 0 {
                break;
            }
            zip.write_all(&buffer[..bytes_read])
                .context(format!("Failed to write to archive {}", output.display()))?;
        }

        let zip_file = zip.finish().context("Failed to finalize zip file")?;
        zip_file.sync_all()
            .context(format!("Failed to flush archive {}", output.display()))?;

        debug!("Compressed {} ({} bytes) into {} in {:?}",
               input.display(), metadata.len(), output.display(), start.elapsed());
        Ok(())
    }
}
