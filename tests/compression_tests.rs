//! Integration tests for single-file archives.

use std::fs;
use std::io::Read;

use anyhow::Result;
use tempfile::TempDir;
use zip::ZipArchive;

use s3_archiver::utils::compress::{Compressor, ZipCompressor};

/// A large incompressible file round-trips intact through the archive
#[test]
fn test_large_binary_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("capture.pcap");
    let data: Vec<u8> = (0..3_000_000u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8).collect();
    fs::write(&input, &data)?;

    let output = temp_dir.path().join("capture.pcap.zip");
    ZipCompressor.compress_single_file(&input, &output)?;

    let mut archive = ZipArchive::new(fs::File::open(&output)?)?;
    let mut entry = archive.by_name("capture.pcap")?;
    let mut restored = Vec::new();
    entry.read_to_end(&mut restored)?;
    assert_eq!(restored, data);
    Ok(())
}

/// Repetitive text shrinks
#[test]
fn test_text_compresses() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("app.log");
    fs::write(&input, "INFO request served in 3ms\n".repeat(20_000))?;

    let output = temp_dir.path().join("app.log.zip");
    ZipCompressor.compress_single_file(&input, &output)?;

    assert!(fs::metadata(&output)?.len() < fs::metadata(&input)?.len() / 10);
    Ok(())
}

/// Non-ASCII names survive as the entry name
#[test]
fn test_unicode_file_name() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("résumé 2024.txt");
    fs::write(&input, b"cv")?;

    let output = temp_dir.path().join("out.zip");
    ZipCompressor.compress_single_file(&input, &output)?;

    let mut archive = ZipArchive::new(fs::File::open(&output)?)?;
    assert_eq!(archive.by_index(0)?.name(), "résumé 2024.txt");
    Ok(())
}
