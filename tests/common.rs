//! Common test utilities and constants for the Tabane crate.
//!
//! Provides functions for setting up test directories, creating dummy image
//! and text files, and reading generated archives back.

use image::{Rgb, RgbImage};
use rand::{Rng, distributions::Alphanumeric};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tabane::error::{Error, Result};
use tokio::fs;

#[allow(dead_code)]
pub const TEST_TMP_DIR: &str = "tests/tmp";
#[allow(dead_code)]
pub const TEST_TIMEOUT: Duration = Duration::from_secs(30);
#[allow(dead_code)]
pub const LONG_TEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Directories of a single test: a unique base with `source` and `target` inside.
#[allow(dead_code)]
pub struct TestDirs {
    pub base_dir: PathBuf,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
}

/// Creates a clean, uniquely named test directory with `source` and `target`
/// subdirectories. The target is left empty so tests can check what a run created.
#[allow(dead_code)]
pub async fn setup_test_dirs(sub_path: &str) -> TestDirs {
    let rand_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let unique_sub_path = format!("{}-{}", sub_path, rand_string);
    let base_dir = PathBuf::from(TEST_TMP_DIR).join(unique_sub_path);
    if base_dir.exists() {
        fs::remove_dir_all(&base_dir).await.unwrap();
    }
    let source_dir = base_dir.join("source");
    let target_dir = base_dir.join("target");

    fs::create_dir_all(&source_dir).await.unwrap();
    fs::create_dir_all(&target_dir).await.unwrap();

    TestDirs {
        base_dir,
        source_dir,
        target_dir,
    }
}

/// Creates a small solid-color image at the given path, encoded as `format`.
#[allow(dead_code)]
pub async fn create_dummy_image(path: &Path, format: image::ImageFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let mut img = RgbImage::new(32, 32);
    for x in 0..32 {
        for y in 0..32 {
            img.put_pixel(x, y, Rgb([200, (x * 8) as u8, (y * 8) as u8]));
        }
    }
    let path_clone = path.to_path_buf();
    tokio::task::spawn_blocking(move || img.save_with_format(path_clone, format))
        .await?
        .map_err(|e| Error::Other(e.to_string()))?;
    Ok(())
}

/// Creates a dummy JPEG page at the given path.
#[allow(dead_code)]
pub async fn create_dummy_jpeg(path: &Path) -> Result<()> {
    create_dummy_image(path, image::ImageFormat::Jpeg).await
}

/// Creates a dummy PNG page at the given path.
#[allow(dead_code)]
pub async fn create_dummy_png(path: &Path) -> Result<()> {
    create_dummy_image(path, image::ImageFormat::Png).await
}

/// Writes `content` to `path`, creating parent directories as needed.
#[allow(dead_code)]
pub async fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, content).await?;
    Ok(())
}

/// Creates a chapter folder with `pages` JPEG pages named `001.jpg`, `002.jpg`, ...
#[allow(dead_code)]
pub async fn create_chapter(dir: &Path, pages: usize) -> Result<()> {
    for page in 1..=pages {
        create_dummy_jpeg(&dir.join(format!("{:03}.jpg", page))).await?;
    }
    Ok(())
}

/// Checks that a file exists and is a readable ZIP archive with at least one entry.
#[allow(dead_code)]
pub async fn assert_valid_zip_file(path: &Path) {
    assert!(path.exists(), "Output ZIP file does not exist: {:?}", path);
    assert!(path.is_file(), "Output ZIP path is not a file: {:?}", path);

    let file = fs::File::open(path).await.unwrap();
    let file_std = file.into_std().await;
    let zip = zip::ZipArchive::new(file_std).unwrap();
    assert!(zip.len() > 0, "Output ZIP file is empty: {:?}", path);
}

/// Entry names of an archive, sorted.
#[allow(dead_code)]
pub async fn archive_entry_names(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).await.unwrap();
    let file_std = file.into_std().await;
    let archive = zip::ZipArchive::new(file_std).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// Raw bytes of one archive entry.
#[allow(dead_code)]
pub async fn read_archive_entry(path: &Path, entry_name: &str) -> Vec<u8> {
    let file = fs::File::open(path).await.unwrap();
    let file_std = file.into_std().await;
    let mut archive = zip::ZipArchive::new(file_std).unwrap();
    let mut entry = archive.by_name(entry_name).unwrap();
    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    content
}

/// Compression method of one archive entry.
#[allow(dead_code)]
pub async fn archive_entry_compression(path: &Path, entry_name: &str) -> zip::CompressionMethod {
    let file = fs::File::open(path).await.unwrap();
    let file_std = file.into_std().await;
    let mut archive = zip::ZipArchive::new(file_std).unwrap();
    let entry = archive.by_name(entry_name).unwrap();
    entry.compression()
}

/// Names of the `.cbz` files in `dir`, sorted.
#[allow(dead_code)]
pub async fn list_archives(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(".cbz") {
            names.push(name);
        }
    }
    names.sort();
    names
}
