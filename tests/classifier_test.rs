//! Tests for smart and dumb content classification on real directories.

use std::path::PathBuf;
use tabane::classifier;
use tabane::error::{Error, Result};
use tabane::prelude::*;

mod common;
use common::{create_dummy_jpeg, create_dummy_png, setup_test_dirs, write_file};

#[tokio::test]
async fn test_smart_mode_exclusion_scenario() -> Result<()> {
    let test_dirs = setup_test_dirs("smart_exclusion").await;
    let source = &test_dirs.source_dir;
    create_dummy_jpeg(&source.join("page1.jpg")).await?;
    write_file(&source.join(".DS_Store"), &[0x00, 0x00, 0x00, 0x01, b'B', b'u', b'd', b'1']).await?;
    write_file(&source.join(".git").join("config"), b"[core]\n\tbare = false\n").await?;
    write_file(&source.join("readme.md"), b"# Chapter 1\n").await?;

    let reporter = MemoryReporter::new();
    let content = classifier::classify(source, FilterMode::Smart, &reporter)?;

    assert_eq!(
        content.included,
        vec![PathBuf::from("page1.jpg"), PathBuf::from("readme.md")]
    );
    assert_eq!(content.excluded_count, 2);
    assert!(reporter.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_smart_mode_sniffs_content_not_names() -> Result<()> {
    let test_dirs = setup_test_dirs("smart_sniff").await;
    let source = &test_dirs.source_dir;
    // A PNG with a misleading name is still an image
    create_dummy_png(&source.join("page2.dat")).await?;
    // Plain text without a known extension
    write_file(&source.join("CREDITS"), b"Scans by nobody in particular\n").await?;
    // Binary junk with an image-like name
    write_file(&source.join("broken.jpg"), &[0x00, 0x13, 0x37, 0x00, 0xFF, 0x00, 0x01]).await?;
    write_file(&source.join("empty.bin"), b"").await?;

    let reporter = MemoryReporter::new();
    let content = classifier::classify(source, FilterMode::Smart, &reporter)?;

    assert_eq!(
        content.included,
        vec![PathBuf::from("CREDITS"), PathBuf::from("page2.dat")]
    );
    assert_eq!(content.excluded_count, 2);
    Ok(())
}

#[tokio::test]
async fn test_smart_mode_excludes_editor_and_nested_vcs_files() -> Result<()> {
    let test_dirs = setup_test_dirs("smart_editor").await;
    let source = &test_dirs.source_dir;
    create_dummy_jpeg(&source.join("extras").join("001.jpg")).await?;
    write_file(&source.join(".vscode").join("settings.json"), b"{}").await?;
    write_file(&source.join("notes.txt~"), b"old notes").await?;
    write_file(&source.join(".notes.txt.swp"), b"swap").await?;
    write_file(&source.join("extras").join(".gitignore"), b"*.tmp\n").await?;
    write_file(&source.join("extras").join("Thumbs.db"), &[0xD0, 0xCF, 0x11, 0xE0, 0x00]).await?;
    write_file(&source.join("Thumbs.db"), &[0xD0, 0xCF, 0x11, 0xE0, 0x00]).await?;

    let reporter = MemoryReporter::new();
    let content = classifier::classify(source, FilterMode::Smart, &reporter)?;

    assert_eq!(content.included, vec![PathBuf::from("extras/001.jpg")]);
    // Two Thumbs.db files count once
    assert_eq!(content.excluded_count, 5);
    Ok(())
}

#[tokio::test]
async fn test_dumb_mode_keeps_every_file() -> Result<()> {
    let test_dirs = setup_test_dirs("dumb_totality").await;
    let source = &test_dirs.source_dir;
    create_dummy_jpeg(&source.join("page1.jpg")).await?;
    write_file(&source.join(".DS_Store"), &[0x00, 0x01]).await?;
    write_file(&source.join(".git").join("config"), b"[core]\n").await?;
    write_file(&source.join("data.bin"), &[0x00, 0xFF, 0x00]).await?;
    write_file(&source.join("empty"), b"").await?;

    let reporter = MemoryReporter::new();
    let content = classifier::classify(source, FilterMode::Dumb, &reporter)?;

    assert_eq!(
        content.included,
        vec![
            PathBuf::from(".DS_Store"),
            PathBuf::from(".git/config"),
            PathBuf::from("data.bin"),
            PathBuf::from("empty"),
            PathBuf::from("page1.jpg"),
        ]
    );
    assert_eq!(content.excluded_count, 0);
    assert_eq!(content.absolute_paths()[4], source.join("page1.jpg"));
    Ok(())
}

#[tokio::test]
async fn test_smart_mode_only_excluded_files_is_empty() -> Result<()> {
    let test_dirs = setup_test_dirs("smart_only_excluded").await;
    write_file(&test_dirs.source_dir.join(".DS_Store"), &[0x00]).await?;

    let reporter = MemoryReporter::new();
    let content = classifier::classify(&test_dirs.source_dir, FilterMode::Smart, &reporter)?;

    assert!(content.is_empty());
    assert_eq!(content.excluded_count, 1);
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_smart_mode_includes_unreadable_files() -> Result<()> {
    let test_dirs = setup_test_dirs("smart_fail_open").await;
    let source = &test_dirs.source_dir;
    create_dummy_jpeg(&source.join("001.jpg")).await?;
    // A dangling link cannot be opened, whoever runs the test
    tokio::fs::symlink(source.join("gone.jpg"), source.join("002.jpg")).await?;

    let reporter = MemoryReporter::new();
    let content = classifier::classify(source, FilterMode::Smart, &reporter)?;

    assert_eq!(
        content.included,
        vec![PathBuf::from("001.jpg"), PathBuf::from("002.jpg")]
    );
    assert_eq!(content.excluded_count, 0);

    let warnings = reporter.messages(Level::Warning);
    assert_eq!(warnings, vec!["Could not analyze file 002.jpg, including anyway".to_string()]);
    assert_eq!(reporter.events().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_classify_missing_directory_fails() -> Result<()> {
    let test_dirs = setup_test_dirs("classify_missing").await;
    let missing = test_dirs.source_dir.join("gone");

    let reporter = MemoryReporter::new();
    let result = classifier::classify(&missing, FilterMode::Smart, &reporter);

    assert!(matches!(result, Err(Error::Walk(_))));
    Ok(())
}
