//! Generator module provides the archive writing interface and its implementations.
//!
//! This module contains the common interface for archive generators, the
//! [`build_archive`] routine that drives one of them over a classified file list,
//! and the CBZ implementation.

use crate::error::{Error, Result};
use crate::path_utils::archive_entry_name;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

pub mod cbz;

/// Common interface for all archive generators.
///
/// A generator owns exactly one output file from [`create`](Generator::create)
/// until it is either [`save`](Generator::save)d or [`discard`](Generator::discard)ed.
#[async_trait]
pub trait Generator {
    /// Creates the output file. Fails with [`Error::OutputExists`] if it is already there.
    ///
    /// # Parameters
    /// * `output_path` - Full path of the archive to write
    ///
    /// # Returns
    /// * `Result<Self>` - A new generator instance or an error if creation fails
    fn create(output_path: &Path) -> Result<Self>
    where
        Self: Sized;

    /// Adds one file to the archive.
    ///
    /// # Parameters
    /// * `entry_name` - Slash-separated name inside the archive
    /// * `source` - File whose content and metadata are stored
    ///
    /// # Returns
    /// * `Result<&mut Self>` - Self reference for method chaining, or an error if failed
    async fn add_entry(&mut self, entry_name: &str, source: &Path) -> Result<&mut Self>
    where
        Self: Sized;

    /// Finalizes the archive and closes the output file.
    async fn save(self) -> Result<()>;

    /// Abandons the archive and removes the partially written output file.
    async fn discard(self) -> Result<()>;
}

/// Writes `files` (absolute paths below `source_dir`) into a fresh archive at
/// `output_path`, naming every entry by its path relative to `source_dir`.
///
/// The archive is all-or-nothing: on any failure the partially written file is
/// removed before the error is returned.
///
/// # Returns
///
/// * `Ok(usize)` - Number of entries written
/// * `Err(Error::NoContent)` - `files` is empty; nothing was created
/// * `Err(Error)` - Creating, writing or finalizing the archive failed
pub async fn build_archive<G>(source_dir: &Path, files: &[PathBuf], output_path: &Path) -> Result<usize>
where
    G: Generator + Send,
{
    if files.is_empty() {
        return Err(Error::NoContent(source_dir.to_path_buf()));
    }

    let mut generator = G::create(output_path)?;

    for file in files {
        let added = match archive_entry_name(source_dir, file) {
            Ok(entry_name) => generator.add_entry(&entry_name, file).await.map(|_| ()),
            Err(e) => Err(e),
        };

        if let Err(e) = added {
            return match generator.discard().await {
                Ok(()) => Err(e),
                Err(cleanup) => Err(partial_archive_error(e, cleanup)),
            };
        }
    }

    if let Err(e) = generator.save().await {
        return match remove_partial(output_path).await {
            Ok(()) => Err(e),
            Err(cleanup) => Err(partial_archive_error(e, cleanup)),
        };
    }

    Ok(files.len())
}

/// Removes a partially written output file. A file that is already gone is fine.
pub(crate) async fn remove_partial(output_path: &Path) -> Result<()> {
    match fs::remove_file(output_path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Keeps the original failure visible when removing the partial archive fails too.
fn partial_archive_error(error: Error, cleanup: Error) -> Error {
    Error::Other(format!(
        "{} (partial archive could not be removed: {})",
        error, cleanup
    ))
}
