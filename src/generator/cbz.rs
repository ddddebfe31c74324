use crate::error::{Error, Result};
use crate::generator::{Generator, remove_partial};
use crate::path_utils::path_to_string_lossy;
use async_trait::async_trait;
use chrono::{Datelike, Local, Timelike};
use memmap2::MmapOptions;
use std::fs::{File, Metadata, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::task::spawn_blocking;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Entries at or above this size need ZIP64 headers.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// A generator for creating CBZ (Comic Book ZIP) files.
///
/// Every entry is deflate-compressed and carries the modification time and
/// (on unix) the permission bits of its source file. No metadata file is added.
pub struct Cbz {
    zip: Option<ZipWriter<File>>,
    output_path: PathBuf,
    entry_count: usize,
}

impl Cbz {
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }
}

#[async_trait]
impl Generator for Cbz {
    fn create(output_path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(output_path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => Error::OutputExists(output_path.to_path_buf()),
                _ => Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create CBZ file '{}': {}",
                        path_to_string_lossy(output_path),
                        e
                    ),
                )),
            })?;

        Ok(Cbz {
            zip: Some(ZipWriter::new(file)),
            output_path: output_path.to_path_buf(),
            entry_count: 0,
        })
    }

    async fn add_entry(&mut self, entry_name: &str, source: &Path) -> Result<&mut Self> {
        let mut zip = match self.zip.take() {
            Some(z) => z,
            None => {
                return Err(Error::Other("Zip writer not available".to_string()));
            }
        };

        let entry_name = entry_name.to_string();
        let source = source.to_path_buf();

        // The writer travels into the blocking task and comes back on success.
        let zip = spawn_blocking(move || -> Result<ZipWriter<File>> {
            write_entry(&mut zip, &entry_name, &source)?;
            Ok(zip)
        })
        .await??;

        self.zip = Some(zip);
        self.entry_count += 1;

        Ok(self)
    }

    async fn save(mut self) -> Result<()> {
        let zip = match self.zip.take() {
            Some(z) => z,
            None => {
                return Err(Error::Other("Zip writer not available".to_string()));
            }
        };

        spawn_blocking(move || match zip.finish() {
            Ok(_) => Ok(()),
            Err(e) => Err(Error::Zip(e)),
        })
        .await??;

        Ok(())
    }

    async fn discard(mut self) -> Result<()> {
        if let Some(zip) = self.zip.take() {
            spawn_blocking(move || drop(zip)).await?;
        }
        remove_partial(&self.output_path).await
    }
}

fn write_entry(zip: &mut ZipWriter<File>, entry_name: &str, source: &Path) -> Result<()> {
    let file = File::open(source).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to open file '{}': {}",
                path_to_string_lossy(source),
                e
            ),
        ))
    })?;
    let metadata = file.metadata()?;

    zip.start_file(entry_name, entry_options(&metadata))?;

    // Zero-length files cannot be mapped; their entry simply stays empty.
    if metadata.len() > 0 {
        // SAFETY: the map is read-only and dropped before this function returns.
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        zip.write_all(&mmap[..])?;
    }

    Ok(())
}

fn entry_options(metadata: &Metadata) -> SimpleFileOptions {
    let mut options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.len() >= ZIP64_THRESHOLD);

    if let Some(modified) = metadata.modified().ok().and_then(to_zip_datetime) {
        options = options.last_modified_time(modified);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(metadata.permissions().mode());
    }

    options
}

/// Local wall-clock time of `time`, if it fits the DOS date range (1980-2107).
fn to_zip_datetime(time: SystemTime) -> Option<zip::DateTime> {
    let local: chrono::DateTime<Local> = time.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}
