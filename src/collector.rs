//! Work item discovery.
//!
//! This module turns the user's input roots into an ordered list of [`Job`]s,
//! either one per root ([`CollectionMode::Direct`]) or one per immediate
//! subdirectory of each root ([`CollectionMode::Recursive`]). Unusable inputs are
//! reported and skipped; collection itself never fails.

use std::collections::HashSet;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, ReadDir, read_dir};

use crate::path_utils::{absolute_path, get_file_name_lossy, path_to_string_lossy};
use crate::reporter::Reporter;
use crate::types::{CollectionMode, FilterMode, Job};

/// Discovers jobs below a set of input roots.
pub struct Collector<'a> {
    output_dir: &'a Path,
    mode: CollectionMode,
    filter_mode: FilterMode,
    reporter: &'a dyn Reporter,
}

impl<'a> Collector<'a> {
    /// Creates a new Collector.
    ///
    /// # Arguments
    ///
    /// * `output_dir` - Directory the archives will be written to
    /// * `mode` - One job per root, or one job per child directory of each root
    /// * `filter_mode` - Filter mode stamped on every job
    /// * `reporter` - Receives progress and skip notices
    pub fn new(
        output_dir: &'a Path,
        mode: CollectionMode,
        filter_mode: FilterMode,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            output_dir,
            mode,
            filter_mode,
            reporter,
        }
    }

    /// Collects jobs for `input_roots`, in root order and, within a root, in
    /// lexicographic directory order.
    ///
    /// No two returned jobs share a source directory or an output archive.
    /// An empty result is not an error.
    pub async fn collect(&self, input_roots: &[PathBuf]) -> Vec<Job> {
        let output_dir = absolute_path(self.output_dir).unwrap_or_else(|_| self.output_dir.to_path_buf());
        let mut jobs = JobSet::default();

        for root in input_roots {
            match self.mode {
                CollectionMode::Direct => self.collect_direct(root, &output_dir, &mut jobs).await,
                CollectionMode::Recursive => {
                    self.collect_recursive(root, &output_dir, &mut jobs).await
                }
            }
        }

        jobs.into_jobs()
    }

    async fn collect_direct(&self, root: &Path, output_dir: &Path, jobs: &mut JobSet) {
        let display = path_to_string_lossy(root);

        let metadata = match fs::metadata(root).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.reporter
                    .warn(&format!("Input path does not exist, skipping: {}", display));
                return;
            }
            Err(e) => {
                self.reporter
                    .warn(&format!("Cannot access input path {}: {}", display, e));
                return;
            }
        };

        if !metadata.is_dir() {
            self.reporter
                .warn(&format!("Input path is not a directory, skipping: {}", display));
            return;
        }

        let source_path = match absolute_path(root) {
            Ok(path) => path,
            Err(e) => {
                self.reporter
                    .warn(&format!("Failed to resolve path {}: {}", display, e));
                return;
            }
        };

        let Some(name) = source_path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            self.reporter
                .warn(&format!("Cannot derive an archive name from {}, skipping", display));
            return;
        };

        match jobs.insert(Job::new(name, source_path, output_dir, self.filter_mode)) {
            Insertion::Added => self.reporter.info(&format!("Input: {}", display)),
            Insertion::DuplicateSource => self
                .reporter
                .warn(&format!("Duplicate path, skipping: {}", display)),
            Insertion::DuplicateOutput(output) => self.reporter.warn(&format!(
                "Output {} is already claimed by another input, skipping: {}",
                get_file_name_lossy(&output),
                display
            )),
        }
    }

    async fn collect_recursive(&self, root: &Path, output_dir: &Path, jobs: &mut JobSet) {
        let display = path_to_string_lossy(root);

        if !fs::try_exists(root).await.unwrap_or(false) {
            self.reporter.warn(&format!(
                "Input directory does not exist, skipping: {}",
                display
            ));
            return;
        }

        let folders = match child_directories(root).await {
            Ok(folders) => folders,
            Err(e) => {
                self.reporter
                    .warn(&format!("Failed to read directory {}: {}", display, e));
                return;
            }
        };

        self.reporter.info(&format!(
            "Input: {} ({} subdirectories)",
            display,
            folders.len()
        ));

        for folder in folders {
            let candidate = root.join(&folder);
            let source_path = match absolute_path(&candidate) {
                Ok(path) => path,
                Err(e) => {
                    self.reporter.warn(&format!(
                        "Failed to resolve path {}: {}",
                        path_to_string_lossy(&candidate),
                        e
                    ));
                    continue;
                }
            };

            let name = folder.to_string_lossy().to_string();
            // Overlapping roots legitimately yield the same child twice.
            if let Insertion::DuplicateOutput(output) =
                jobs.insert(Job::new(name, source_path, output_dir, self.filter_mode))
            {
                self.reporter.warn(&format!(
                    "Output {} is already claimed by another input, skipping: {}",
                    get_file_name_lossy(&output),
                    path_to_string_lossy(&candidate)
                ));
            }
        }
    }
}

/// Names of the immediate child directories of `dir`, sorted. Symlinks are not followed.
pub async fn child_directories(dir: &Path) -> std::io::Result<Vec<OsString>> {
    let mut folders = Vec::new();
    let mut entries: ReadDir = read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            folders.push(entry.file_name());
        }
    }

    folders.sort();
    Ok(folders)
}

enum Insertion {
    Added,
    DuplicateSource,
    DuplicateOutput(PathBuf),
}

/// Ordered job list with uniqueness on source path and on output path.
#[derive(Default)]
struct JobSet {
    jobs: Vec<Job>,
    sources: HashSet<PathBuf>,
    outputs: HashSet<PathBuf>,
}

impl JobSet {
    fn insert(&mut self, job: Job) -> Insertion {
        if self.sources.contains(&job.source_path) {
            return Insertion::DuplicateSource;
        }
        let output_key = output_key(&job.output_path);
        if self.outputs.contains(&output_key) {
            return Insertion::DuplicateOutput(job.output_path);
        }

        self.sources.insert(job.source_path.clone());
        self.outputs.insert(output_key);
        self.jobs.push(job);
        Insertion::Added
    }

    fn into_jobs(self) -> Vec<Job> {
        self.jobs
    }
}

/// Output paths differing only in file name case collide on case-insensitive filesystems.
fn output_key(output_path: &Path) -> PathBuf {
    let file_name = get_file_name_lossy(output_path).to_lowercase();
    output_path.with_file_name(file_name)
}
