//! Core data types and enums for the Tabane conversion library.
//!
//! This module defines the fundamental data structures used throughout Tabane:
//! - Work units (`Job`)
//! - Classification results (`Classification`, `Verdict`, `Reason`, `ClassifiedContent`)
//! - Enumerations for the run settings (`CollectionMode`, `FilterMode`)

use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// File extension given to every generated archive.
pub const ARCHIVE_EXTENSION: &str = "cbz";

/// How input roots are turned into jobs.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollectionMode {
    #[default]
    Direct, // Each input root becomes one archive
    Recursive, // Each immediate subdirectory of an input root becomes one archive
}

/// Which files of a source directory end up in its archive.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FilterMode {
    #[default]
    Smart, // Drop system, VCS and editor files and anything that is not image, text or video
    Dumb, // Archive every file as-is
}

/// One source-directory-to-archive conversion unit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Job {
    /// Display name, also the archive's file stem.
    pub name: String,
    /// Absolute path of the directory to archive.
    pub source_path: PathBuf,
    /// Absolute path of the archive to create.
    pub output_path: PathBuf,
    pub filter_mode: FilterMode,
}

impl Job {
    pub fn new(name: String, source_path: PathBuf, output_dir: &Path, filter_mode: FilterMode) -> Self {
        let output_path = output_dir.join(format!("{}.{}", name, ARCHIVE_EXTENSION));
        Self {
            name,
            source_path,
            output_path,
            filter_mode,
        }
    }

    pub fn is_dumb(&self) -> bool {
        self.filter_mode == FilterMode::Dumb
    }
}

/// Whether a file goes into the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Include,
    Exclude,
}

/// Which rule produced a [`Verdict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    SystemFile,
    Vcs,
    Ide,
    Extension,
    MimeSniff,
    FailOpen,
}

/// Per-file classification decision. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub reason: Reason,
}

impl Classification {
    pub const fn include(reason: Reason) -> Self {
        Self {
            verdict: Verdict::Include,
            reason,
        }
    }

    pub const fn exclude(reason: Reason) -> Self {
        Self {
            verdict: Verdict::Exclude,
            reason,
        }
    }

    pub fn is_included(&self) -> bool {
        self.verdict == Verdict::Include
    }
}

/// Outcome of classifying one source directory.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedContent {
    pub source_dir: PathBuf,
    /// Paths relative to `source_dir`, sorted.
    pub included: Vec<PathBuf>,
    /// Number of distinct excluded file names.
    pub excluded_count: usize,
}

impl ClassifiedContent {
    /// Included files joined back onto the source directory.
    pub fn absolute_paths(&self) -> Vec<PathBuf> {
        self.included
            .iter()
            .map(|relative| self.source_dir.join(relative))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }
}
