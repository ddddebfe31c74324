//! Content classification: decides which files of a source directory go into its archive.
//!
//! In [`FilterMode::Dumb`] every file is kept. In [`FilterMode::Smart`] each file
//! is run through a [`ClassificationPolicy`] during a single recursive walk.
//!
//! Classification is blocking filesystem work; the worker pool calls it from
//! tokio's blocking thread pool.

use std::collections::HashSet;
use std::path::Path;

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::reporter::Reporter;
use crate::types::{ClassifiedContent, FilterMode, Reason, Verdict};

pub mod rules;
pub mod sniff;

pub use rules::{ClassificationPolicy, DiskProbe, FileProbe, Rule};

/// Classifies every file below `source_dir` with the default smart policy, or
/// keeps all of them in dumb mode.
///
/// # Arguments
///
/// * `source_dir` - Directory to walk
/// * `filter_mode` - Smart filtering or pass-through
/// * `reporter` - Receives a warning for every file included because it could not be read
///
/// # Returns
///
/// * `Ok(ClassifiedContent)` - Included files relative to `source_dir`, sorted
/// * `Err(Error)` - The directory walk itself failed
pub fn classify(
    source_dir: &Path,
    filter_mode: FilterMode,
    reporter: &dyn Reporter,
) -> Result<ClassifiedContent> {
    match filter_mode {
        FilterMode::Dumb => collect_all(source_dir),
        FilterMode::Smart => classify_with(source_dir, &ClassificationPolicy::smart(), reporter),
    }
}

/// Smart classification with an explicit policy.
pub fn classify_with(
    source_dir: &Path,
    policy: &ClassificationPolicy,
    reporter: &dyn Reporter,
) -> Result<ClassifiedContent> {
    let mut included = Vec::new();
    let mut excluded_names: HashSet<String> = HashSet::new();

    for entry in WalkDir::new(source_dir).min_depth(1) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let relative = relative_to(source_dir, entry.path())?;
        let probe = DiskProbe::new(entry.path(), &relative);
        let decision = policy.classify(&probe);

        match decision.verdict {
            Verdict::Include => {
                if decision.reason == Reason::FailOpen {
                    reporter.warn(&format!(
                        "Could not analyze file {}, including anyway",
                        probe.file_name()
                    ));
                }
                included.push(relative);
            }
            Verdict::Exclude => {
                excluded_names.insert(probe.file_name().to_string());
            }
        }
    }

    included.par_sort();

    Ok(ClassifiedContent {
        source_dir: source_dir.to_path_buf(),
        included,
        excluded_count: excluded_names.len(),
    })
}

/// Every non-directory entry below `source_dir`, sorted.
fn collect_all(source_dir: &Path) -> Result<ClassifiedContent> {
    let mut included = Vec::new();

    for entry in WalkDir::new(source_dir).min_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            included.push(relative_to(source_dir, entry.path())?);
        }
    }

    included.par_sort();

    Ok(ClassifiedContent {
        source_dir: source_dir.to_path_buf(),
        included,
        excluded_count: 0,
    })
}

fn relative_to(base: &Path, path: &Path) -> Result<std::path::PathBuf> {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .map_err(|_| Error::InvalidPath(path.to_path_buf(), "Escaped the source directory".into()))
}
