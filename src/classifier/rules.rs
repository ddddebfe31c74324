//! Ordered classification rules.
//!
//! A [`ClassificationPolicy`] is a list of [`Rule`]s evaluated in order; the first
//! rule that reaches a decision wins. Rules only see a file through the
//! [`FileProbe`] trait, so the whole policy can be exercised without touching the
//! filesystem.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

use super::sniff::{SNIFF_LEN, detect_media_type, is_useful_media_type, read_head};
use crate::types::{Classification, Reason};

lazy_static! {
    /// Operating system and media manager droppings, matched exactly (lowercase).
    static ref SYSTEM_FILES: HashSet<&'static str> = [
        ".ds_store",
        "thumbs.db",
        "desktop.ini",
        ".directory",
        "folder.jpg",
        "albumartsmall.jpg",
        ".picasa.ini",
    ]
    .into_iter()
    .collect();

    /// Text metadata that is always kept.
    static ref TEXT_EXTENSIONS: HashSet<&'static str> = [
        ".txt", ".md", ".nfo", ".info", ".readme", ".description", ".notes",
    ]
    .into_iter()
    .collect();

    /// Supplementary video content that is always kept.
    static ref VIDEO_EXTENSIONS: HashSet<&'static str> = [
        ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v",
    ]
    .into_iter()
    .collect();

    /// Editor swap and backup files.
    static ref BACKUP_SUFFIX_REGEX: Regex = Regex::new(r"(\.sw[op]|~)$").unwrap();
}

/// Version control markers, matched as substrings (lowercase).
const VCS_MARKERS: [&str; 7] = [
    ".git",
    ".svn",
    ".hg",
    ".bzr",
    ".gitignore",
    ".gitattributes",
    ".hgignore",
];

/// IDE and editor markers, matched as substrings (lowercase).
const IDE_MARKERS: [&str; 3] = [".vscode", ".idea", ".sublime-"];

/// Read-only view of a file under classification.
pub trait FileProbe {
    /// Final path component.
    fn file_name(&self) -> &str;

    /// Directory names between the source directory and the file, outermost first.
    fn ancestors(&self) -> &[String];

    /// Up to `limit` leading bytes of the content.
    fn read_head(&self, limit: usize) -> io::Result<Vec<u8>>;
}

/// A file on disk, located below a source directory.
#[derive(Debug, Clone)]
pub struct DiskProbe {
    path: PathBuf,
    file_name: String,
    ancestors: Vec<String>,
}

impl DiskProbe {
    /// # Arguments
    ///
    /// * `path` - Full path of the file
    /// * `relative` - The same file relative to the source directory
    pub fn new(path: &Path, relative: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let ancestors = relative
            .parent()
            .map(|parent| {
                parent
                    .iter()
                    .map(|part| part.to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            file_name,
            ancestors,
        }
    }
}

impl FileProbe for DiskProbe {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    fn read_head(&self, limit: usize) -> io::Result<Vec<u8>> {
        let mut head = read_head(&self.path)?;
        head.truncate(limit);
        Ok(head)
    }
}

/// A single step of the classification policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Excludes system, VCS and editor files, by file name or by any enclosing directory name.
    NameExclusion,
    /// Includes known text and video extensions without reading them.
    ExtensionAllowlist,
    /// Includes image, text and video content, excludes everything else.
    /// Abstains when the file cannot be read.
    ContentSniff,
    /// Includes unconditionally.
    FailOpen,
}

impl Rule {
    /// Returns a decision, or `None` to defer to the next rule.
    pub fn evaluate(&self, probe: &dyn FileProbe) -> Option<Classification> {
        match self {
            Rule::NameExclusion => std::iter::once(probe.file_name())
                .chain(probe.ancestors().iter().map(String::as_str))
                .find_map(name_exclusion_reason)
                .map(Classification::exclude),
            Rule::ExtensionAllowlist => dotted_extension(probe.file_name())
                .filter(|ext| {
                    TEXT_EXTENSIONS.contains(ext.as_str()) || VIDEO_EXTENSIONS.contains(ext.as_str())
                })
                .map(|_| Classification::include(Reason::Extension)),
            Rule::ContentSniff => {
                let head = probe.read_head(SNIFF_LEN).ok()?;
                if is_useful_media_type(detect_media_type(&head)) {
                    Some(Classification::include(Reason::MimeSniff))
                } else {
                    Some(Classification::exclude(Reason::MimeSniff))
                }
            }
            Rule::FailOpen => Some(Classification::include(Reason::FailOpen)),
        }
    }
}

/// Ordered rule list. Files no rule decides on are included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationPolicy {
    rules: Vec<Rule>,
}

impl ClassificationPolicy {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Name exclusion, extension allowlist, content sniff, fail-open.
    pub fn smart() -> Self {
        Self::new(vec![
            Rule::NameExclusion,
            Rule::ExtensionAllowlist,
            Rule::ContentSniff,
            Rule::FailOpen,
        ])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn classify(&self, probe: &dyn FileProbe) -> Classification {
        self.rules
            .iter()
            .find_map(|rule| rule.evaluate(probe))
            .unwrap_or(Classification::include(Reason::FailOpen))
    }
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self::smart()
    }
}

/// Why a file or directory name marks unwanted content, if it does.
pub fn name_exclusion_reason(name: &str) -> Option<Reason> {
    let name = name.to_lowercase();

    if SYSTEM_FILES.contains(name.as_str()) {
        return Some(Reason::SystemFile);
    }
    if VCS_MARKERS.iter().any(|marker| name.contains(marker)) {
        return Some(Reason::Vcs);
    }
    if IDE_MARKERS.iter().any(|marker| name.contains(marker)) || BACKUP_SUFFIX_REGEX.is_match(&name)
    {
        return Some(Reason::Ide);
    }
    None
}

/// Lowercased extension including the dot, taken from the last `.` of the name.
/// A name that starts with its only dot (`.nfo`) is all extension.
pub fn dotted_extension(file_name: &str) -> Option<String> {
    file_name
        .rfind('.')
        .map(|index| file_name[index..].to_lowercase())
}
