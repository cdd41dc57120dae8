use crate::errors::Result;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// A verbatim substring substitution applied to file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub old: String,
    pub new: String,
    /// Human-readable name shown in the dry-run summary.
    pub label: String,
}

impl Replacement {
    pub fn new(old: impl Into<String>, new: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
            label: label.into(),
        }
    }

    /// A replacement is a no-op when nothing would change.
    pub fn is_noop(&self) -> bool {
        is_noop(&self.old, &self.new)
    }
}

/// Occurrence totals for one replacement across a set of files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccurrenceCount {
    /// Total number of non-overlapping occurrences.
    pub occurrences: usize,
    /// Number of files containing at least one occurrence.
    pub files: usize,
}

fn is_noop(old: &str, new: &str) -> bool {
    old.is_empty() || old == new
}

/// Why a file's contents can't be edited.
fn unreadable_reason(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => String::from_utf8(bytes).err().map(|e| format!("not valid UTF-8: {e}")),
        Err(e) => Some(e.to_string()),
    }
}

/// Reads a file as UTF-8, returning `None` when it can't.
///
/// Files are expected to have gone through `retain_decodable` first, so a
/// failure here is only logged at debug level.
fn read_text(path: &Path) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping unreadable file");
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping file that is not valid UTF-8");
            None
        }
    }
}

/// Drops files that cannot be read or are not valid UTF-8.
///
/// Each dropped path is warned about once: paths already in `reported` are
/// dropped silently, new ones are warned about and added.
pub fn retain_decodable(files: Vec<PathBuf>, reported: &mut HashSet<PathBuf>) -> Vec<PathBuf> {
    files
        .into_iter()
        .filter(|path| match unreadable_reason(path) {
            None => true,
            Some(reason) => {
                if reported.insert(path.clone()) {
                    warn!(path = %path.display(), %reason, "skipping file");
                }
                false
            }
        })
        .collect()
}

/// Counts how many times `old` appears across `files`.
///
/// Matching is non-overlapping and left to right, the same rule `str::replace`
/// uses, so the count equals what `replace_in_files` will substitute.
pub fn count_replacements(files: &[PathBuf], old: &str, new: &str) -> OccurrenceCount {
    let mut count = OccurrenceCount::default();
    if is_noop(old, new) {
        return count;
    }

    for path in files {
        let Some(content) = read_text(path) else {
            continue;
        };
        let found = content.matches(old).count();
        if found > 0 {
            count.occurrences += found;
            count.files += 1;
        }
    }
    count
}

/// Replaces every occurrence of `old` with `new` in the contents of `files`.
///
/// Returns the number of occurrences replaced. Files that cannot be read,
/// decoded, or written are logged and left untouched.
pub fn replace_in_files(files: &[PathBuf], old: &str, new: &str) -> usize {
    if is_noop(old, new) {
        return 0;
    }

    let mut total = 0;
    for path in files {
        let Some(content) = read_text(path) else {
            continue;
        };
        let found = content.matches(old).count();
        if found == 0 {
            continue;
        }

        match write_atomic(path, &content.replace(old, new)) {
            Ok(()) => {
                debug!(path = %path.display(), count = found, "replaced '{}'", old);
                total += found;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "failed to rewrite file"),
        }
    }
    total
}

/// Writes `content` over `path` through a temp file in the same directory,
/// keeping the original permissions.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| format!("Could not get parent directory for {}", path.display()))?;

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;

    let perms = fs::metadata(path)?.permissions();
    fs::set_permissions(temp_file.path(), perms)?;

    temp_file.persist(path)?;
    Ok(())
}
