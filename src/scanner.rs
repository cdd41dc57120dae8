use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Decides which directories are pruned and which files count as binary.
///
/// Extensions are stored lowercase without the leading dot, so `.PNG`, `png`
/// and `.png` all name the same entry.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    skip_dirs: HashSet<String>,
    binary_extensions: HashSet<String>,
}

impl ScanFilter {
    pub fn new<S: AsRef<str>>(skip_dirs: &[S], binary_extensions: &[S]) -> Self {
        Self {
            skip_dirs: skip_dirs.iter().map(|d| d.as_ref().to_string()).collect(),
            binary_extensions: binary_extensions
                .iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// `true` if a directory with this name must not be descended into.
    pub fn is_skipped_dir(&self, name: &str) -> bool {
        self.skip_dirs.contains(name)
    }

    /// `true` if the file's extension is on the binary denylist.
    pub fn is_binary(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|os| os.to_str())
            .map(|s| self.binary_extensions.contains(&s.to_lowercase()))
            .unwrap_or(false)
    }
}

/// Enumerates the text files of a template tree.
///
/// Only the configured skip set prunes the walk; hidden files and
/// `.gitignore` rules are not applied.
pub struct Scanner {
    filter: Arc<ScanFilter>,
}

impl Scanner {
    pub fn new(filter: ScanFilter) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }

    /// Recursively collects every non-binary file under `root`.
    ///
    /// Entries are yielded in file-name order within each directory, so the
    /// result is stable between runs. Unreadable entries are logged and skipped.
    pub fn collect_text_files(&self, root: &Path) -> Vec<PathBuf> {
        let filter = Arc::clone(&self.filter);
        let mut walker = WalkBuilder::new(root);
        walker
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                // Never prune the root itself, whatever it is called.
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && filter.is_skipped_dir(&entry.file_name().to_string_lossy()))
            });

        let mut files = Vec::new();
        for entry in walker.build() {
            match entry {
                Ok(entry) => {
                    let is_file = entry.file_type().is_some_and(|t| t.is_file());
                    if is_file && !self.filter.is_binary(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => warn!(error = %e, "skipping unreadable entry"),
            }
        }

        debug!(root = %root.display(), count = files.len(), "collected text files");
        files
    }
}

/// Convenience wrapper for a one-off scan.
pub fn collect_text_files(root: &Path, filter: &ScanFilter) -> Vec<PathBuf> {
    Scanner::new(filter.clone()).collect_text_files(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn filter() -> ScanFilter {
        ScanFilter::new(&[".git", "target", "logs"], &[".png", ".csv"])
    }

    #[test]
    fn test_skip_dirs_are_not_descended() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("models/staging")).unwrap();
        fs::create_dir_all(root.join("target/compiled")).unwrap();
        fs::create_dir_all(root.join(".git/refs")).unwrap();
        fs::write(root.join("models/staging/stg.sql"), "select 1").unwrap();
        fs::write(root.join("target/compiled/stg.sql"), "select 1").unwrap();
        fs::write(root.join(".git/refs/HEAD"), "ref").unwrap();
        fs::write(root.join("README.md"), "readme").unwrap();

        let files = collect_text_files(root, &filter());

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| !p.starts_with(root.join("target"))));
        assert!(files.iter().all(|p| !p.starts_with(root.join(".git"))));
    }

    #[test]
    fn test_binary_extensions_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("logo.PNG"), [0u8, 1, 2]).unwrap();
        fs::write(root.join("seed.csv"), "a,b").unwrap();
        fs::write(root.join("model.sql"), "select 1").unwrap();

        let files = collect_text_files(root, &filter());
        assert_eq!(files, vec![root.join("model.sql")]);
    }

    #[test]
    fn test_skip_applies_to_directories_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        // A plain file named like a skip dir is still a text file.
        fs::write(root.join("logs"), "not a directory").unwrap();

        let files = collect_text_files(root, &filter());
        assert_eq!(files, vec![root.join("logs")]);
    }

    #[test]
    fn test_root_named_like_skip_dir_is_scanned() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("target");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("a.sql"), "select 1").unwrap();

        let files = collect_text_files(&root, &filter());
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_hidden_files_are_included_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("b.yml"), "b").unwrap();
        fs::write(root.join(".sqlfluff"), "x").unwrap();
        fs::write(root.join("a.yml"), "a").unwrap();

        let files = collect_text_files(root, &filter());
        assert_eq!(
            files,
            vec![root.join(".sqlfluff"), root.join("a.yml"), root.join("b.yml")]
        );
    }
}
