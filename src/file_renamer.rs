use crate::errors::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whether a rename moves a whole directory or a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameKind {
    Directory,
    File,
}

/// A move of one path, relative to the template root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePair {
    pub old: PathBuf,
    pub new: PathBuf,
    pub kind: RenameKind,
}

impl RenamePair {
    pub fn new(old: impl Into<PathBuf>, new: impl Into<PathBuf>, kind: RenameKind) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
            kind,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.old == self.new
    }

    /// `true` if the source path is present under `root`.
    pub fn source_exists(&self, root: &Path) -> bool {
        root.join(&self.old).exists()
    }

    /// The target as shown to the user: full relative path for directories,
    /// just the new file name for files.
    pub fn display_target(&self) -> String {
        match self.kind {
            RenameKind::Directory => self.new.display().to_string(),
            RenameKind::File => self
                .new
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.new.display().to_string()),
        }
    }
}

/// Moves `root/old` to `root/new`.
///
/// Missing parent directories of the target are created. Returns `Ok(false)`
/// without touching the file system when the names are identical or the
/// source does not exist.
pub fn rename_path(root: &Path, old: &Path, new: &Path) -> Result<bool> {
    if old == new {
        return Ok(false);
    }

    let old_path = root.join(old);
    let new_path = root.join(new);

    if !old_path.exists() {
        debug!(path = %old_path.display(), "rename source missing");
        return Ok(false);
    }

    let wrap = |source: std::io::Error| Error::Rename {
        from: old_path.clone(),
        to: new_path.clone(),
        source,
    };

    if let Some(parent) = new_path.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::rename(&old_path, &new_path).map_err(wrap)?;

    debug!(from = %old_path.display(), to = %new_path.display(), "renamed");
    Ok(true)
}
