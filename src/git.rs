use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// How `origin` was pointed at the new repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteUpdate {
    /// An existing `origin` had its URL replaced.
    Updated,
    /// No `origin` existed, so one was added.
    Added,
}

/// Thin wrapper over the `git` binary, run inside the template root.
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Returns a handle when `root` has a `.git` directory.
    pub fn discover(root: &Path) -> Option<Self> {
        root.join(".git").is_dir().then(|| Self {
            root: root.to_path_buf(),
        })
    }

    /// Runs `git <args>` and returns trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String> {
        let command = args.join(" ");
        debug!(%command, "running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::Git {
                command: command.clone(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Git {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Points `origin` at `url`, adding the remote if it does not exist yet.
    pub fn set_remote(&self, url: &str) -> Result<RemoteUpdate> {
        match self.run(&["remote", "set-url", "origin", url]) {
            Ok(_) => Ok(RemoteUpdate::Updated),
            Err(e) => {
                debug!(error = %e, "set-url failed, adding origin");
                self.run(&["remote", "add", "origin", url])?;
                Ok(RemoteUpdate::Added)
            }
        }
    }

    /// The checked-out branch, or `default` when it can't be determined.
    pub fn current_branch(&self, default: &str) -> String {
        match self.run(&["branch", "--show-current"]) {
            Ok(branch) if !branch.is_empty() => branch,
            _ => default.to_string(),
        }
    }

    pub fn stage_all(&self) -> Result<()> {
        self.run(&["add", "-A"]).map(|_| ())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message]).map(|_| ())
    }

    pub fn push(&self, branch: &str) -> Result<()> {
        self.run(&["push", "-u", "origin", branch]).map(|_| ())
    }
}
