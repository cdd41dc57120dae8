//! `dwinit` customizes a dbt-workflow data-warehouse template.
//!
//! It provides the logic behind the `dwinit` command-line tool:
//!
//! - `scanner`: Enumerates the template's text files, pruning skip directories
//!   and binary extensions.
//! - `replacer`: Counts and applies verbatim substring replacements.
//! - `file_renamer`: Moves the paths that embed database and warehouse names.
//! - `plan`: Builds the replacement and rename plan and its dry-run summary.
//! - `initializer`: The interactive driver tying the steps together.
//! - `git`: Points the remote at the new repository and pushes a first commit.
//!
//! Everything runs sequentially on the calling thread.

pub mod cli;
pub mod config;
pub mod errors;
pub mod file_renamer;
pub mod git;
pub mod initializer;
pub mod logging;
pub mod plan;
pub mod prompt;
pub mod replacer;
pub mod scanner;

// Re-export main types for easier access by library users.
pub use config::{ConfigLoader, InitConfig};
pub use errors::{Error, Result};
pub use initializer::{Initializer, Outcome};
pub use plan::Plan;
pub use prompt::Prompter;
pub use scanner::{ScanFilter, Scanner};
