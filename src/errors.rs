use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in `dwinit`.
#[derive(Error, Debug)]
pub enum Error {
    /// An error related to file system I/O.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An error that occurred while parsing a YAML configuration file.
    #[error("Config parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A general configuration-related error.
    #[error("Config error: {0}")]
    Config(String),

    /// The template root given on the command line cannot be resolved.
    #[error("Template root {path} is not accessible: {source}")]
    Root {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Moving a path inside the template failed.
    #[error("Rename failed for {from} -> {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    /// A git subprocess exited unsuccessfully or could not be spawned.
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    /// An error related to persisting a temporary file.
    #[error("Tempfile error: {0}")]
    TempFile(#[from] tempfile::PersistError),

    /// Standard input closed while a prompt was waiting for an answer.
    #[error("Input closed while waiting for an answer")]
    InputClosed,
}

/// A convenient type alias for `Result<T, dwinit::errors::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Config(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Config(s.to_string())
    }
}
