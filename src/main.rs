//! The main entry point for the `dwinit` command-line application.
//!
//! Parses arguments, loads the template configuration, and hands the
//! terminal to the interactive initializer.

use dwinit::cli;
use dwinit::errors::{Error, Result};
use dwinit::{logging, ConfigLoader, Initializer, Prompter};
use std::env;
use std::io;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = cli::parse_args();
    logging::init(args.verbose);

    let root = args.root.canonicalize().map_err(|source| Error::Root {
        path: args.root.clone(),
        source,
    })?;

    let (config, config_source) = ConfigLoader::resolve(args.config.as_deref(), &root)?;

    let mut artifacts = Vec::new();
    if let Ok(exe) = env::current_exe() {
        artifacts.extend(inside_root(&exe, &root));
    }
    if let Some(source) = config_source {
        artifacts.extend(inside_root(&source, &root));
    }

    let initializer = Initializer::new(root, config).with_artifacts(artifacts);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut prompter = Prompter::new(stdin.lock(), stdout.lock());
    initializer.run(&mut prompter)?;

    Ok(())
}

/// The canonical form of `path` if it lives under `root`.
fn inside_root(path: &Path, root: &Path) -> Option<PathBuf> {
    path.canonicalize().ok().filter(|p| p.starts_with(root))
}
