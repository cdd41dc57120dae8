use clap::Parser;
use std::path::PathBuf;

/// Interactive initializer for the dbt-workflow data-warehouse template.
///
/// Prompts for the project name, author, organization, database names and
/// warehouse name, shows a dry run of every replacement and rename, and
/// rewrites the template in place once confirmed.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Customize a dbt-workflow project template",
    long_about = "dwinit - Replace the template placeholders of a dbt-workflow project.

Run it from the template root with no arguments and answer the prompts.
Press Enter at any prompt to keep the value shown in [brackets].

EXAMPLES:
  dwinit                            # Customize the current directory
  dwinit --root ../warehouse        # Customize another checkout
  dwinit -c team-defaults.yaml      # Start from different template defaults
  RUST_LOG=dwinit=debug dwinit      # Trace every file touched"
)]
pub struct Args {
    /// The template root to customize.
    #[arg(short, long, default_value = ".", env = "DWINIT_ROOT")]
    pub root: PathBuf,

    /// Path to a YAML file overriding the template defaults.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log each file scanned, rewritten, or skipped.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}
