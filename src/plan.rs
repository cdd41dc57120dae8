//! Turns prompted values into the list of edits a run will make.

use crate::config::InitConfig;
use crate::file_renamer::{RenameKind, RenamePair};
use crate::replacer::{self, OccurrenceCount, Replacement};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Directory holding the DDL tree of the template.
const DDLS_DIR: &str = "ddls";

/// Database keys whose name is also a directory under `ddls/` and a file
/// under `ddls/_account/databases/`.
const DATABASE_KEYS: [&str; 2] = ["app_database", "ci_database"];

/// Warehouse key whose name is a file under `ddls/_account/warehouses/`.
const WAREHOUSE_KEY: &str = "warehouse_name";

/// Everything a run will change, with no-op entries already removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub replacements: Vec<Replacement>,
    /// Directory renames come before file renames.
    pub renames: Vec<RenamePair>,
}

impl Plan {
    /// Builds the plan from the user's answers.
    ///
    /// `values` maps field keys to the chosen value; a missing key keeps the
    /// field's default.
    pub fn build(config: &InitConfig, values: &HashMap<String, String>) -> Self {
        let replacements = config
            .fields
            .iter()
            .map(|f| {
                let new = values.get(&f.key).cloned().unwrap_or_else(|| f.default.clone());
                Replacement::new(f.default.clone(), new, f.description())
            })
            .collect();

        let ddls = Path::new(DDLS_DIR);
        let account = ddls.join("_account");
        let mut renames = Vec::new();

        for key in DATABASE_KEYS {
            if let Some((old, new)) = value_of(config, values, key) {
                renames.push(RenamePair::new(ddls.join(old), ddls.join(new), RenameKind::Directory));
            }
        }
        for key in DATABASE_KEYS {
            if let Some((old, new)) = value_of(config, values, key) {
                renames.push(sql_file_rename(&account.join("databases"), old, new));
            }
        }
        if let Some((old, new)) = value_of(config, values, WAREHOUSE_KEY) {
            renames.push(sql_file_rename(&account.join("warehouses"), old, new));
        }

        let mut plan = Self {
            replacements,
            renames,
        };
        plan.drop_noops();
        plan
    }

    fn drop_noops(&mut self) {
        self.replacements.retain(|r| !r.is_noop());
        self.renames.retain(|r| !r.is_noop());
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty() && self.renames.is_empty()
    }

    /// Computes the dry-run summary against the current tree.
    pub fn dry_run(&self, root: &Path, files: &[PathBuf]) -> DryRun {
        DryRun {
            replacements: self
                .replacements
                .iter()
                .map(|r| (r.clone(), replacer::count_replacements(files, &r.old, &r.new)))
                .collect(),
            renames: self
                .renames
                .iter()
                .filter(|r| r.source_exists(root))
                .cloned()
                .collect(),
        }
    }
}

/// The (template default, chosen value) pair for a field, if the field exists.
fn value_of<'a>(
    config: &'a InitConfig,
    values: &'a HashMap<String, String>,
    key: &str,
) -> Option<(&'a str, &'a str)> {
    let field = config.field(key)?;
    let new = values.get(key).map(String::as_str).unwrap_or(&field.default);
    Some((field.default.as_str(), new))
}

fn sql_file_rename(dir: &Path, old: &str, new: &str) -> RenamePair {
    RenamePair::new(
        dir.join(format!("{old}.sql")),
        dir.join(format!("{new}.sql")),
        RenameKind::File,
    )
}

/// Planned changes with their measured impact, shown before confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRun {
    pub replacements: Vec<(Replacement, OccurrenceCount)>,
    /// Only the renames whose source currently exists.
    pub renames: Vec<RenamePair>,
}

impl DryRun {
    pub fn total_occurrences(&self) -> usize {
        self.replacements.iter().map(|(_, c)| c.occurrences).sum()
    }

    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "  Changes to apply:")?;

        for (r, count) in &self.replacements {
            if count.occurrences > 0 {
                writeln!(
                    out,
                    "    - Replace '{}' -> '{}' ({} occurrences in {} files)",
                    r.old, r.new, count.occurrences, count.files
                )?;
            } else {
                writeln!(out, "    - Replace '{}' -> '{}' (0 occurrences found)", r.old, r.new)?;
            }
        }

        for r in &self.renames {
            let kind = match r.kind {
                RenameKind::Directory => "directory",
                RenameKind::File => "file",
            };
            writeln!(
                out,
                "    - Rename {}: {} -> {}",
                kind,
                r.old.display(),
                r.display_target()
            )?;
        }
        Ok(())
    }
}
