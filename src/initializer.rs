//! The interactive driver: prompt, plan, confirm, apply, then git setup.

use crate::config::InitConfig;
use crate::errors::Result;
use crate::file_renamer;
use crate::git::{GitRepo, RemoteUpdate};
use crate::plan::Plan;
use crate::prompt::Prompter;
use crate::replacer;
use crate::scanner::Scanner;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every answer matched the template defaults.
    NothingToChange,
    /// The user declined the dry run.
    Aborted,
    /// Changes were written.
    Applied { renames: usize, replacements: usize },
}

/// Customizes one template tree.
pub struct Initializer {
    root: PathBuf,
    config: InitConfig,
    scanner: Scanner,
    artifacts: Vec<PathBuf>,
}

impl Initializer {
    pub fn new(root: impl Into<PathBuf>, config: InitConfig) -> Self {
        let scanner = Scanner::new(config.scan_filter());
        Self {
            root: root.into(),
            config,
            scanner,
            artifacts: Vec::new(),
        }
    }

    /// Files belonging to the initializer itself, offered for deletion at the end.
    pub fn with_artifacts(mut self, artifacts: Vec<PathBuf>) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Runs the whole dialogue.
    pub fn run<R: BufRead, W: Write>(&self, p: &mut Prompter<R, W>) -> Result<Outcome> {
        let values = self.prompt_values(p)?;
        let plan = Plan::build(&self.config, &values);

        if plan.is_empty() {
            writeln!(p.out(), "\n  All values match defaults. Nothing to change.")?;
            return Ok(Outcome::NothingToChange);
        }

        let mut skipped = HashSet::new();
        let files = self.text_files(&mut skipped);
        plan.dry_run(&self.root, &files).write_summary(p.out())?;

        writeln!(p.out())?;
        if !p.confirm("Apply these changes?", true)? {
            writeln!(p.out(), "  Aborted.")?;
            return Ok(Outcome::Aborted);
        }

        let outcome = self.apply_with(&plan, p.out(), &mut skipped)?;

        self.setup_git(p)?;
        self.offer_cleanup(p)?;
        writeln!(p.out())?;

        Ok(outcome)
    }

    fn prompt_values<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
    ) -> Result<HashMap<String, String>> {
        let out = p.out();
        writeln!(out)?;
        writeln!(out, "  dbt-workflow Project Initializer")?;
        writeln!(out, "  =================================")?;
        writeln!(out)?;
        writeln!(out, "  Customize this template for your project.")?;
        writeln!(out, "  Press Enter to keep the default value shown in [brackets].")?;
        writeln!(out)?;

        let mut values = HashMap::new();
        for field in &self.config.fields {
            let value = p.ask(&field.label, &field.default)?;
            values.insert(field.key.clone(), value);
        }
        Ok(values)
    }

    /// Scans the tree, dropping files whose contents can't be edited.
    fn text_files(&self, skipped: &mut HashSet<PathBuf>) -> Vec<PathBuf> {
        replacer::retain_decodable(self.scanner.collect_text_files(&self.root), skipped)
    }

    /// Applies renames, rescans the tree, then rewrites file contents.
    ///
    /// A failed rename is reported and the remaining steps still run.
    pub fn apply<W: Write>(&self, plan: &Plan, out: &mut W) -> Result<Outcome> {
        self.apply_with(plan, out, &mut HashSet::new())
    }

    fn apply_with<W: Write>(
        &self,
        plan: &Plan,
        out: &mut W,
        skipped: &mut HashSet<PathBuf>,
    ) -> Result<Outcome> {
        let mut renames = 0;
        for rename in &plan.renames {
            match file_renamer::rename_path(&self.root, &rename.old, &rename.new) {
                Ok(true) => {
                    renames += 1;
                    writeln!(
                        out,
                        "  Renamed: {} -> {}",
                        rename.old.display(),
                        rename.display_target()
                    )?;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "rename failed");
                    writeln!(out, "  Rename skipped: {e}")?;
                }
            }
        }

        // Content edits must see the final file locations.
        let files = self.text_files(skipped);

        let replacements: usize = plan
            .replacements
            .iter()
            .map(|r| replacer::replace_in_files(&files, &r.old, &r.new))
            .sum();

        info!(renames, replacements, files = files.len(), "template customized");
        writeln!(out)?;
        writeln!(out, "  Done! {replacements} replacements applied.")?;

        Ok(Outcome::Applied {
            renames,
            replacements,
        })
    }

    fn setup_git<R: BufRead, W: Write>(&self, p: &mut Prompter<R, W>) -> Result<()> {
        let Some(repo) = GitRepo::discover(&self.root) else {
            let out = p.out();
            writeln!(out)?;
            writeln!(out, "  No .git directory found. To set up Git:")?;
            writeln!(out, "    git init && git remote add origin <your-repo-url>")?;
            writeln!(
                out,
                "    git add -A && git commit -m 'Initial commit' && git push -u origin {}",
                self.config.default_branch
            )?;
            return Ok(());
        };

        writeln!(p.out())?;
        writeln!(p.out(), "  ── Git Setup ──")?;
        writeln!(p.out())?;

        let Some(url) = p.ask_optional("New Git repository URL (leave blank to skip)")? else {
            writeln!(p.out(), "  Skipped Git setup. Remote origin unchanged.")?;
            writeln!(p.out(), "  To update later: git remote set-url origin <your-repo-url>")?;
            return Ok(());
        };

        match repo.set_remote(&url) {
            Ok(RemoteUpdate::Updated) => writeln!(p.out(), "  Remote origin updated to: {url}")?,
            Ok(RemoteUpdate::Added) => writeln!(p.out(), "  Remote origin set to: {url}")?,
            Err(e) => {
                warn!(error = %e, "could not configure remote");
                writeln!(p.out(), "  Could not configure remote origin ({e}). Set it manually:")?;
                writeln!(p.out(), "    git remote add origin {url}")?;
                return Ok(());
            }
        }

        let branch = repo.current_branch(&self.config.default_branch);

        writeln!(p.out())?;
        if !p.confirm(&format!("Create initial commit and push to '{branch}'?"), true)? {
            writeln!(p.out(), "  Skipped. You can commit and push manually later.")?;
            return Ok(());
        }

        if let Err(e) = repo
            .stage_all()
            .and_then(|_| repo.commit(&self.config.commit_message))
        {
            warn!(error = %e, "initial commit failed");
            writeln!(p.out(), "  Commit failed ({e}). You can commit manually:")?;
            writeln!(
                p.out(),
                "    git add -A && git commit -m '{}'",
                self.config.commit_message
            )?;
            return Ok(());
        }
        writeln!(p.out(), "  Initial commit created.")?;

        match repo.push(&branch) {
            Ok(()) => writeln!(p.out(), "  Pushed to origin/{branch}.")?,
            Err(e) => {
                warn!(error = %e, "push failed");
                writeln!(
                    p.out(),
                    "  Push failed (is the remote repo created?). You can push manually:"
                )?;
                writeln!(p.out(), "    git push -u origin {branch}")?;
            }
        }
        Ok(())
    }

    fn offer_cleanup<R: BufRead, W: Write>(&self, p: &mut Prompter<R, W>) -> Result<()> {
        writeln!(p.out())?;
        if self.artifacts.is_empty() {
            writeln!(
                p.out(),
                "  Init tool is installed outside this template. Nothing to delete."
            )?;
            return Ok(());
        }

        if p.confirm("Delete this init tool?", false)? {
            let removed = remove_artifacts(&self.root, &self.artifacts)?;
            for path in &removed {
                writeln!(p.out(), "  Deleted: {}", path.display())?;
            }
            writeln!(p.out(), "  Init tool deleted.")?;
        } else {
            writeln!(p.out(), "  Init tool kept. You can re-run it or delete it manually.")?;
        }
        Ok(())
    }
}

/// Deletes the given files, then their parent directories if left empty.
///
/// Paths outside `root`, and `root` itself, are never removed.
pub fn remove_artifacts(root: &Path, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for path in paths {
        if !path.starts_with(root) || path == root {
            warn!(path = %path.display(), "refusing to delete path outside the template");
            continue;
        }
        if !path.is_file() {
            continue;
        }

        fs::remove_file(path)?;
        removed.push(path.clone());

        if let Some(parent) = path.parent() {
            if parent != root && parent.starts_with(root) && fs::read_dir(parent)?.next().is_none() {
                fs::remove_dir(parent)?;
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::process::Command;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    fn git(dir: &Path, args: &[&str]) {
        let output = Command::new("git").args(args).current_dir(dir).output().unwrap();
        assert!(output.status.success(), "git {:?} failed", args);
    }

    fn init_repo(dir: &Path) {
        git(dir, &["init", "-q"]);
        git(dir, &["config", "user.email", "dev@example.com"]);
        git(dir, &["config", "user.name", "Dev"]);
        git(dir, &["config", "commit.gpgsign", "false"]);
    }

    fn run_with(init: &Initializer, input: &str) -> (Outcome, String) {
        let mut p = Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let outcome = init.run(&mut p).unwrap();
        let (_, out) = p.into_inner();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_project_and_database_example() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let project = root.join("dbt_project.yml");
        fs::write(&project, "name: ci_cd_project\nprofile: ci_cd_project\ndatabase: APP_DB\n").unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        fs::write(root.join("target/manifest.json"), "ci_cd_project APP_DB").unwrap();

        let init = Initializer::new(root, InitConfig::default());
        let (outcome, out) = run_with(&init, "acme\n\n\nACME_DB\n\n\ny\n");

        assert_eq!(
            outcome,
            Outcome::Applied {
                renames: 0,
                replacements: 3
            }
        );
        assert!(out.contains("Replace 'ci_cd_project' -> 'acme' (2 occurrences in 1 files)"));
        assert!(out.contains("Replace 'APP_DB' -> 'ACME_DB' (1 occurrences in 1 files)"));
        assert!(out.contains("Done! 3 replacements applied."));

        let content = fs::read_to_string(&project).unwrap();
        assert!(!content.contains("ci_cd_project"));
        assert!(!content.contains("APP_DB"));
        assert_eq!(
            fs::read_to_string(root.join("target/manifest.json")).unwrap(),
            "ci_cd_project APP_DB"
        );
    }

    #[test]
    fn test_defaults_change_nothing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.sql"), "APP_DB").unwrap();

        let init = Initializer::new(temp_dir.path(), InitConfig::default());
        let (outcome, out) = run_with(&init, "\n\n\n\n\n\n");

        assert_eq!(outcome, Outcome::NothingToChange);
        assert!(out.contains("Nothing to change."));
        assert_eq!(fs::read_to_string(temp_dir.path().join("a.sql")).unwrap(), "APP_DB");
    }

    #[test]
    fn test_declined_dry_run_mutates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("ddls/APP_DB")).unwrap();
        fs::write(root.join("ddls/APP_DB/grants.sql"), "grant usage on database APP_DB").unwrap();

        let init = Initializer::new(root, InitConfig::default());
        let (outcome, out) = run_with(&init, "\n\n\nACME_DB\n\n\nn\n");

        assert_eq!(outcome, Outcome::Aborted);
        assert!(out.contains("Aborted."));
        assert!(root.join("ddls/APP_DB/grants.sql").is_file());
        assert!(!root.join("ddls/ACME_DB").exists());
    }

    #[test]
    fn test_renames_happen_before_content_edits() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("ddls/APP_DB")).unwrap();
        fs::create_dir_all(root.join("ddls/_account/databases")).unwrap();
        fs::create_dir_all(root.join("ddls/_account/warehouses")).unwrap();
        fs::write(root.join("ddls/APP_DB/grants.sql"), "grant usage on database APP_DB").unwrap();
        fs::write(
            root.join("ddls/_account/databases/APP_DB.sql"),
            "create database if not exists APP_DB;",
        )
        .unwrap();
        fs::write(
            root.join("ddls/_account/warehouses/ANALYTICS_WH.sql"),
            "create warehouse ANALYTICS_WH;",
        )
        .unwrap();

        let init = Initializer::new(root, InitConfig::default());
        let (outcome, out) = run_with(&init, "\n\n\nACME_DB\n\nETL_WH\ny\n");

        assert_eq!(
            outcome,
            Outcome::Applied {
                renames: 3,
                replacements: 3
            }
        );
        assert!(out.contains("Rename directory:"));
        assert!(out.contains("Renamed:"));
        assert_eq!(
            fs::read_to_string(root.join("ddls/ACME_DB/grants.sql")).unwrap(),
            "grant usage on database ACME_DB"
        );
        assert_eq!(
            fs::read_to_string(root.join("ddls/_account/databases/ACME_DB.sql")).unwrap(),
            "create database if not exists ACME_DB;"
        );
        assert!(root.join("ddls/_account/warehouses/ETL_WH.sql").is_file());
        assert!(!root.join("ddls/_account/warehouses/ANALYTICS_WH.sql").exists());
    }

    #[test]
    fn test_dry_run_count_equals_applied() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("models")).unwrap();
        for i in 0..5 {
            fs::write(
                root.join(format!("models/m{i}.sql")),
                "select * from Crithink.Crithink_raw -- Crithink",
            )
            .unwrap();
        }

        let config = InitConfig::default();
        let mut values = HashMap::new();
        values.insert("organization".to_string(), "Acme".to_string());
        let plan = Plan::build(&config, &values);

        let init = Initializer::new(root, config);
        let files = init.scanner.collect_text_files(root);
        let planned = plan.dry_run(root, &files).total_occurrences();

        let mut out = Vec::new();
        let outcome = init.apply(&plan, &mut out).unwrap();

        assert_eq!(planned, 15);
        assert_eq!(
            outcome,
            Outcome::Applied {
                renames: 0,
                replacements: planned
            }
        );
    }

    #[test]
    fn test_cleanup_removes_artifacts_and_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("scripts")).unwrap();
        let tool = root.join("scripts/dwinit");
        fs::write(&tool, "bin").unwrap();
        fs::write(root.join("a.sql"), "ci_cd_project").unwrap();

        let init = Initializer::new(root, InitConfig::default()).with_artifacts(vec![tool.clone()]);
        let (_, out) = run_with(&init, "acme\n\n\n\n\n\ny\ny\n");

        assert!(out.contains("Init tool deleted."));
        assert!(!tool.exists());
        assert!(!root.join("scripts").exists());
    }

    #[test]
    fn test_remove_artifacts_ignores_outside_paths() {
        let outside = TempDir::new().unwrap();
        let template = TempDir::new().unwrap();
        let stray = outside.path().join("keep.txt");
        fs::write(&stray, "keep").unwrap();

        let removed = remove_artifacts(template.path(), &[stray.clone()]).unwrap();

        assert!(removed.is_empty());
        assert!(stray.exists());
    }

    #[test]
    fn test_git_prompts_skipped_without_url() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".git/config"), "ci_cd_project").unwrap();
        fs::write(root.join("README.md"), "ci_cd_project").unwrap();

        let init = Initializer::new(root, InitConfig::default());
        let (outcome, out) = run_with(&init, "acme\n\n\n\n\n\ny\n\n");

        assert_eq!(
            outcome,
            Outcome::Applied {
                renames: 0,
                replacements: 1
            }
        );
        assert!(out.contains("Skipped Git setup. Remote origin unchanged."));
        assert_eq!(fs::read_to_string(root.join(".git/config")).unwrap(), "ci_cd_project");
    }

    #[test]
    fn test_cleanup_reports_nothing_to_delete() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.sql"), "ci_cd_project").unwrap();

        let init = Initializer::new(temp_dir.path(), InitConfig::default());
        let (_, out) = run_with(&init, "acme\n\n\n\n\n\ny\n");

        assert!(out.contains("Nothing to delete."));
        assert!(!out.contains("Delete this init tool?"));
    }

    #[test]
    fn test_push_failure_is_not_fatal() {
        if !git_available() {
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        init_repo(root);
        fs::write(root.join("dbt_project.yml"), "name: ci_cd_project\n").unwrap();
        fs::create_dir_all(root.join("scripts")).unwrap();
        let tool = root.join("scripts/dwinit");
        fs::write(&tool, "bin").unwrap();

        let unreachable = root.join("nope.git");
        let input = format!("acme\n\n\n\n\n\ny\n{}\ny\ny\n", unreachable.display());
        let init = Initializer::new(root, InitConfig::default()).with_artifacts(vec![tool.clone()]);
        let (outcome, out) = run_with(&init, &input);

        assert_eq!(
            outcome,
            Outcome::Applied {
                renames: 0,
                replacements: 1
            }
        );
        assert!(out.contains("Remote origin set to:"));
        assert!(out.contains("Initial commit created."));
        assert!(out.contains("Push failed (is the remote repo created?). You can push manually:"));
        assert!(out.contains("    git push -u origin "));
        // The dialogue carries on to cleanup after the failed push.
        assert!(out.contains("Init tool deleted."));
        assert!(!tool.exists());
    }

    #[test]
    fn test_failed_commit_skips_push() {
        if !git_available() {
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        init_repo(root);
        git(root, &["remote", "add", "origin", "https://example.com/old.git"]);
        // Everything is ignored, so staging leaves nothing to commit.
        fs::write(root.join(".gitignore"), "*\n").unwrap();
        fs::write(root.join("README.md"), "ci_cd_project").unwrap();

        let init = Initializer::new(root, InitConfig::default());
        let (outcome, out) = run_with(
            &init,
            "acme\n\n\n\n\n\ny\nhttps://example.com/new.git\ny\n",
        );

        assert_eq!(
            outcome,
            Outcome::Applied {
                renames: 0,
                replacements: 1
            }
        );
        assert!(out.contains("Remote origin updated to: https://example.com/new.git"));
        assert!(out.contains("Commit failed"));
        assert!(out.contains("git add -A && git commit -m"));
        assert!(!out.contains("Initial commit created."));
        assert!(!out.contains("Push failed"));
        assert!(!out.contains("Pushed to origin/"));
        assert!(out.contains("Nothing to delete."));
    }
}
