use crate::errors::Result;
use crate::scanner::ScanFilter;
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

/// File name looked up in the template root and the user config directory.
pub const CONFIG_FILE_NAME: &str = "dwinit.yaml";

/// One configurable template value, prompted for interactively.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Field {
    /// Stable key used by the rename plan (e.g. `app_database`).
    pub key: String,
    /// The prompt shown to the user.
    pub label: String,
    /// The placeholder value currently present in the template.
    pub default: String,
    /// Short name used in the dry-run summary. Falls back to `label`.
    #[serde(default)]
    pub description: Option<String>,
}

impl Field {
    fn new(key: &str, label: &str, default: &str, description: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            default: default.to_string(),
            description: Some(description.to_string()),
        }
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.label)
    }
}

/// Template defaults and scan settings.
///
/// Every section may be omitted from the YAML file; missing sections keep the
/// built-in values of the dbt-workflow template.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct InitConfig {
    /// The values to prompt for, in prompt order.
    pub fields: Vec<Field>,
    /// Directory names that are never descended into.
    pub skip_dirs: Vec<String>,
    /// File extensions whose contents are never read.
    pub binary_extensions: Vec<String>,
    /// Message of the initial commit created after customization.
    pub commit_message: String,
    /// Branch pushed to when the repository has no current branch.
    pub default_branch: String,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            fields: vec![
                Field::new(
                    "project_name",
                    "Project name (dbt_project.yml)",
                    "ci_cd_project",
                    "project name",
                ),
                Field::new("author_name", "Author name", "Anouar Zbaida", "author name"),
                Field::new("organization", "Organization", "Crithink", "organization"),
                Field::new(
                    "app_database",
                    "Application database",
                    "APP_DB",
                    "application database",
                ),
                Field::new(
                    "ci_database",
                    "CI/utilities database",
                    "_DB_UTILS",
                    "CI/utilities database",
                ),
                Field::new("warehouse_name", "Warehouse name", "ANALYTICS_WH", "warehouse name"),
            ],
            skip_dirs: [
                ".git",
                "venv",
                "__pycache__",
                "target",
                "dbt_packages",
                "logs",
                ".sqlfluff_cache",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            binary_extensions: [
                ".csv", ".pptx", ".xlsx", ".png", ".jpg", ".gif", ".ico", ".woff", ".woff2", ".pyc",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            commit_message: "Initialize project from dbt-workflow template".to_string(),
            default_branch: "main".to_string(),
        }
    }
}

impl InitConfig {
    /// Looks up a field by key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Builds the scanner filter from the skip and binary sets.
    pub fn scan_filter(&self) -> ScanFilter {
        ScanFilter::new(&self.skip_dirs, &self.binary_extensions)
    }

    /// Rejects configurations the driver cannot work with.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.key.as_str()) {
                return Err(format!("duplicate field key '{}'", field.key).into());
            }
            if field.default.is_empty() {
                return Err(format!("field '{}' has an empty default", field.key).into());
            }
        }
        if self.default_branch.trim().is_empty() {
            return Err("default_branch must not be empty".into());
        }
        Ok(())
    }
}

/// A utility for locating and loading the initializer configuration.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Finds the configuration file.
    ///
    /// The search order is:
    /// 1. The explicit `config_path`, tried as given and then relative to `root`.
    /// 2. `dwinit.yaml` in `root`.
    /// 3. `dwinit/dwinit.yaml` in the user config directory.
    ///
    /// An explicit path that cannot be found is an error. Without one, a missing
    /// file is `Ok(None)` and built-in defaults apply.
    pub fn find_config(config_path: Option<&Path>, root: &Path) -> Result<Option<PathBuf>> {
        if let Some(config_path) = config_path {
            if config_path.exists() {
                return Ok(Some(config_path.to_path_buf()));
            }

            let in_root = root.join(config_path);
            if in_root.exists() {
                return Ok(Some(in_root));
            }

            let cwd = env::current_dir()
                .map(|d| d.join(config_path).display().to_string())
                .unwrap_or_else(|_| config_path.display().to_string());
            return Err(format!(
                "Config file '{}' not found. Searched in:\n  - {}\n  - {}",
                config_path.display(),
                cwd,
                in_root.display()
            )
            .into());
        }

        let in_root = root.join(CONFIG_FILE_NAME);
        if in_root.is_file() {
            return Ok(Some(in_root));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("dwinit").join(CONFIG_FILE_NAME);
            if user_config.is_file() {
                return Ok(Some(user_config));
            }
        }

        Ok(None)
    }

    /// Loads and validates an `InitConfig` from a YAML file.
    pub fn load(path: &Path) -> Result<InitConfig> {
        let file = File::open(path)?;
        let config: InitConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves the configuration for a run, returning where it came from.
    pub fn resolve(config_path: Option<&Path>, root: &Path) -> Result<(InitConfig, Option<PathBuf>)> {
        match Self::find_config(config_path, root)? {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Ok((Self::load(&path)?, Some(path)))
            }
            None => Ok((InitConfig::default(), None)),
        }
    }
}
