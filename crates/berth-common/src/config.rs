//! Project configuration model: which compose files to load and from where.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, COMPOSE_FILE_SEPARATOR, DEFAULT_COMPOSE_FILE, DEFAULT_OVERRIDE_FILE};
use crate::error::{BerthError, Result};

/// Root configuration for a compose project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directory relative compose file paths are resolved against.
    pub project_dir: PathBuf,
    /// Compose files, applied in order. Later files override earlier ones.
    pub compose_files: Vec<PathBuf>,
    /// Normalized project name.
    pub project_name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            compose_files: vec![PathBuf::from(DEFAULT_COMPOSE_FILE)],
            project_name: APP_NAME.to_owned(),
        }
    }
}

impl ProjectConfig {
    /// Builds a configuration for `project_dir` using the default file names.
    ///
    /// The override file is appended only when it exists on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the default compose file does not exist.
    pub fn discover(project_dir: &Path) -> Result<Self> {
        let main = project_dir.join(DEFAULT_COMPOSE_FILE);
        if !main.is_file() {
            return Err(BerthError::Config {
                message: format!("no {DEFAULT_COMPOSE_FILE} found in {}", project_dir.display()),
            });
        }

        let mut compose_files = vec![main];
        let override_file = project_dir.join(DEFAULT_OVERRIDE_FILE);
        if override_file.is_file() {
            compose_files.push(override_file);
        }

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            compose_files,
            project_name: project_name_for(project_dir),
        })
    }

    /// Builds a configuration from an explicit file list.
    ///
    /// The project directory is the parent of the first file.
    ///
    /// # Errors
    ///
    /// Returns an error if `files` is empty.
    pub fn with_files(files: Vec<PathBuf>) -> Result<Self> {
        let first = files.first().ok_or_else(|| BerthError::Config {
            message: "at least one compose file is required".into(),
        })?;
        let project_dir = first
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let project_name = project_name_for(&project_dir);

        Ok(Self {
            project_dir,
            compose_files: files,
            project_name,
        })
    }

    /// Replaces the project name, normalizing it.
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.project_name = normalize_project_name(name);
        self
    }
}

/// Splits the value of the `COMPOSE_FILE` variable into paths.
pub fn split_compose_file_env(value: &str) -> Vec<PathBuf> {
    value
        .split(COMPOSE_FILE_SEPARATOR)
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(s.trim()))
        .collect()
}

/// Lowercases `name` and strips every character that is not ASCII alphanumeric.
pub fn normalize_project_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn project_name_for(dir: &Path) -> String {
    let absolute = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    let name = absolute
        .file_name()
        .map(|n| normalize_project_name(&n.to_string_lossy()))
        .unwrap_or_default();
    if name.is_empty() { APP_NAME.to_owned() } else { name }
}
