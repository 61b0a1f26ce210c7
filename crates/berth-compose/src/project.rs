//! Multi-file layering.
//!
//! A [`Project`] applies compose files in order. Each file is resolved
//! against the services accumulated so far, so later files override earlier
//! ones option by option.

use std::collections::BTreeMap;
use std::path::Path;

use berth_common::config::ProjectConfig;
use berth_common::error::BerthError;
use serde::Serialize;

use crate::error::Result;
use crate::interpolation::Warning;
use crate::lookup::{EnvironmentLookup, ResourceLookup};
use crate::resolve::{Configs, resolve};
use crate::schema::resource::{NetworkConfig, VolumeConfig};

/// The merged model of every file applied so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectModel {
    /// Resolved services.
    pub services: Configs,
    /// Named volumes.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub volumes: BTreeMap<String, VolumeConfig>,
    /// Named networks.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub networks: BTreeMap<String, NetworkConfig>,
}

/// A set of compose files layered in order.
pub struct Project {
    name: String,
    env: Option<Box<dyn EnvironmentLookup>>,
    resources: Option<Box<dyn ResourceLookup>>,
    model: ProjectModel,
    warnings: Vec<Warning>,
    files: Vec<String>,
}

impl Project {
    /// Creates an empty project without interpolation or cross-file `extends`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            env: None,
            resources: None,
            model: ProjectModel::default(),
            warnings: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Interpolates values from `env`.
    #[must_use]
    pub fn with_environment(mut self, env: impl EnvironmentLookup + 'static) -> Self {
        self.env = Some(Box::new(env));
        self
    }

    /// Fetches `extends.file` references through `resources`.
    #[must_use]
    pub fn with_resources(mut self, resources: impl ResourceLookup + 'static) -> Self {
        self.resources = Some(Box::new(resources));
        self
    }

    /// Applies every compose file listed in `config`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first file or resolution error.
    pub fn load(mut self, config: &ProjectConfig) -> Result<Self> {
        for file in &config.compose_files {
            self.add_file(file)?;
        }
        Ok(self)
    }

    /// Reads and applies one compose file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not resolve.
    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path).map_err(|source| BerthError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_bytes(&path.to_string_lossy(), &bytes)
    }

    /// Applies one compose document.
    ///
    /// On error the project is left as it was before the call.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not resolve.
    pub fn add_bytes(&mut self, file: &str, bytes: &[u8]) -> Result<()> {
        let resolved = resolve(
            &self.model.services,
            self.env.as_deref(),
            self.resources.as_deref(),
            file,
            bytes,
        )?;
        tracing::info!(
            project = self.name.as_str(),
            file,
            services = resolved.services.len(),
            "applied compose file"
        );

        for (name, config) in resolved.services {
            let _ = self.model.services.insert(name, config);
        }
        self.model.volumes.extend(resolved.volumes);
        self.model.networks.extend(resolved.networks);
        self.warnings.extend(resolved.warnings);
        self.files.push(file.to_owned());
        Ok(())
    }

    /// Project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Merged model.
    pub const fn model(&self) -> &ProjectModel {
        &self.model
    }

    /// Resolved services.
    pub const fn services(&self) -> &Configs {
        &self.model.services
    }

    /// Warnings from every applied file.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Labels of the applied files, in order.
    pub fn files(&self) -> &[String] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComposeError;
    use crate::lookup::MapEnvironment;

    #[test]
    fn later_files_override_earlier_ones() {
        let mut project = Project::new("demo");
        project
            .add_bytes("docker-compose.yml", b"web:\n  image: nginx\n  user: root\n")
            .expect("first");
        project
            .add_bytes("docker-compose.override.yml", b"web:\n  image: nginx:alpine\n")
            .expect("second");

        let web = project.services().get("web").expect("web");
        assert_eq!(web.image.as_deref(), Some("nginx:alpine"));
        assert_eq!(web.user.as_deref(), Some("root"));
        assert_eq!(project.files(), ["docker-compose.yml", "docker-compose.override.yml"]);
    }

    #[test]
    fn services_from_different_files_accumulate() {
        let mut project = Project::new("demo");
        project.add_bytes("a.yml", b"web:\n  image: nginx\n").expect("a");
        project
            .add_bytes("b.yml", b"version: '2'\nservices:\n  db:\n    image: postgres\nvolumes:\n  pg:\n")
            .expect("b");
        assert_eq!(project.services().names().collect::<Vec<_>>(), vec!["db", "web"]);
        assert!(project.model().volumes.contains_key("pg"));
    }

    #[test]
    fn failed_file_leaves_project_unchanged() {
        let mut project = Project::new("demo");
        project.add_bytes("a.yml", b"web:\n  image: nginx\n").expect("a");
        let err = project.add_bytes("b.yml", b"web:\n  bogus: 1\n").unwrap_err();
        assert!(matches!(err, ComposeError::UnsupportedField { .. }));
        assert_eq!(project.files(), ["a.yml"]);
        assert_eq!(project.services().len(), 1);
    }

    #[test]
    fn warnings_accumulate_across_files() {
        let mut project = Project::new("demo").with_environment(MapEnvironment::new());
        project.add_bytes("a.yml", b"web:\n  image: ${A}\n").expect("a");
        project.add_bytes("b.yml", b"web:\n  user: ${B}\n").expect("b");
        assert_eq!(project.warnings().len(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut project = Project::new("demo");
        let err = project.add_file(Path::new("/nonexistent/docker-compose.yml")).unwrap_err();
        assert!(matches!(err, ComposeError::Common(BerthError::Io { .. })));
    }
}
