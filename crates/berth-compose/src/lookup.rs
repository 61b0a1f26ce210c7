//! Capabilities the engine consumes from its caller.
//!
//! Environment access and file access are injected rather than read from
//! ambient process state, so resolution stays deterministic under test.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use berth_common::error::BerthError;

use crate::error::{ComposeError, Result};

/// Source of values for `$VAR` references.
pub trait EnvironmentLookup {
    /// Returns the value of `name`, or `None` if it is unset.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Bytes of a fetched file plus the path it was resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Raw file content.
    pub content: Vec<u8>,
    /// Resolved path, used as the context for further relative lookups.
    pub path: String,
}

/// Access to files referenced by `extends.file` and relative paths.
pub trait ResourceLookup {
    /// Fetches `file`, resolved relative to the file `relative_to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn fetch(&self, file: &str, relative_to: &str) -> Result<Resource>;

    /// Resolves `path` relative to the directory of `in_file`.
    fn resolve_path(&self, path: &str, in_file: &str) -> String;
}

/// Reads variables from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEnvironment;

impl EnvironmentLookup for OsEnvironment {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory variable table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnvironment {
    vars: BTreeMap<String, String>,
}

impl MapEnvironment {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable, returning the updated table.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvironmentLookup for MapEnvironment {
    fn lookup(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Resolves resources on the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileResourceLookup;

impl FileResourceLookup {
    fn absolute(path: &str, in_file: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let base = Path::new(in_file)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(
                || std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
                Path::to_path_buf,
            );
        base.join(path).components().collect()
    }
}

impl ResourceLookup for FileResourceLookup {
    fn fetch(&self, file: &str, relative_to: &str) -> Result<Resource> {
        let path = Self::absolute(file, relative_to);
        tracing::debug!(path = %path.display(), "reading extended file");
        let content = std::fs::read(&path).map_err(|source| ComposeError::Lookup {
            file: file.to_owned(),
            source: BerthError::Io {
                path: path.clone(),
                source,
            },
        })?;
        Ok(Resource {
            content,
            path: path.to_string_lossy().into_owned(),
        })
    }

    fn resolve_path(&self, path: &str, in_file: &str) -> String {
        Self::absolute(path, in_file).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_environment_distinguishes_unset_from_empty() {
        let env = MapEnvironment::new().with("EMPTY", "");
        assert_eq!(env.lookup("EMPTY").as_deref(), Some(""));
        assert_eq!(env.lookup("MISSING"), None);
    }

    #[test]
    fn map_environment_collects_from_pairs() {
        let env: MapEnvironment = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(env.lookup("B").as_deref(), Some("2"));
    }

    #[test]
    fn resolve_path_is_relative_to_containing_directory() {
        let lookup = FileResourceLookup;
        assert_eq!(lookup.resolve_path("app", "/srv/stack/compose.yml"), "/srv/stack/app");
        assert_eq!(lookup.resolve_path("/abs/app", "/srv/stack/compose.yml"), "/abs/app");
        assert_eq!(lookup.resolve_path("./app", "/srv/stack/compose.yml"), "/srv/stack/app");
    }

    #[test]
    fn fetch_reads_sibling_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let base = dir.path().join("base.yml");
        std::fs::write(&base, "web:\n  image: nginx\n").expect("write");
        let main = dir.path().join("main.yml");

        let resource = FileResourceLookup
            .fetch("base.yml", &main.to_string_lossy())
            .expect("fetch");
        assert_eq!(resource.content, b"web:\n  image: nginx\n");
        assert_eq!(resource.path, base.to_string_lossy());
    }

    #[test]
    fn fetch_missing_file_reports_lookup_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let main = dir.path().join("main.yml");
        let err = FileResourceLookup
            .fetch("absent.yml", &main.to_string_lossy())
            .unwrap_err();
        assert!(matches!(err, ComposeError::Lookup { ref file, .. } if file == "absent.yml"));
    }
}
