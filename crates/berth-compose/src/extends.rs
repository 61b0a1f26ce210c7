//! `extends` resolution.
//!
//! A service may name a base service, either in its own document or in
//! another file, and inherits every option it does not set itself. Bases are
//! resolved recursively, copied, checked for restricted fields, then merged
//! beneath the extending record.

use std::collections::BTreeMap;

use crate::document::RawDocument;
use crate::error::{ComposeError, Result};
use crate::interpolation::{Warning, interpolate_services};
use crate::lookup::{EnvironmentLookup, ResourceLookup};
use crate::merge::{RESTRICTED_FIELDS, is_remote_context, merge_service};
use crate::schema::{EXTENDS_KEY, check_record};
use crate::value::{RawService, RawServiceMap, RawValue};

/// Target of an `extends` option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendsReference {
    /// File holding the base service; empty for the current document.
    pub file: String,
    /// Name of the base service; empty makes the reference inert.
    pub service: String,
}

impl ExtendsReference {
    /// Extracts the reference from a record.
    ///
    /// Returns `None` when the record has no `extends` option or when it is
    /// not a mapping.
    pub fn from_record(record: &RawService) -> Option<Self> {
        let entries = record.get(EXTENDS_KEY)?.as_mapping()?;
        let field = |key: &str| {
            entries
                .get(key)
                .and_then(RawValue::as_scalar)
                .unwrap_or_default()
                .to_owned()
        };
        Some(Self {
            file: field("file"),
            service: field("service"),
        })
    }
}

/// Resolves `extends` chains for the services of one document.
///
/// Tracks the `(file, service)` pairs currently being resolved so that a
/// chain looping back onto itself fails instead of recursing forever.
/// Fetched files are prepared once per resolver, keyed by resolved path.
pub struct ExtendsResolver<'a> {
    env: Option<&'a dyn EnvironmentLookup>,
    resources: Option<&'a dyn ResourceLookup>,
    warnings: Vec<Warning>,
    stack: Vec<(String, String)>,
    fetched: BTreeMap<String, RawServiceMap>,
}

impl<'a> ExtendsResolver<'a> {
    /// Creates a resolver.
    ///
    /// Without `resources`, only references within the current document work.
    /// `env` is used to interpolate documents fetched for cross-file bases.
    pub fn new(
        env: Option<&'a dyn EnvironmentLookup>,
        resources: Option<&'a dyn ResourceLookup>,
    ) -> Self {
        Self {
            env,
            resources,
            warnings: Vec::new(),
            stack: Vec::new(),
            fetched: BTreeMap::new(),
        }
    }

    /// Warnings raised while interpolating fetched documents.
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// Resolves the `extends` chain of `record`.
    ///
    /// `services` is the collection of the document `file` that `record`
    /// belongs to. The returned record still carries its own `extends`
    /// option; callers strip it before coercion.
    ///
    /// # Errors
    ///
    /// Fails if a base cannot be found or fetched, if a base defines a
    /// restricted field, or if the chain is circular.
    pub fn resolve(
        &mut self,
        name: &str,
        record: RawService,
        services: &RawServiceMap,
        file: &str,
    ) -> Result<RawService> {
        let Some(reference) = ExtendsReference::from_record(&record) else {
            return Ok(record);
        };
        if reference.service.is_empty() {
            return Ok(record);
        }

        let visit = (file.to_owned(), name.to_owned());
        if self.stack.contains(&visit) {
            return Err(ComposeError::ExtendCycle {
                service: name.to_owned(),
                file: file.to_owned(),
            });
        }
        self.stack.push(visit);
        let result = self.compose(name, record, &reference, services, file);
        let _ = self.stack.pop();
        result
    }

    fn compose(
        &mut self,
        name: &str,
        record: RawService,
        reference: &ExtendsReference,
        services: &RawServiceMap,
        file: &str,
    ) -> Result<RawService> {
        tracing::debug!(
            service = name,
            base = reference.service.as_str(),
            base_file = reference.file.as_str(),
            "resolving extends"
        );

        let (base, base_file) = if reference.file.is_empty() {
            let base = services
                .get(&reference.service)
                .ok_or_else(|| ComposeError::ExtendNotFound {
                    service: reference.service.clone(),
                })?;
            let base = self.resolve(&reference.service, base.clone(), services, file)?;
            (base, file.to_owned())
        } else {
            self.fetch_base(reference, file)?
        };

        if let Some(field) = RESTRICTED_FIELDS.iter().find(|field| base.contains_key(**field)) {
            return Err(ComposeError::ExtendRestrictedField {
                service: reference.service.clone(),
                field: (*field).to_owned(),
                file: base_file,
            });
        }

        Ok(merge_service(base, record))
    }

    fn fetch_base(
        &mut self,
        reference: &ExtendsReference,
        file: &str,
    ) -> Result<(RawService, String)> {
        let resources = self.resources.ok_or_else(|| ComposeError::ExtendsUnsupported {
            file: file.to_owned(),
        })?;
        let resource = resources.fetch(&reference.file, file)?;
        let services = match self.fetched.get(&resource.path) {
            Some(services) => services.clone(),
            None => {
                let services = self.prepare(&resource.path, &resource.content)?;
                let _ = self.fetched.insert(resource.path.clone(), services.clone());
                services
            }
        };

        let base = services
            .get(&reference.service)
            .cloned()
            .ok_or_else(|| ComposeError::ExtendNotFoundInFile {
                service: reference.service.clone(),
                file: resource.path.clone(),
            })?;
        let mut base = self.resolve(&reference.service, base, &services, &resource.path)?;
        rebase_build_context(&mut base, resources, &resource.path);
        Ok((base, resource.path))
    }

    /// Parses, interpolates and checks a fetched document.
    fn prepare(&mut self, path: &str, content: &[u8]) -> Result<RawServiceMap> {
        let document = RawDocument::parse(path, content)?;
        let version = document.version();
        let mut services = document.into_services();
        if let Some(env) = self.env {
            interpolate_services(&mut services, env, &mut self.warnings)?;
        }
        for (name, record) in &services {
            check_record(version, name, record)?;
        }
        Ok(services)
    }
}

/// Makes a local build context of a fetched base relative to its own file.
fn rebase_build_context(record: &mut RawService, resources: &dyn ResourceLookup, in_file: &str) {
    let context = match record.get_mut("build") {
        Some(RawValue::Scalar(context)) => context,
        Some(RawValue::Mapping(entries)) => match entries.get_mut("context") {
            Some(RawValue::Scalar(context)) => context,
            _ => return,
        },
        _ => return,
    };
    if context.is_empty() || is_remote_context(context) {
        return;
    }
    *context = resources.resolve_path(context, in_file);
}
