//! Resolution of one compose document into typed configs.
//!
//! This is the entry point tying the stages together: parse, interpolate,
//! resolve `extends`, validate, layer over previously resolved services,
//! then coerce into the canonical model.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::document::{RawDocument, SchemaVersion};
use crate::error::Result;
use crate::extends::ExtendsResolver;
use crate::interpolation::{Warning, interpolate_services};
use crate::lookup::{EnvironmentLookup, ResourceLookup};
use crate::merge::merge_service;
use crate::schema::resource::{NetworkConfig, VolumeConfig, coerce_network, coerce_volume};
use crate::schema::service::ServiceConfig;
use crate::schema::{
    EXTENDS_KEY, check_record, coerce_legacy_service, coerce_service, service_to_legacy_raw,
    service_to_raw,
};
use crate::value::RawService;

/// Resolved services keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Configs {
    services: BTreeMap<String, ServiceConfig>,
}

impl Configs {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the config of `name`.
    pub fn get(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.get(name)
    }

    /// Adds or replaces a service, returning the previous config.
    pub fn insert(&mut self, name: impl Into<String>, config: ServiceConfig) -> Option<ServiceConfig> {
        self.services.insert(name.into(), config)
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Iterates services in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ServiceConfig)> {
        self.services.iter()
    }

    /// Service names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Number of services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if no services are registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl FromIterator<(String, ServiceConfig)> for Configs {
    fn from_iter<I: IntoIterator<Item = (String, ServiceConfig)>>(iter: I) -> Self {
        Self {
            services: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Configs {
    type Item = (String, ServiceConfig);
    type IntoIter = std::collections::btree_map::IntoIter<String, ServiceConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.services.into_iter()
    }
}

/// Output of resolving one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    /// Services defined by the document, layered over the existing registry.
    pub services: Configs,
    /// Named volumes; always empty for legacy documents.
    pub volumes: BTreeMap<String, VolumeConfig>,
    /// Named networks; always empty for legacy documents.
    pub networks: BTreeMap<String, NetworkConfig>,
    /// Non-fatal conditions observed during resolution.
    pub warnings: Vec<Warning>,
}

/// Resolves one compose document.
///
/// `existing` holds services resolved from earlier files; a service defined
/// again here is merged over its existing config. The registry itself is not
/// modified: the result only holds the services of this document.
///
/// Without `env`, values are not interpolated. Without `resources`, only
/// `extends` references within the document are supported. `file` labels
/// diagnostics and anchors relative `extends.file` paths.
///
/// # Errors
///
/// Any failure aborts the whole call; no partial result is returned.
pub fn resolve(
    existing: &Configs,
    env: Option<&dyn EnvironmentLookup>,
    resources: Option<&dyn ResourceLookup>,
    file: &str,
    bytes: &[u8],
) -> Result<Resolved> {
    let result = resolve_document(existing, env, resources, file, bytes);
    if let Err(err) = &result {
        tracing::error!(file, error = %err, "failed to resolve compose document");
    }
    result
}

fn resolve_document(
    existing: &Configs,
    env: Option<&dyn EnvironmentLookup>,
    resources: Option<&dyn ResourceLookup>,
    file: &str,
    bytes: &[u8],
) -> Result<Resolved> {
    let document = RawDocument::parse(file, bytes)?;
    let version = document.version();
    tracing::info!(file, %version, "resolving compose document");

    let (mut services, raw_volumes, raw_networks) = match document {
        RawDocument::Legacy { services } => (services, BTreeMap::new(), BTreeMap::new()),
        RawDocument::Structured {
            services,
            volumes,
            networks,
        } => (services, volumes, networks),
    };

    let mut warnings = Vec::new();
    if let Some(env) = env {
        interpolate_services(&mut services, env, &mut warnings)?;
    }

    for (name, record) in &services {
        check_record(version, name, record)?;
    }

    let mut resolver = ExtendsResolver::new(env, resources);
    let mut resolved = Configs::new();
    for (name, record) in &services {
        let mut record = resolver.resolve(name, record.clone(), &services, file)?;
        let _ = record.remove(EXTENDS_KEY);

        let record = match existing.get(name) {
            Some(previous) => {
                tracing::debug!(service = name.as_str(), "layering over existing service");
                merge_service(existing_record(version, previous), record)
            }
            None => record,
        };
        let config = match version {
            SchemaVersion::Structured => coerce_service(name, &record)?,
            SchemaVersion::Legacy => coerce_legacy_service(name, &record)?.upgrade(),
        };
        tracing::debug!(service = name.as_str(), "resolved service");
        let _ = resolved.insert(name.clone(), config);
    }
    warnings.extend(resolver.into_warnings());

    let volumes = raw_volumes
        .iter()
        .map(|(name, value)| Ok((name.clone(), coerce_volume(name, value)?)))
        .collect::<Result<_>>()?;
    let networks = raw_networks
        .iter()
        .map(|(name, value)| Ok((name.clone(), coerce_network(name, value)?)))
        .collect::<Result<_>>()?;

    Ok(Resolved {
        services: resolved,
        volumes,
        networks,
        warnings,
    })
}

/// Converts an existing config into the raw spelling of `version`.
fn existing_record(version: SchemaVersion, config: &ServiceConfig) -> RawService {
    match version {
        SchemaVersion::Structured => service_to_raw(config),
        SchemaVersion::Legacy => service_to_legacy_raw(config),
    }
}
