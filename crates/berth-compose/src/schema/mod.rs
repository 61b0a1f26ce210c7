//! Typed model and conversion between raw records and typed configs.
//!
//! Coercion is driven by explicit field tables: each known option names the
//! shape it accepts and how it is stored. Unknown options are errors rather
//! than being dropped.

pub mod legacy;
pub mod resource;
pub mod service;
pub(crate) mod shape;

use crate::document::SchemaVersion;
use crate::error::{ComposeError, Result};
use crate::value::RawService;

use self::legacy::{LEGACY_FIELDS, LegacyServiceConfig};
use self::service::{Availability, SERVICE_FIELDS, ServiceConfig, find_field};

/// Option holding the extends reference; consumed during resolution.
pub const EXTENDS_KEY: &str = "extends";

/// Returns `true` if `key` is a valid service option in `version`.
pub fn is_known_option(version: SchemaVersion, key: &str) -> bool {
    if key == EXTENDS_KEY {
        return true;
    }
    match version {
        SchemaVersion::Legacy => {
            find_field(LEGACY_FIELDS, key).is_some()
                || find_field(SERVICE_FIELDS, key)
                    .is_some_and(|f| f.availability == Availability::Both)
        }
        SchemaVersion::Structured => find_field(SERVICE_FIELDS, key).is_some(),
    }
}

/// Checks every option of an authored record against the schema.
///
/// # Errors
///
/// Returns [`ComposeError::UnsupportedField`] for the first unknown option.
pub fn validate_options(version: SchemaVersion, service: &str, record: &RawService) -> Result<()> {
    match record.keys().find(|key| !is_known_option(version, key)) {
        Some(field) => Err(ComposeError::UnsupportedField {
            service: service.to_owned(),
            field: field.clone(),
        }),
        None => Ok(()),
    }
}

/// Checks an authored record, still carrying its own `extends`, in its own name.
///
/// Both option names and value shapes are checked, so an error names the
/// service that is actually wrong rather than one that inherits from it.
///
/// # Errors
///
/// Returns the first unknown option or value of the wrong shape.
pub fn check_record(version: SchemaVersion, service: &str, record: &RawService) -> Result<()> {
    validate_options(version, service, record)?;
    let mut record = record.clone();
    let _ = record.remove(EXTENDS_KEY);
    match version {
        SchemaVersion::Structured => coerce_service(service, &record).map(drop),
        SchemaVersion::Legacy => coerce_legacy_service(service, &record).map(drop),
    }
}

/// Coerces a resolved record into the canonical model.
///
/// # Errors
///
/// Returns an error for unknown options or values of the wrong shape.
pub fn coerce_service(service: &str, record: &RawService) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::default();
    for (key, value) in record {
        let field = find_field(SERVICE_FIELDS, key).ok_or_else(|| unsupported(service, key))?;
        (field.read)(&mut config, value).map_err(|e| e.at(service, key))?;
    }
    Ok(config)
}

/// Coerces a resolved legacy record.
///
/// Legacy-only options are read first; everything else goes through the
/// canonical table so that options carried in from an existing config
/// during layering are understood too.
///
/// # Errors
///
/// Returns an error for unknown options or values of the wrong shape.
pub fn coerce_legacy_service(service: &str, record: &RawService) -> Result<LegacyServiceConfig> {
    let mut config = LegacyServiceConfig::default();
    for (key, value) in record {
        let read = if let Some(field) = find_field(LEGACY_FIELDS, key) {
            (field.read)(&mut config, value)
        } else if let Some(field) = find_field(SERVICE_FIELDS, key) {
            (field.read)(&mut config.service, value)
        } else {
            return Err(unsupported(service, key));
        };
        read.map_err(|e| e.at(service, key))?;
    }
    Ok(config)
}

/// Converts a canonical config back into a raw record.
///
/// Only options that carry a value are emitted.
pub fn service_to_raw(config: &ServiceConfig) -> RawService {
    SERVICE_FIELDS
        .iter()
        .filter_map(|field| (field.write)(config).map(|value| (field.name.to_owned(), value)))
        .collect()
}

/// Converts a canonical config into a raw record using legacy spellings.
pub fn service_to_legacy_raw(config: &ServiceConfig) -> RawService {
    let legacy = LegacyServiceConfig::downgrade(config.clone());
    let mut record = service_to_raw(&legacy.service);
    record.extend(
        LEGACY_FIELDS
            .iter()
            .filter_map(|field| (field.write)(&legacy).map(|value| (field.name.to_owned(), value))),
    );
    record
}

fn unsupported(service: &str, key: &str) -> ComposeError {
    ComposeError::UnsupportedField {
        service: service.to_owned(),
        field: key.to_owned(),
    }
}
