//! Document shapes and schema version detection.
//!
//! A document is either *legacy* (service names at the top level) or
//! *structured* (`version: "2"` with `services`, `volumes`, `networks`).
//! The version check here is the single dispatch point of the engine.

use std::collections::BTreeMap;
use std::fmt;

use berth_common::constants::STRUCTURED_VERSION;

use crate::error::{ComposeError, Result};
use crate::value::{RawServiceMap, RawValue};

/// Schema generation a document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// Flat layout: top-level keys are services.
    Legacy,
    /// `version: "2"` layout.
    Structured,
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "1"),
            Self::Structured => write!(f, "{STRUCTURED_VERSION}"),
        }
    }
}

/// Parse result of one input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDocument {
    /// Service name mapped directly to its record.
    Legacy {
        /// Services keyed by name.
        services: RawServiceMap,
    },
    /// Structured document with separate collections.
    Structured {
        /// Services keyed by name.
        services: RawServiceMap,
        /// Named volume definitions.
        volumes: BTreeMap<String, RawValue>,
        /// Named network definitions.
        networks: BTreeMap<String, RawValue>,
    },
}

impl RawDocument {
    /// Decodes `bytes` and selects the document shape from the `version` key.
    ///
    /// An empty document is an empty legacy document.
    /// Merge keys (`<<: *anchor`) are applied before anything else.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Decode`] if the bytes are not well-formed YAML,
    /// if the top level is not a mapping, or if a collection has the wrong shape.
    pub fn parse(file: &str, bytes: &[u8]) -> Result<Self> {
        let to_decode = |e: serde_yaml::Error| ComposeError::Decode {
            file: file.to_owned(),
            message: e.to_string(),
        };
        let mut decoded: serde_yaml::Value = serde_yaml::from_slice(bytes).map_err(to_decode)?;
        decoded.apply_merge().map_err(to_decode)?;

        let mut top = match RawValue::from_yaml(decoded, file)? {
            RawValue::Mapping(m) => m,
            RawValue::Scalar(s) if s.is_empty() => BTreeMap::new(),
            _ => return Err(decode_err(file, "top level must be a mapping")),
        };

        let version = top.get("version").and_then(RawValue::as_scalar);
        if version == Some(STRUCTURED_VERSION) {
            tracing::debug!(file, "structured compose document");
            let services = take_section(&mut top, "services", file)?
                .into_iter()
                .map(|(name, value)| {
                    let record = value.into_service(&name, file)?;
                    Ok((name, record))
                })
                .collect::<Result<_>>()?;
            let volumes = take_section(&mut top, "volumes", file)?;
            let networks = take_section(&mut top, "networks", file)?;
            for key in top.keys().filter(|k| k.as_str() != "version") {
                tracing::debug!(file, key = key.as_str(), "ignoring top-level key");
            }
            return Ok(Self::Structured {
                services,
                volumes,
                networks,
            });
        }

        if let Some(RawValue::Scalar(other)) = top.get("version") {
            tracing::warn!(file, version = other.as_str(), "unsupported compose version, reading as legacy");
            let _ = top.remove("version");
        }

        let services = top
            .into_iter()
            .map(|(name, value)| {
                let record = value.into_service(&name, file)?;
                Ok((name, record))
            })
            .collect::<Result<_>>()?;
        Ok(Self::Legacy { services })
    }

    /// Returns the schema generation of this document.
    pub const fn version(&self) -> SchemaVersion {
        match self {
            Self::Legacy { .. } => SchemaVersion::Legacy,
            Self::Structured { .. } => SchemaVersion::Structured,
        }
    }

    /// Returns the service collection.
    pub const fn services(&self) -> &RawServiceMap {
        match self {
            Self::Legacy { services } | Self::Structured { services, .. } => services,
        }
    }

    /// Consumes the document, returning its service collection.
    pub fn into_services(self) -> RawServiceMap {
        match self {
            Self::Legacy { services } | Self::Structured { services, .. } => services,
        }
    }
}

fn take_section(
    top: &mut BTreeMap<String, RawValue>,
    key: &str,
    file: &str,
) -> Result<BTreeMap<String, RawValue>> {
    match top.remove(key) {
        None => Ok(BTreeMap::new()),
        Some(RawValue::Mapping(m)) => Ok(m),
        Some(RawValue::Scalar(s)) if s.is_empty() => Ok(BTreeMap::new()),
        Some(_) => Err(decode_err(file, &format!("\"{key}\" must be a mapping"))),
    }
}

fn decode_err(file: &str, message: &str) -> ComposeError {
    ComposeError::Decode {
        file: file.to_owned(),
        message: message.to_owned(),
    }
}
