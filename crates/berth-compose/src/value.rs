//! Untyped tree representation of compose documents.
//!
//! Everything a document contains is first decoded into [`RawValue`] before
//! any schema is imposed. Scalars are kept as text so that values such as
//! `restart: "no"` survive untouched until the schema decides what they mean.

use std::collections::BTreeMap;

use crate::error::{ComposeError, Result};

/// A dynamically shaped document value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// A scalar, stored as its source text.
    Scalar(String),
    /// An ordered sequence.
    Sequence(Vec<RawValue>),
    /// A mapping from string keys to values.
    Mapping(BTreeMap<String, RawValue>),
}

/// One service's options exactly as authored.
pub type RawService = BTreeMap<String, RawValue>;

/// Services keyed by name.
pub type RawServiceMap = BTreeMap<String, RawService>;

impl RawValue {
    /// Builds a scalar.
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// Returns the scalar text, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the mapping, if this is a mapping.
    pub const fn as_mapping(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the sequence, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Converts a decoded YAML value.
    ///
    /// `null` becomes an empty scalar, booleans and numbers become their
    /// canonical text, tags are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Decode`] if a mapping key is not a scalar.
    pub fn from_yaml(value: serde_yaml::Value, file: &str) -> Result<Self> {
        use serde_yaml::Value;

        Ok(match value {
            Value::Null => Self::Scalar(String::new()),
            Value::Bool(b) => Self::Scalar(b.to_string()),
            Value::Number(n) => Self::Scalar(n.to_string()),
            Value::String(s) => Self::Scalar(s),
            Value::Sequence(items) => Self::Sequence(
                items
                    .into_iter()
                    .map(|item| Self::from_yaml(item, file))
                    .collect::<Result<_>>()?,
            ),
            Value::Mapping(map) => {
                let mut out = BTreeMap::new();
                for (key, item) in map {
                    let key = match Self::from_yaml(key, file)? {
                        Self::Scalar(k) => k,
                        other => {
                            return Err(ComposeError::Decode {
                                file: file.to_owned(),
                                message: format!("mapping keys must be scalars, got {other:?}"),
                            });
                        }
                    };
                    let _ = out.insert(key, Self::from_yaml(item, file)?);
                }
                Self::Mapping(out)
            }
            Value::Tagged(tagged) => Self::from_yaml(tagged.value, file)?,
        })
    }

    /// Interprets this value as a service record.
    ///
    /// An empty scalar (`web:` with nothing after it) is an empty record.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Decode`] for any other non-mapping value.
    pub fn into_service(self, name: &str, file: &str) -> Result<RawService> {
        match self {
            Self::Mapping(m) => Ok(m),
            Self::Scalar(s) if s.is_empty() => Ok(RawService::new()),
            _ => Err(ComposeError::Decode {
                file: file.to_owned(),
                message: format!("service \"{name}\" must be a mapping"),
            }),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(values: Vec<String>) -> Self {
        Self::Sequence(values.into_iter().map(Self::Scalar).collect())
    }
}

impl From<BTreeMap<String, String>> for RawValue {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self::Mapping(values.into_iter().map(|(k, v)| (k, Self::Scalar(v))).collect())
    }
}
