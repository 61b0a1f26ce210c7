//! Value shapes accepted by schema fields.
//!
//! Each reader turns a [`RawValue`] into a typed value or reports which shape
//! was expected. Each writer does the reverse and returns `None` for unset
//! values, so that converting a typed record back to raw form only emits the
//! keys that carry information.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ComposeError;
use crate::value::RawValue;

/// Why a value was rejected by a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The value has the wrong shape; holds a description of the accepted one.
    Expected(&'static str),
    /// A list that must hold distinct entries has duplicates.
    NonUnique(Vec<String>),
}

impl ShapeError {
    /// Attaches the service and field the value belongs to.
    pub fn at(self, service: &str, field: &str) -> ComposeError {
        match self {
            Self::Expected(expected) => ComposeError::InvalidFieldType {
                service: service.to_owned(),
                field: field.to_owned(),
                expected,
            },
            Self::NonUnique(entries) => ComposeError::NonUniqueEntries {
                service: service.to_owned(),
                field: field.to_owned(),
                entries,
            },
        }
    }
}

/// Result of reading one field.
pub type ShapeResult<T> = std::result::Result<T, ShapeError>;

/// Reads a value into a typed record.
pub type Reader<T> = fn(&mut T, &RawValue) -> ShapeResult<()>;

/// Writes a typed record's field back to raw form.
pub type Writer<T> = fn(&T) -> Option<RawValue>;

/// Stores a successfully read value.
pub fn set<T>(slot: &mut T, value: ShapeResult<T>) -> ShapeResult<()> {
    *slot = value?;
    Ok(())
}

pub fn text(value: &RawValue) -> ShapeResult<Option<String>> {
    value
        .as_scalar()
        .map(|s| Some(s.to_owned()))
        .ok_or(ShapeError::Expected("a string"))
}

pub fn flag(value: &RawValue) -> ShapeResult<bool> {
    match value.as_scalar() {
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        _ => Err(ShapeError::Expected("a boolean")),
    }
}

pub fn number(value: &RawValue) -> ShapeResult<Option<i64>> {
    value
        .as_scalar()
        .and_then(|s| s.trim().parse().ok())
        .map(Some)
        .ok_or(ShapeError::Expected("a number"))
}

/// Reads a byte count such as `512`, `64k`, `512m` or `2gb`.
pub fn byte_size(value: &RawValue) -> ShapeResult<Option<i64>> {
    value
        .as_scalar()
        .and_then(parse_byte_size)
        .map(Some)
        .ok_or(ShapeError::Expected("a byte size"))
}

fn parse_byte_size(text: &str) -> Option<i64> {
    let lower = text.trim().to_ascii_lowercase();
    let split = lower
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map_or(lower.len(), |(i, _)| i);
    let (digits, unit) = lower.split_at(split);
    let amount: i64 = digits.parse().ok()?;
    let multiplier: i64 = match unit {
        "" | "b" => 1,
        "k" | "kb" => 1 << 10,
        "m" | "mb" => 1 << 20,
        "g" | "gb" => 1 << 30,
        _ => return None,
    };
    amount.checked_mul(multiplier)
}

pub fn list(value: &RawValue) -> ShapeResult<Vec<String>> {
    value
        .as_sequence()
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_scalar().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or(ShapeError::Expected("an array"))
}

pub fn unique_list(value: &RawValue) -> ShapeResult<Vec<String>> {
    let items = list(value)?;
    let distinct: BTreeSet<&String> = items.iter().collect();
    if distinct.len() == items.len() {
        Ok(items)
    } else {
        Err(ShapeError::NonUnique(items))
    }
}

pub fn string_or_list(value: &RawValue) -> ShapeResult<Vec<String>> {
    match value {
        RawValue::Scalar(s) if s.is_empty() => Ok(Vec::new()),
        RawValue::Scalar(s) => Ok(vec![s.clone()]),
        RawValue::Sequence(_) => list(value).map_err(|_| ShapeError::Expected("a string or an array")),
        RawValue::Mapping(_) => Err(ShapeError::Expected("a string or an array")),
    }
}

/// Reads a command line; strings are split with shell quoting rules.
pub fn command(value: &RawValue) -> ShapeResult<Vec<String>> {
    match value {
        RawValue::Scalar(s) => shlex::split(s).ok_or(ShapeError::Expected("a string or an array")),
        _ => string_or_list(value),
    }
}

/// Reads `KEY=VALUE` entries or a mapping of scalars.
pub fn dict(value: &RawValue) -> ShapeResult<BTreeMap<String, String>> {
    const EXPECTED: ShapeError = ShapeError::Expected("an array or a mapping");
    match value {
        RawValue::Mapping(entries) => entries
            .iter()
            .map(|(k, v)| v.as_scalar().map(|v| (k.clone(), v.to_owned())))
            .collect::<Option<_>>()
            .ok_or(EXPECTED),
        RawValue::Sequence(_) => Ok(list(value)
            .map_err(|_| EXPECTED)?
            .into_iter()
            .map(|entry| match entry.split_once('=') {
                Some((k, v)) => (k.to_owned(), v.to_owned()),
                None => (entry, String::new()),
            })
            .collect()),
        RawValue::Scalar(s) if s.is_empty() => Ok(BTreeMap::new()),
        RawValue::Scalar(_) => Err(EXPECTED),
    }
}

/// Reads `key:value` entries given either as a list or as a mapping.
///
/// Used for `host:ip` pairs and for `path:rate` device throttles.
pub fn colon_list(value: &RawValue) -> ShapeResult<Vec<String>> {
    match value {
        RawValue::Mapping(_) => Ok(dict(value)?
            .into_iter()
            .map(|(host, ip)| format!("{host}:{ip}"))
            .collect()),
        _ => list(value).map_err(|_| ShapeError::Expected("an array or a mapping")),
    }
}

pub fn text_raw(value: Option<&str>) -> Option<RawValue> {
    value.map(RawValue::scalar)
}

pub fn flag_raw(value: bool) -> Option<RawValue> {
    value.then(|| RawValue::scalar("true"))
}

pub fn number_raw(value: Option<i64>) -> Option<RawValue> {
    value.map(|n| RawValue::Scalar(n.to_string()))
}

pub fn list_raw(values: &[String]) -> Option<RawValue> {
    (!values.is_empty()).then(|| RawValue::from(values.to_vec()))
}

pub fn dict_raw(values: &BTreeMap<String, String>) -> Option<RawValue> {
    (!values.is_empty()).then(|| RawValue::from(values.clone()))
}

/// Reads an optional mapping entry as text.
pub fn entry_text(entries: &BTreeMap<String, RawValue>, key: &str) -> ShapeResult<Option<String>> {
    entries.get(key).map_or(Ok(None), text)
}
