//! Environment variable substitution in string values.
//!
//! The grammar is fixed and small:
//!
//! - `$$` produces a literal `$`.
//! - `$VAR` substitutes the longest run of `[A-Z_]` following the `$`.
//! - `${VAR}` substitutes a non-empty `[A-Z_]+` name closed by `}`.
//!
//! Anything else after a `$` makes the whole value invalid. Substituted text
//! is never scanned again. Unset variables become the empty string and are
//! reported as [`Warning::UnsetVariable`].

use std::fmt;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::{map, value},
    sequence::{delimited, preceded},
};

use crate::error::{ComposeError, Result};
use crate::lookup::EnvironmentLookup;
use crate::value::{RawServiceMap, RawValue};

/// Non-fatal condition observed during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A referenced variable was unset and replaced by an empty string.
    UnsetVariable {
        /// Service owning the option.
        service: String,
        /// Option containing the reference.
        option: String,
        /// Variable name.
        variable: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsetVariable { variable, .. } => write!(
                f,
                "The {variable} variable is not set. Substituting a blank string."
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expression<'a> {
    Escape,
    Variable(&'a str),
}

const fn is_name_char(c: char) -> bool {
    c == '_' || c.is_ascii_uppercase()
}

fn literal(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c != '$').parse(input)
}

fn expression(input: &str) -> IResult<&str, Expression<'_>> {
    preceded(
        char('$'),
        alt((
            value(Expression::Escape, char('$')),
            map(
                delimited(char('{'), take_while1(is_name_char), char('}')),
                Expression::Variable,
            ),
            map(take_while1(is_name_char), Expression::Variable),
        )),
    )
    .parse(input)
}

/// Substitutes every expression in `line`.
///
/// Returns `None` if the line contains a malformed expression. Names of unset
/// variables are appended to `unset`.
fn substitute(line: &str, env: &dyn EnvironmentLookup, unset: &mut Vec<String>) -> Option<String> {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    loop {
        let (after, text) = literal(rest).ok()?;
        out.push_str(text);
        if after.is_empty() {
            return Some(out);
        }

        let (after, expr) = expression(after).ok()?;
        match expr {
            Expression::Escape => out.push('$'),
            Expression::Variable(name) => match env.lookup(name) {
                Some(found) => out.push_str(&found),
                None => unset.push(name.to_owned()),
            },
        }
        rest = after;
    }
}

/// Interpolates one option value in place, walking sequences and mappings.
///
/// # Errors
///
/// Returns [`ComposeError::InvalidInterpolation`] for the first malformed scalar.
pub fn interpolate_value(
    value: &mut RawValue,
    option: &str,
    service: &str,
    env: &dyn EnvironmentLookup,
    warnings: &mut Vec<Warning>,
) -> Result<()> {
    match value {
        RawValue::Scalar(text) => {
            let mut unset = Vec::new();
            let replaced =
                substitute(text, env, &mut unset).ok_or_else(|| ComposeError::InvalidInterpolation {
                    option: option.to_owned(),
                    service: service.to_owned(),
                    value: text.clone(),
                })?;
            for variable in unset {
                tracing::warn!(service, option, "The {variable} variable is not set. Substituting a blank string.");
                warnings.push(Warning::UnsetVariable {
                    service: service.to_owned(),
                    option: option.to_owned(),
                    variable,
                });
            }
            *text = replaced;
        }
        RawValue::Sequence(items) => {
            for item in items {
                interpolate_value(item, option, service, env, warnings)?;
            }
        }
        RawValue::Mapping(entries) => {
            for item in entries.values_mut() {
                interpolate_value(item, option, service, env, warnings)?;
            }
        }
    }
    Ok(())
}

/// Interpolates every option of every service in place.
///
/// # Errors
///
/// Returns [`ComposeError::InvalidInterpolation`] for the first malformed value.
pub fn interpolate_services(
    services: &mut RawServiceMap,
    env: &dyn EnvironmentLookup,
    warnings: &mut Vec<Warning>,
) -> Result<()> {
    for (service, record) in services.iter_mut() {
        for (option, value) in record.iter_mut() {
            interpolate_value(value, option, service, env, warnings)?;
        }
    }
    Ok(())
}
