//! Error taxonomy for compose resolution.
//!
//! Every variant is fatal to the enclosing resolution call. Fields are kept
//! structured so callers can point operators at the offending document.

use berth_common::error::BerthError;
use thiserror::Error;

/// Errors raised while resolving a compose document.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The input bytes are not a well-formed document.
    #[error("failed to decode {file}: {message}")]
    Decode {
        /// Label of the file being decoded.
        file: String,
        /// Decoder diagnostic.
        message: String,
    },

    /// A string value contains a malformed `$` expression.
    #[error("invalid interpolation format for \"{option}\" option in service \"{service}\": \"{value}\"")]
    InvalidInterpolation {
        /// Option whose value failed to interpolate.
        option: String,
        /// Service owning the option.
        service: String,
        /// The raw value as authored.
        value: String,
    },

    /// `extends.file` was used without a resource lookup.
    #[error("cross-file extends is not supported in {file}")]
    ExtendsUnsupported {
        /// File containing the reference.
        file: String,
    },

    /// The extended service does not exist in the current document.
    #[error("cannot extend service \"{service}\": service not found")]
    ExtendNotFound {
        /// Name of the missing base service.
        service: String,
    },

    /// The extended service does not exist in the referenced file.
    #[error("cannot extend service \"{service}\": service not found in {file}")]
    ExtendNotFoundInFile {
        /// Name of the missing base service.
        service: String,
        /// File that was searched.
        file: String,
    },

    /// The base service defines a field that cannot be inherited.
    #[error("cannot extend service \"{service}\" in {file}: services with \"{field}\" cannot be extended")]
    ExtendRestrictedField {
        /// Name of the base service.
        service: String,
        /// Restricted field present on the base.
        field: String,
        /// File the base service was read from.
        file: String,
    },

    /// An extends chain loops back onto itself.
    #[error("circular extends detected at service \"{service}\" in {file}")]
    ExtendCycle {
        /// Service reached a second time.
        service: String,
        /// File the service lives in.
        file: String,
    },

    /// A service record contains a key the schema does not know.
    #[error("unsupported config option for {service} service: '{field}'")]
    UnsupportedField {
        /// Service name.
        service: String,
        /// Unknown key.
        field: String,
    },

    /// A volume or network definition contains an unknown key.
    #[error("unsupported config option for {kind} \"{name}\": '{field}'")]
    UnsupportedResourceField {
        /// `volume` or `network`.
        kind: &'static str,
        /// Resource name.
        name: String,
        /// Unknown key.
        field: String,
    },

    /// A value does not have the shape its field requires.
    #[error("service '{service}' configuration key '{field}' contains an invalid type, it should be {expected}")]
    InvalidFieldType {
        /// Service (or volume/network) name.
        service: String,
        /// Offending key.
        field: String,
        /// Description of the accepted shape.
        expected: &'static str,
    },

    /// A list field that must hold distinct entries contains duplicates.
    #[error("service '{service}' configuration key '{field}' value {entries:?} has non-unique elements")]
    NonUniqueEntries {
        /// Service name.
        service: String,
        /// Offending key.
        field: String,
        /// The list as authored.
        entries: Vec<String>,
    },

    /// The resource lookup could not provide a referenced file.
    #[error("failed to load {file}: {source}")]
    Lookup {
        /// File that was requested.
        file: String,
        /// Underlying failure.
        source: BerthError,
    },

    /// A shared workspace error.
    #[error(transparent)]
    Common(#[from] BerthError),
}

/// Convenience alias used throughout the compose crate.
pub type Result<T> = std::result::Result<T, ComposeError>;
