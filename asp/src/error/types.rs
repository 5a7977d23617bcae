//! Primary error enum for attach and resolution flows.

use std::path::PathBuf;

use figment::Error as FigmentError;
use thiserror::Error;

use super::CoercionError;

/// Result alias used throughout the crate.
pub type AspResult<T> = Result<T, AspError>;

/// Errors that can occur while attaching a schema or resolving its values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AspError {
    /// A field's type is neither a supported leaf nor a nested schema.
    #[error(
        "config field '{field}' has unsupported type `{type_name}`: pointers, arrays, \
         channels and size-specific numbers cannot be bound"
    )]
    UnsupportedFieldType {
        /// Canonical name of the offending field.
        field: String,
        /// Source representation of the field's type.
        type_name: &'static str,
    },

    /// A short flag name that is not exactly one character.
    #[error("invalid short flag '{short}' for '{field}': must be a single character")]
    InvalidShortFlag {
        /// Canonical name of the field.
        field: String,
        /// The rejected short name.
        short: String,
    },

    /// A long or short flag name already registered on the command.
    #[error("flag '{flag}' for '{field}' is already defined")]
    DuplicateFlag {
        /// Canonical name of the field.
        field: String,
        /// The clashing flag, rendered with its dashes.
        flag: String,
    },

    /// Two leaves resolving to the same canonical key.
    #[error("config key '{key}' is defined more than once")]
    DuplicateKey {
        /// The repeated canonical key.
        key: String,
    },

    /// A description template that could not be rendered.
    #[error("invalid description template for '{field}': {message}")]
    DescriptionTemplate {
        /// Canonical name of the field.
        field: String,
        /// What was wrong with the template.
        message: String,
    },

    /// A raw value that could not be converted to its target type.
    #[error("failed to decode '{key}': {source}")]
    Coercion {
        /// Canonical key whose value failed to decode.
        key: String,
        /// Underlying coercion failure.
        #[source]
        source: CoercionError,
    },

    /// No layer, not even the defaults, supplied a value for a leaf.
    #[error("no value found for config key '{key}'")]
    MissingValue {
        /// Canonical key that could not be found.
        key: String,
    },

    /// An explicitly requested configuration file does not exist.
    #[error("config file '{}' not found", path.display())]
    ConfigFileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// A configuration file with an extension no enabled format handles.
    #[error("unsupported config file format for '{}'", path.display())]
    UnsupportedConfigFormat {
        /// Offending path.
        path: PathBuf,
    },

    /// Error originating from a configuration file.
    #[error("configuration file error in '{}': {source}", path.display())]
    File {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying error reported by the reader or parser.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error while querying a configuration layer.
    #[error("failed to gather configuration: {0}")]
    Gathering(#[from] Box<FigmentError>),

    /// Attached configuration requested with a different schema type.
    #[error("the attached configuration was requested with the wrong type")]
    ConfigTypeMismatch,
}
