//! Failures raised by decode hooks and structural decoding.

use thiserror::Error;

use crate::LeafKind;

/// Errors produced when a raw value cannot be converted to its target type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoercionError {
    /// Timestamp text that matches neither a keyword nor the fixed format.
    #[error("invalid time {raw:?}: {reason}")]
    InvalidTime {
        /// Raw input.
        raw: String,
        /// Parser message.
        reason: String,
    },

    /// Input that is not valid lowercase or uppercase hex.
    #[error("invalid hex bytes {raw:?}: {reason}")]
    InvalidHex {
        /// Raw input.
        raw: String,
        /// Decoder message.
        reason: String,
    },

    /// A map entry without `=` or with an unparsable value.
    #[error("unexpected map entry {entry:?}")]
    MalformedMapEntry {
        /// The entry as it appeared after splitting.
        entry: String,
    },

    /// Integer text that does not fit the target.
    #[error("invalid integer {raw:?}: {reason}")]
    InvalidInteger {
        /// Raw input.
        raw: String,
        /// Parser message.
        reason: String,
    },

    /// Boolean text outside the accepted spellings.
    #[error("invalid boolean {raw:?}")]
    InvalidBool {
        /// Raw input.
        raw: String,
    },

    /// Duration text that does not follow the `1h2m3s` grammar.
    #[error("invalid duration {raw:?}: {reason}")]
    InvalidDuration {
        /// Raw input.
        raw: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A structured value whose shape does not match the target kind.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Type tag of the target leaf.
        expected: &'static str,
        /// Description of the value that was found.
        found: &'static str,
    },
}

impl CoercionError {
    /// Builds a [`CoercionError::TypeMismatch`] for `target`.
    #[must_use]
    pub const fn mismatch(target: LeafKind, found: &'static str) -> Self {
        Self::TypeMismatch {
            expected: target.type_tag(),
            found,
        }
    }
}
