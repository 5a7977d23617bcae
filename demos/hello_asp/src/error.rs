//! Error types for the demo.

use std::io;

use thiserror::Error;

/// Errors raised by the demo binary.
#[derive(Debug, Error)]
pub enum HelloError {
    /// Attaching or resolving the configuration failed.
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] asp::AspError),
    /// The resolved configuration cannot produce a greeting.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Writing the output failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Problems with a resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No usable salutation words.
    #[error("at least one salutation must be provided")]
    MissingSalutation,
    /// The recipient is empty after trimming.
    #[error("the recipient must contain visible characters")]
    BlankRecipient,
}

/// Result alias for the demo.
pub type Result<T> = std::result::Result<T, HelloError>;
