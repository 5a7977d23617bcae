//! Demo program for `asp`: a greeting whose options come from flags,
//! `HELLO_*` environment variables, `hello_asp.toml` or built-in defaults.

pub mod config;
pub mod error;

use std::io::{self, Write};

use config::HelloConfig;
use error::{Result, ValidationError};

/// Builds the greeting line for `config`.
///
/// # Errors
///
/// Returns [`ValidationError`] when there is nothing to greet with or
/// nobody to greet.
pub fn greeting(config: &HelloConfig) -> std::result::Result<String, ValidationError> {
    let salutation = config
        .salutations
        .iter()
        .map(|word| word.trim())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if salutation.is_empty() {
        return Err(ValidationError::MissingSalutation);
    }
    let recipient = config.recipient.trim();
    if recipient.is_empty() {
        return Err(ValidationError::BlankRecipient);
    }
    let punctuation = if config.excited { "!" } else { "." };
    Ok(format!("{salutation}, {recipient}{punctuation}"))
}

/// Writes `line` to standard output.
///
/// # Errors
///
/// Fails when standard output is closed.
pub fn print_line(line: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{line}")?;
    Ok(())
}
