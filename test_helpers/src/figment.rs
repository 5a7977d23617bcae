//! Helpers for running tests inside a [`figment::Jail`].
//!
//! A jail gives the closure a fresh temporary working directory and restores
//! the process environment afterwards, which suits configuration discovery
//! tests that write files relative to `.`.

use anyhow::{Result, anyhow};

/// Executes `f` inside a [`figment::Jail`], returning the closure's output.
///
/// # Errors
///
/// Returns an error if the jail cannot be created or the closure fails.
///
/// # Examples
///
/// ```
/// use asp_test_helpers::figment::{figment_error, with_jail};
///
/// let contents = with_jail(|jail| {
///     jail.create_file("app.toml", "port = 80")?;
///     std::fs::read_to_string("app.toml").map_err(figment_error)
/// })
/// .unwrap();
/// assert_eq!(contents, "port = 80");
/// ```
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|j| {
        output = Some(f(j)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Converts any displayable error into a [`figment::Error`] so `?` works
/// inside [`with_jail`] closures.
#[expect(
    clippy::needless_pass_by_value,
    reason = "used with map_err, which hands over the error by value"
)]
pub fn figment_error<E: ToString>(err: E) -> figment::Error {
    figment::Error::from(err.to_string())
}
