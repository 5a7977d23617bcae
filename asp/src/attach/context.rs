//! Type-erased handle over an attached schema.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use clap::ArgMatches;

use super::Asp;
use crate::error::{AspError, AspResult};
use crate::schema::Schema;

/// An [`Asp`] with its schema type erased, for storing alongside a command
/// or in request-scoped state.
///
/// ```
/// use asp::{Asp, AspError, AttachedConfig, Schema};
/// use clap::Command;
///
/// #[derive(Schema, Default)]
/// struct Config {
///     name: String,
/// }
///
/// #[derive(Schema, Default)]
/// struct Other {
///     name: String,
/// }
///
/// let asp = Asp::attach(&mut Command::new("demo"), &Config::default()).unwrap();
/// let attached = AttachedConfig::new(asp);
/// assert!(attached.asp::<Config>().is_ok());
/// assert!(matches!(attached.asp::<Other>(), Err(AspError::ConfigTypeMismatch)));
/// ```
#[derive(Clone)]
pub struct AttachedConfig {
    inner: Arc<dyn Any + Send + Sync>,
    schema: &'static str,
}

impl AttachedConfig {
    /// Erases the schema type of `asp`.
    #[must_use]
    pub fn new<T: Schema + 'static>(asp: Asp<T>) -> Self {
        Self {
            inner: Arc::new(asp),
            schema: type_name::<T>(),
        }
    }

    /// The attached schema, if it is `T`.
    ///
    /// # Errors
    ///
    /// Returns [`AspError::ConfigTypeMismatch`] when another schema type was
    /// attached.
    pub fn asp<T: Schema + 'static>(&self) -> AspResult<&Asp<T>> {
        self.inner
            .downcast_ref::<Asp<T>>()
            .ok_or(AspError::ConfigTypeMismatch)
    }

    /// Resolves the attached schema as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`AspError::ConfigTypeMismatch`] for the wrong type, otherwise
    /// any error from [`Asp::config`].
    pub fn config<T: Schema + 'static>(&self, matches: &ArgMatches) -> AspResult<T> {
        self.asp::<T>()?.config(matches)
    }

    /// Type name of the attached schema.
    #[must_use]
    pub const fn schema_name(&self) -> &'static str {
        self.schema
    }
}

impl<T: Schema + 'static> From<Asp<T>> for AttachedConfig {
    fn from(asp: Asp<T>) -> Self {
        Self::new(asp)
    }
}

impl fmt::Debug for AttachedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedConfig")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
