//! Attaching a schema to a clap command and resolving it after parsing.

mod context;

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Arg, ArgMatches, Command};
use tracing::{info, trace};

use crate::attributes::{Attrs, Scope};
use crate::bind::{CONFIG_ARG_ID, Reserved, bind_schema, config_arg, leaf_arg};
use crate::decode::DecodeHooks;
use crate::error::{AspError, AspResult};
use crate::leaf::{LeafKind, LeafValue};
use crate::schema::{FieldMeta, LeafSource, Schema};
use crate::store::{Layers, Store, default_search_paths};

pub use context::AttachedConfig;

#[cfg(test)]
mod tests;

/// Environment prefix used unless [`AspBuilder::env_prefix`] says otherwise.
pub const DEFAULT_ENV_PREFIX: &str = "APP";

/// Options for [`Asp::attach`].
///
/// ```
/// use asp::{Asp, Schema};
/// use clap::Command;
///
/// #[derive(Schema, Default)]
/// struct Config {
///     port: u64,
/// }
///
/// let mut command = Command::new("demo");
/// let asp = Asp::<Config>::builder()
///     .env_prefix("DEMO")
///     .with_config_flag(false)
///     .attach(&mut command, &Config { port: 80 })
///     .unwrap();
/// let matches = command.try_get_matches_from(["demo", "--port", "8080"]).unwrap();
/// assert_eq!(asp.config(&matches).unwrap().port, 8080);
/// ```
pub struct AspBuilder<T> {
    config_name: Option<String>,
    env_prefix: String,
    config_flag: bool,
    hooks: DecodeHooks,
    search_paths: Option<Vec<PathBuf>>,
    schema: PhantomData<fn() -> T>,
}

impl<T> Default for AspBuilder<T> {
    fn default() -> Self {
        Self {
            config_name: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_owned(),
            config_flag: true,
            hooks: DecodeHooks::standard(),
            search_paths: None,
            schema: PhantomData,
        }
    }
}

impl<T> fmt::Debug for AspBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspBuilder")
            .field("config_name", &self.config_name)
            .field("env_prefix", &self.env_prefix)
            .field("config_flag", &self.config_flag)
            .field("hooks", &self.hooks)
            .field("search_paths", &self.search_paths)
            .finish()
    }
}

impl<T: Schema> AspBuilder<T> {
    /// Looks for `<name>.<ext>` in the search paths when `--config` is not
    /// given.
    #[must_use]
    pub fn default_config_name(mut self, name: impl Into<String>) -> Self {
        self.config_name = Some(name.into());
        self
    }

    /// Prefix joined to every environment variable name with `_`. An empty
    /// prefix disables it.
    #[must_use]
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Whether to register the global `--config <FILE>` flag. On by default.
    #[must_use]
    pub const fn with_config_flag(mut self, enabled: bool) -> Self {
        self.config_flag = enabled;
        self
    }

    /// Replaces the standard decode hooks.
    #[must_use]
    pub fn decode_hooks(mut self, hooks: DecodeHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replaces the directories scanned for the default configuration file.
    #[must_use]
    pub fn search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Binds every leaf of `defaults` and registers its flags on `command`.
    ///
    /// Nothing is registered unless the whole schema binds, so `command` is
    /// left untouched on error.
    ///
    /// # Errors
    ///
    /// Returns the first binding error: an unsupported field, an invalid or
    /// clashing flag name, a repeated canonical key or a broken description
    /// template.
    pub fn attach(self, command: &mut Command, defaults: &T) -> AspResult<Asp<T>> {
        let reserved = Reserved::for_command(command, self.config_flag);
        let bindings = bind_schema(defaults, Attrs::root(&self.env_prefix), reserved)?;
        let hooks = Arc::new(self.hooks);

        let mut args: Vec<Arg> = bindings
            .iter()
            .filter_map(|b| leaf_arg(b, &hooks))
            .collect();
        if self.config_flag {
            args.push(config_arg());
        }
        *command = mem::take(command).args(args);
        info!(
            command = command.get_name(),
            leaves = bindings.len(),
            "attached configuration schema"
        );

        let search_paths = self.search_paths.unwrap_or_else(default_search_paths);
        let asp = Asp {
            store: Store::new(bindings, self.config_name, search_paths),
            hooks,
            config_flag: self.config_flag,
            schema: PhantomData,
        };
        Ok(asp)
    }
}

/// A schema attached to a command.
///
/// Holds the leaf bindings and decode hooks; [`Asp::config`] resolves a
/// fresh instance from parsed matches as often as needed.
pub struct Asp<T> {
    store: Store,
    hooks: Arc<DecodeHooks>,
    config_flag: bool,
    schema: PhantomData<fn() -> T>,
}

impl<T> Clone for Asp<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            hooks: Arc::clone(&self.hooks),
            config_flag: self.config_flag,
            schema: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Asp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asp")
            .field("store", &self.store)
            .field("config_flag", &self.config_flag)
            .finish_non_exhaustive()
    }
}

impl<T: Schema> Asp<T> {
    /// Options for attaching `T`.
    #[must_use]
    pub fn builder() -> AspBuilder<T> {
        AspBuilder::default()
    }

    /// Attaches `T` with the default options.
    ///
    /// # Errors
    ///
    /// See [`AspBuilder::attach`].
    pub fn attach(command: &mut Command, defaults: &T) -> AspResult<Self> {
        Self::builder().attach(command, defaults)
    }

    /// The leaf bindings and file settings.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// The decode hooks used for flags and resolution.
    #[must_use]
    pub fn hooks(&self) -> &DecodeHooks {
        &self.hooks
    }

    /// Resolves a fresh `T` from `matches`, the environment, the
    /// configuration file and the defaults, in that order of precedence.
    ///
    /// Pass the matches of the (sub)command being run; attached flags are
    /// global and reach every subcommand.
    ///
    /// # Errors
    ///
    /// Fails when the configuration file cannot be loaded or a value cannot
    /// be decoded into its field's type.
    pub fn config(&self, matches: &ArgMatches) -> AspResult<T> {
        let explicit = if self.config_flag {
            matches
                .try_get_one::<PathBuf>(CONFIG_ARG_ID)
                .ok()
                .flatten()
        } else {
            None
        };
        let layers = self.store.layers(matches, explicit.map(PathBuf::as_path))?;
        let mut resolver = Resolver {
            scope: Scope::new(Attrs::default()),
            layers: &layers,
            hooks: &self.hooks,
        };
        T::assemble(&mut resolver)
    }
}

/// Pulls leaves out of gathered layers while a schema assembles itself.
struct Resolver<'a> {
    scope: Scope,
    layers: &'a Layers,
    hooks: &'a DecodeHooks,
}

impl LeafSource for Resolver<'_> {
    fn leaf(&mut self, field: &FieldMeta, kind: LeafKind) -> AspResult<LeafValue> {
        let key = self.scope.leaf(field).name;
        let Some((source, value)) = self.layers.lookup(&key) else {
            return Err(AspError::MissingValue { key });
        };
        trace!(key = %key, %source, "resolving leaf");
        self.hooks
            .convert(value, kind)
            .map_err(|e| AspError::coercion(key, e))
    }

    fn enter(&mut self, field: &FieldMeta) {
        self.scope.descend(field);
    }

    fn leave(&mut self) {
        self.scope.ascend();
    }

    fn unsupported(&mut self, field: &FieldMeta) -> AspError {
        AspError::UnsupportedFieldType {
            field: self.scope.leaf(field).name,
            type_name: field.type_name,
        }
    }
}
