//! Layered value store: command-line flags, environment, file and defaults.
//!
//! Each layer is gathered into a [`figment::value::Value`] tree keyed by the
//! leaves' canonical keys. Lookup is per leaf: the first layer holding a key
//! supplies its value, so layers never merge tables.

mod file;
mod provider;

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::ArgMatches;
use clap::parser::ValueSource;
use figment::Figment;
use figment::value::Value;
use tracing::{debug, info};

use crate::bind::LeafBinding;
use crate::decode::unbracketed;
use crate::error::AspResult;

pub use file::{default_search_paths, supported_extensions};
pub use provider::KeyedValues;

#[cfg(test)]
mod tests;

/// Where a resolved value came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerSource {
    /// Command-line flags.
    Flags,
    /// Environment variables.
    Env,
    /// A configuration file.
    File(PathBuf),
    /// The defaults instance.
    Defaults,
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flags => f.write_str("flags"),
            Self::Env => f.write_str("environment"),
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Defaults => f.write_str("defaults"),
        }
    }
}

/// One gathered layer.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Origin of the values.
    pub source: LayerSource,
    /// Values nested by canonical key.
    pub values: Value,
}

/// Gathered layers in precedence order.
#[derive(Clone, Debug)]
pub struct Layers {
    layers: Vec<Layer>,
}

impl Layers {
    /// Builds the list from layers ordered highest precedence first.
    #[must_use]
    pub const fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// The value for `key` from the highest-precedence layer holding it.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<(&LayerSource, &Value)> {
        self.layers
            .iter()
            .find_map(|layer| layer.values.find_ref(key).map(|value| (&layer.source, value)))
    }

    /// The layers, highest precedence first.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

/// Per-leaf bindings plus the file settings they are resolved against.
#[derive(Clone, Debug)]
pub struct Store {
    bindings: Vec<LeafBinding>,
    config_name: Option<String>,
    search_paths: Vec<PathBuf>,
}

impl Store {
    /// A store over `bindings`. With a `config_name`, `search_paths` are
    /// scanned for `<config_name>.<ext>`.
    #[must_use]
    pub const fn new(
        bindings: Vec<LeafBinding>,
        config_name: Option<String>,
        search_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            bindings,
            config_name,
            search_paths,
        }
    }

    /// Every leaf binding in schema order.
    #[must_use]
    pub fn bindings(&self) -> &[LeafBinding] {
        &self.bindings
    }

    /// The binding for a canonical key.
    #[must_use]
    pub fn binding(&self, key: &str) -> Option<&LeafBinding> {
        self.bindings.iter().find(|b| b.key == key)
    }

    /// The configuration file to read, if any.
    ///
    /// # Errors
    ///
    /// An `explicit` path that does not exist or has an unsupported
    /// extension is an error. A discovery miss is not.
    pub fn config_file(&self, explicit: Option<&Path>) -> AspResult<Option<PathBuf>> {
        if let Some(path) = explicit {
            file::check_explicit(path)?;
            return Ok(Some(path.to_path_buf()));
        }
        let Some(name) = self.config_name.as_deref() else {
            return Ok(None);
        };
        let found = file::find_config(name, &self.search_paths);
        if found.is_none() {
            debug!(name, "no configuration file found");
        }
        Ok(found)
    }

    /// Gathers every layer for one resolution.
    ///
    /// # Errors
    ///
    /// Fails when the configuration file cannot be found, read or parsed, or
    /// a layer cannot be gathered.
    pub fn layers(&self, matches: &ArgMatches, explicit: Option<&Path>) -> AspResult<Layers> {
        let mut layers = vec![
            Layer {
                source: LayerSource::Flags,
                values: gather(self.flag_values(matches))?,
            },
            Layer {
                source: LayerSource::Env,
                values: gather(self.env_values())?,
            },
        ];
        if let Some(path) = self.config_file(explicit)? {
            info!(path = %path.display(), "loading configuration file");
            layers.push(Layer {
                values: file::load_config(&path)?,
                source: LayerSource::File(path),
            });
        }
        layers.push(Layer {
            source: LayerSource::Defaults,
            values: gather(self.default_values())?,
        });
        Ok(Layers::new(layers))
    }

    /// Values given explicitly on the command line. Repeated occurrences of
    /// a list or map flag are unbracketed one by one and joined with `,`.
    fn flag_values(&self, matches: &ArgMatches) -> KeyedValues {
        let mut values = KeyedValues::new("command-line flags");
        for binding in self.bindings.iter().filter(|b| b.has_flag()) {
            let Ok(Some(raw)) = matches.try_get_raw(&binding.key) else {
                continue;
            };
            if matches.value_source(&binding.key) != Some(ValueSource::CommandLine) {
                continue;
            }
            let Some(occurrences) = raw.map(OsStr::to_str).collect::<Option<Vec<_>>>() else {
                debug!(key = %binding.key, "ignoring non-unicode flag value");
                continue;
            };
            let joined = match occurrences.as_slice() {
                [single] => (*single).to_owned(),
                _ => occurrences
                    .iter()
                    .map(|text| unbracketed(text))
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
                    .join(","),
            };
            values.insert(binding.key.clone(), Value::from(joined));
        }
        values
    }

    /// Values of bound environment variables. Unset and empty variables are
    /// skipped.
    fn env_values(&self) -> KeyedValues {
        let mut values = KeyedValues::new("environment");
        for binding in &self.bindings {
            let Some(name) = binding.env.as_deref() else {
                continue;
            };
            match std::env::var(name) {
                Ok(raw) if !raw.is_empty() => values.insert(binding.key.clone(), Value::from(raw)),
                Ok(_) => {}
                Err(std::env::VarError::NotPresent) => {}
                Err(std::env::VarError::NotUnicode(_)) => {
                    debug!(var = name, "ignoring non-unicode environment variable");
                }
            }
        }
        values
    }

    fn default_values(&self) -> KeyedValues {
        let mut values = KeyedValues::new("defaults");
        for binding in &self.bindings {
            values.insert(binding.key.clone(), binding.default.to_value());
        }
        values
    }
}

fn gather(values: KeyedValues) -> AspResult<Value> {
    Ok(Figment::from(values).extract::<Value>()?)
}
