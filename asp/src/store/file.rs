//! Configuration file discovery and parsing.

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml", feature = "json", feature = "yaml"))]
use figment::providers::Format;
#[cfg(feature = "json")]
use figment::providers::Json;
#[cfg(feature = "toml")]
use figment::providers::Toml;
#[cfg(feature = "yaml")]
use figment::providers::Yaml;
use figment::value::Value;

use crate::error::{AspError, AspResult};

/// Directories scanned for the default configuration file: the working
/// directory, `~/.config`, the home directory and `/etc`.
#[must_use]
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(".")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config"));
        paths.push(home);
    }
    paths.push(PathBuf::from("/etc"));
    paths
}

/// File extensions handled by the enabled format features, in probe order.
#[must_use]
pub fn supported_extensions() -> Vec<&'static str> {
    let mut extensions = Vec::new();
    if cfg!(feature = "toml") {
        extensions.push("toml");
    }
    if cfg!(feature = "json") {
        extensions.push("json");
    }
    if cfg!(feature = "yaml") {
        extensions.extend(["yaml", "yml"]);
    }
    extensions
}

/// First existing `<dir>/<name>.<ext>` over `search_paths` and the supported
/// extensions.
pub(crate) fn find_config(name: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
    let extensions = supported_extensions();
    search_paths
        .iter()
        .flat_map(|dir| {
            extensions
                .iter()
                .map(move |ext| dir.join(format!("{name}.{ext}")))
        })
        .find(|candidate| candidate.is_file())
}

/// Checks an explicitly requested file before it is read.
pub(crate) fn check_explicit(path: &Path) -> AspResult<()> {
    if !path.is_file() {
        return Err(AspError::ConfigFileNotFound {
            path: path.to_path_buf(),
        });
    }
    let supported = extension(path).is_some_and(|ext| supported_extensions().contains(&ext.as_str()));
    if !supported {
        return Err(AspError::UnsupportedConfigFormat {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Reads and parses a configuration file into a value tree.
///
/// # Errors
///
/// Returns [`AspError::File`] when the file cannot be read or parsed and
/// [`AspError::UnsupportedConfigFormat`] for an unknown extension.
pub(crate) fn load_config(path: &Path) -> AspResult<Value> {
    let data = std::fs::read_to_string(path).map_err(|e| AspError::file(path, e))?;
    parse_config(path, &data)?
        .extract::<Value>()
        .map_err(|e| AspError::file(path, e))
}

fn parse_config(path: &Path, data: &str) -> AspResult<Figment> {
    let figment = match extension(path).as_deref() {
        #[cfg(feature = "toml")]
        Some("toml") => Figment::from(Toml::string(data)),
        #[cfg(feature = "json")]
        Some("json") => Figment::from(Json::string(data)),
        #[cfg(feature = "yaml")]
        Some("yaml" | "yml") => Figment::from(Yaml::string(data)),
        _ => {
            return Err(AspError::UnsupportedConfigFormat {
                path: path.to_path_buf(),
            });
        }
    };
    Ok(figment)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}
