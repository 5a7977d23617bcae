//! Unit tests for layer gathering and configuration file handling.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow, ensure};
use asp_test_helpers::env;
use clap::Command;
use figment::value::Value;
use rstest::{fixture, rstest};
use serial_test::serial;
use tempfile::TempDir;

use super::*;
use crate::bind::leaf_arg;
use crate::error::AspError;
use crate::leaf::{LeafKind, LeafValue};
use crate::DecodeHooks;

fn binding(key: &str, kind: LeafKind, default: LeafValue) -> LeafBinding {
    LeafBinding {
        key: key.to_owned(),
        kind,
        long: Some(key.replace(['.', '_'], "-")),
        short: None,
        env: Some(format!("ASP_STORE_TEST_{}", key.replace('.', "_").to_uppercase())),
        help: String::new(),
        default,
        sensitive: false,
    }
}

#[fixture]
fn store() -> Store {
    Store::new(
        vec![
            binding("port", LeafKind::Uint, LeafValue::Uint(80)),
            binding("server.host", LeafKind::Str, LeafValue::Str("localhost".into())),
            binding("tags", LeafKind::Strings, LeafValue::Strings(vec![])),
        ],
        None,
        Vec::new(),
    )
}

fn command(store: &Store) -> Command {
    let hooks = Arc::new(DecodeHooks::standard());
    Command::new("demo")
        .no_binary_name(true)
        .args(store.bindings().iter().filter_map(|b| leaf_arg(b, &hooks)))
}

fn string_at<'a>(layers: &'a Layers, key: &str) -> Option<(&'a LayerSource, &'a str)> {
    layers
        .lookup(key)
        .and_then(|(source, value)| value.as_str().map(|s| (source, s)))
}

#[rstest]
#[serial]
fn defaults_fill_every_key(store: Store) -> Result<()> {
    let _scope = env::scope_with(|lock| {
        vec![
            lock.remove_var("ASP_STORE_TEST_PORT"),
            lock.remove_var("ASP_STORE_TEST_SERVER_HOST"),
            lock.remove_var("ASP_STORE_TEST_TAGS"),
        ]
    });
    let matches = command(&store).try_get_matches_from(Vec::<String>::new())?;
    let layers = store.layers(&matches, None)?;
    ensure!(layers.layers().len() == 3);
    ensure!(string_at(&layers, "server.host") == Some((&LayerSource::Defaults, "localhost")));
    let (source, port) = layers.lookup("port").ok_or_else(|| anyhow!("no port"))?;
    ensure!(*source == LayerSource::Defaults);
    ensure!(port.to_u128() == Some(80));
    Ok(())
}

#[rstest]
#[serial]
fn flags_beat_environment(store: Store) -> Result<()> {
    let _scope = env::scope_with(|lock| {
        vec![
            lock.set_var("ASP_STORE_TEST_PORT", "8080"),
            lock.set_var("ASP_STORE_TEST_SERVER_HOST", "example.org"),
            lock.set_var("ASP_STORE_TEST_TAGS", ""),
        ]
    });
    let matches =
        command(&store).try_get_matches_from(["--port", "9090", "--tags", "a", "--tags", "b"])?;
    let layers = store.layers(&matches, None)?;
    ensure!(string_at(&layers, "port") == Some((&LayerSource::Flags, "9090")));
    ensure!(string_at(&layers, "server.host") == Some((&LayerSource::Env, "example.org")));
    ensure!(string_at(&layers, "tags") == Some((&LayerSource::Flags, "a,b")));
    Ok(())
}

#[rstest]
#[serial]
fn empty_environment_values_are_ignored(store: Store) -> Result<()> {
    let _scope = env::scope_with(|lock| {
        vec![
            lock.set_var("ASP_STORE_TEST_PORT", ""),
            lock.remove_var("ASP_STORE_TEST_SERVER_HOST"),
            lock.remove_var("ASP_STORE_TEST_TAGS"),
        ]
    });
    let matches = command(&store).try_get_matches_from(Vec::<String>::new())?;
    let layers = store.layers(&matches, None)?;
    let (source, _) = layers.lookup("port").ok_or_else(|| anyhow!("no port"))?;
    ensure!(*source == LayerSource::Defaults);
    Ok(())
}

#[test]
fn keyed_values_nest_dotted_keys() -> Result<()> {
    let mut values = KeyedValues::new("test");
    values.insert("a.b.c", Value::from("deep"));
    values.insert("a.d", Value::from(1_u64));
    values.insert("e", Value::from(true));
    ensure!(values.len() == 3);
    let tree: Value = Figment::from(values).extract()?;
    ensure!(tree.find_ref("a.b.c").and_then(Value::as_str) == Some("deep"));
    ensure!(tree.find_ref("a.d").and_then(Value::to_u128) == Some(1));
    ensure!(tree.find_ref("e").and_then(Value::to_bool) == Some(true));
    ensure!(tree.find_ref("a.b.x").is_none());
    Ok(())
}

fn write(dir: &TempDir, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

fn discovering(dirs: &[&TempDir]) -> Store {
    Store::new(
        Vec::new(),
        Some("app".to_owned()),
        dirs.iter().map(|d| d.path().to_path_buf()).collect(),
    )
}

#[test]
fn discovery_takes_the_first_directory_with_a_match() -> Result<()> {
    let first = TempDir::new()?;
    let second = TempDir::new()?;
    write(&first, "other.toml", "")?;
    let expected = write(&second, "app.json", "{}")?;
    write(&second, "app.yaml", "")?;
    let found = discovering(&[&first, &second]).config_file(None)?;
    ensure!(found == Some(expected), "{found:?}");
    Ok(())
}

#[test]
fn discovery_prefers_toml_within_a_directory() -> Result<()> {
    let dir = TempDir::new()?;
    write(&dir, "app.json", "{}")?;
    let expected = write(&dir, "app.toml", "")?;
    ensure!(discovering(&[&dir]).config_file(None)? == Some(expected));
    Ok(())
}

#[test]
fn discovery_misses_are_not_errors() -> Result<()> {
    let dir = TempDir::new()?;
    ensure!(discovering(&[&dir]).config_file(None)?.is_none());
    ensure!(Store::new(Vec::new(), None, Vec::new()).config_file(None)?.is_none());
    Ok(())
}

#[test]
fn explicit_files_must_exist() -> Result<()> {
    let dir = TempDir::new()?;
    let missing = dir.path().join("missing.toml");
    let err = discovering(&[&dir]).config_file(Some(&missing)).err();
    ensure!(
        matches!(&err, Some(AspError::ConfigFileNotFound { path }) if *path == missing),
        "{err:?}"
    );
    Ok(())
}

#[test]
fn explicit_files_need_a_known_extension() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write(&dir, "app.ini", "port = 1")?;
    let err = discovering(&[]).config_file(Some(&path)).err();
    ensure!(
        matches!(err, Some(AspError::UnsupportedConfigFormat { .. })),
        "{err:?}"
    );
    Ok(())
}

#[test]
fn files_parse_by_extension() -> Result<()> {
    let dir = TempDir::new()?;
    let toml = write(&dir, "app.toml", "port = 1\n[server]\nhost = \"toml\"\n")?;
    let json = write(&dir, "app.json", r#"{"port": 2, "server": {"host": "json"}}"#)?;
    for (path, port, host) in [(toml, 1, "toml"), (json, 2, "json")] {
        let tree = file::load_config(&path)?;
        ensure!(tree.find_ref("port").and_then(Value::to_i128) == Some(port));
        ensure!(tree.find_ref("server.host").and_then(Value::as_str) == Some(host));
    }
    Ok(())
}

#[test]
fn malformed_files_name_the_path() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write(&dir, "app.toml", "port = = 1")?;
    let err = file::load_config(&path).err();
    ensure!(
        matches!(&err, Some(AspError::File { path: p, .. }) if *p == path),
        "{err:?}"
    );
    Ok(())
}

#[test]
fn default_search_paths_end_at_etc() {
    let paths = default_search_paths();
    assert_eq!(paths.first(), Some(&PathBuf::from(".")));
    assert_eq!(paths.last(), Some(&PathBuf::from("/etc")));
    assert!(supported_extensions().starts_with(&["toml", "json"]));
}
