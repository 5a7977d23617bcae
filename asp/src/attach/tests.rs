//! Unit tests for attaching schemas and resolving them.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Result, anyhow, ensure};
use asp_test_helpers::env;
use clap::{Arg, Command};
use rstest::{fixture, rstest};
use serial_test::serial;

use super::*;
use crate::{CoercionError, Schema};

#[derive(Schema, Debug, Default, PartialEq)]
#[asp(crate = "crate")]
struct Limits {
    #[asp(short = "r")]
    retries: u64,
    timeout: Duration,
}

#[derive(Schema, Debug, Default, PartialEq)]
#[asp(crate = "crate")]
struct Settings {
    name: String,
    verbose: bool,
    tags: Vec<String>,
    labels: BTreeMap<String, String>,
    #[asp(long = "")]
    secret_key: String,
    limits: Limits,
}

#[fixture]
fn defaults() -> Settings {
    Settings {
        name: "default".into(),
        limits: Limits {
            retries: 3,
            timeout: Duration::from_secs(5),
        },
        ..Settings::default()
    }
}

fn clean_env() -> env::EnvScope {
    env::scope_with(|lock| {
        [
            "ASPT_NAME",
            "ASPT_VERBOSE",
            "ASPT_TAGS",
            "ASPT_LABELS",
            "ASPT_SECRET_KEY",
            "ASPT_LIMITS_RETRIES",
            "ASPT_LIMITS_TIMEOUT",
        ]
        .into_iter()
        .map(|key| lock.remove_var(key))
        .collect()
    })
}

fn attach(defaults: &Settings) -> Result<(Command, Asp<Settings>)> {
    let mut command = Command::new("demo");
    let asp = Asp::<Settings>::builder()
        .env_prefix("ASPT")
        .search_paths(Vec::<PathBuf>::new())
        .attach(&mut command, defaults)?;
    Ok((command, asp))
}

#[rstest]
#[serial]
fn resolves_defaults_without_input(defaults: Settings) -> Result<()> {
    let _env = clean_env();
    let (command, asp) = attach(&defaults)?;
    let matches = command.try_get_matches_from(["demo"])?;
    ensure!(asp.config(&matches)? == defaults);
    Ok(())
}

#[rstest]
#[serial]
fn flags_override_defaults(defaults: Settings) -> Result<()> {
    let _env = clean_env();
    let (command, asp) = attach(&defaults)?;
    let matches = command.try_get_matches_from([
        "demo",
        "--name",
        "flag",
        "--verbose",
        "--tags",
        "a,b",
        "--tags",
        "c",
        "--labels",
        "[x=1,y=2]",
        "-r",
        "7",
        "--limits-timeout",
        "1m30s",
    ])?;
    let config = asp.config(&matches)?;
    ensure!(config.name == "flag");
    ensure!(config.verbose);
    ensure!(config.tags == ["a", "b", "c"]);
    ensure!(config.labels.get("y").map(String::as_str) == Some("2"));
    ensure!(config.limits.retries == 7);
    ensure!(config.limits.timeout == Duration::from_secs(90));
    Ok(())
}

#[rstest]
#[serial]
fn very_long_default_durations_resolve(mut defaults: Settings) -> Result<()> {
    let _env = clean_env();
    defaults.limits.timeout = Duration::MAX;
    let (command, asp) = attach(&defaults)?;
    let matches = command.try_get_matches_from(["demo"])?;
    ensure!(asp.config(&matches)?.limits.timeout == Duration::MAX);
    Ok(())
}

#[cfg(unix)]
#[rstest]
#[serial]
fn non_unicode_flag_values_are_rejected(defaults: Settings) -> Result<()> {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let _env = clean_env();
    let (command, _asp) = attach(&defaults)?;
    let err = command
        .try_get_matches_from([
            OsString::from("demo"),
            OsString::from("--name"),
            OsString::from_vec(vec![b'f', 0xff]),
        ])
        .err();
    ensure!(
        err.as_ref().map(clap::Error::kind) == Some(clap::error::ErrorKind::InvalidUtf8),
        "{err:?}"
    );
    Ok(())
}

#[rstest]
#[serial]
fn repeated_bracketed_flags_concatenate(defaults: Settings) -> Result<()> {
    let _env = clean_env();
    let (command, asp) = attach(&defaults)?;
    let matches = command.try_get_matches_from([
        "demo",
        "--tags",
        "[a,b]",
        "--tags",
        "[c]",
        "--tags",
        "[]",
        "--labels",
        "[x=1]",
        "--labels",
        "y=2",
    ])?;
    let config = asp.config(&matches)?;
    ensure!(config.tags == ["a", "b", "c"], "{:?}", config.tags);
    ensure!(
        config.labels
            == BTreeMap::from([
                ("x".to_owned(), "1".to_owned()),
                ("y".to_owned(), "2".to_owned()),
            ]),
        "{:?}",
        config.labels
    );
    Ok(())
}

#[rstest]
#[serial]
fn environment_sits_between_flags_and_defaults(defaults: Settings) -> Result<()> {
    let _env = clean_env();
    let _name = env::set_var("ASPT_NAME", "env");
    let _retries = env::set_var("ASPT_LIMITS_RETRIES", "9");
    let _secret = env::set_var("ASPT_SECRET_KEY", "hunter2");
    let (command, asp) = attach(&defaults)?;
    let matches = command.try_get_matches_from(["demo", "--limits-retries", "1"])?;
    let config = asp.config(&matches)?;
    ensure!(config.name == "env");
    ensure!(config.limits.retries == 1);
    ensure!(config.secret_key == "hunter2");
    Ok(())
}

#[rstest]
#[serial]
fn bool_flags_take_optional_values(defaults: Settings) -> Result<()> {
    let _env = clean_env();
    let _verbose = env::set_var("ASPT_VERBOSE", "true");
    let (command, asp) = attach(&defaults)?;
    let matches = command.try_get_matches_from(["demo", "--verbose=false"])?;
    ensure!(!asp.config(&matches)?.verbose);
    Ok(())
}

#[rstest]
#[serial]
fn bad_environment_values_name_the_key(defaults: Settings) -> Result<()> {
    let _env = clean_env();
    let _labels = env::set_var("ASPT_LABELS", "novalue");
    let (command, asp) = attach(&defaults)?;
    let matches = command.try_get_matches_from(["demo"])?;
    let err = asp.config(&matches).err();
    ensure!(
        matches!(
            &err,
            Some(AspError::Coercion { key, source: CoercionError::MalformedMapEntry { .. } }) if key == "labels"
        ),
        "{err:?}"
    );
    Ok(())
}

#[rstest]
fn malformed_flags_are_rejected_by_clap(defaults: Settings) -> Result<()> {
    let (command, _asp) = attach(&defaults)?;
    ensure!(
        command
            .try_get_matches_from(["demo", "--limits-timeout", "soon"])
            .is_err()
    );
    Ok(())
}

#[rstest]
#[serial]
fn global_flags_reach_subcommands(defaults: Settings) -> Result<()> {
    let _env = clean_env();
    let mut command = Command::new("demo").subcommand(Command::new("run"));
    let asp = Asp::<Settings>::builder()
        .env_prefix("ASPT")
        .attach(&mut command, &defaults)?;
    let matches = command.try_get_matches_from(["demo", "run", "--name", "child"])?;
    let (_, run) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("no subcommand"))?;
    ensure!(asp.config(run)?.name == "child");
    Ok(())
}

#[rstest]
fn registers_help_and_names(defaults: Settings) -> Result<()> {
    let (command, asp) = attach(&defaults)?;
    let name = command
        .get_arguments()
        .find(|arg| arg.get_id() == "name")
        .ok_or_else(|| anyhow!("no name flag"))?;
    ensure!(name.get_help().map(ToString::to_string).as_deref() == Some("sets the name value (env: ASPT_NAME)"));
    ensure!(
        command
            .get_arguments()
            .any(|arg| arg.get_long() == Some("config"))
    );
    ensure!(!command.get_arguments().any(|arg| arg.get_id() == "secret_key"));
    ensure!(asp.store().bindings().len() == 7);
    ensure!(asp.store().binding("secret_key").is_some_and(|b| !b.has_flag()));
    Ok(())
}

#[rstest]
fn existing_arguments_are_reserved(defaults: Settings) {
    let mut command = Command::new("demo").arg(Arg::new("name").long("name"));
    let err = Asp::attach(&mut command, &defaults).err();
    assert!(
        matches!(&err, Some(AspError::DuplicateFlag { flag, .. }) if flag == "--name"),
        "{err:?}"
    );
}

#[rstest]
fn failed_attach_leaves_the_command_untouched(defaults: Settings) -> Result<()> {
    let mut command = Command::new("demo")
        .arg(Arg::new("name").long("name"))
        .subcommand(Command::new("run"));
    ensure!(Asp::attach(&mut command, &defaults).is_err());
    let ids: Vec<_> = command.get_arguments().map(|arg| arg.get_id().to_string()).collect();
    ensure!(ids == ["name"], "{ids:?}");
    ensure!(command.find_subcommand("run").is_some());
    let matches = command.try_get_matches_from(["demo", "--name", "kept"])?;
    ensure!(matches.get_one::<String>("name").map(String::as_str) == Some("kept"));
    Ok(())
}

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct ConfigClash {
    config: String,
}

#[test]
fn config_flag_can_be_disabled() -> Result<()> {
    let err = Asp::attach(&mut Command::new("demo"), &ConfigClash::default()).err();
    ensure!(matches!(err, Some(AspError::DuplicateFlag { .. })), "{err:?}");
    let mut command = Command::new("demo");
    let _asp = Asp::<ConfigClash>::builder()
        .with_config_flag(false)
        .attach(&mut command, &ConfigClash::default())?;
    let config = command
        .get_arguments()
        .find(|arg| arg.get_long() == Some("config"))
        .ok_or_else(|| anyhow!("no config flag"))?;
    ensure!(config.get_id() == "config");
    Ok(())
}

#[rstest]
#[serial]
fn attached_config_checks_the_type(defaults: Settings) -> Result<()> {
    let _env = clean_env();
    let (command, asp) = attach(&defaults)?;
    let attached = AttachedConfig::from(asp);
    ensure!(attached.schema_name().ends_with("Settings"));
    let matches = command.try_get_matches_from(["demo", "--name", "typed"])?;
    ensure!(attached.config::<Settings>(&matches)?.name == "typed");
    ensure!(matches!(
        attached.config::<ConfigClash>(&matches),
        Err(AspError::ConfigTypeMismatch)
    ));
    Ok(())
}
