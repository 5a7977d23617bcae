//! Unit tests for the schema binder and flag construction.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow, ensure};
use clap::Command;
use rstest::rstest;

use super::*;
use crate::{DecodeHooks, Schema, TimeValue};

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct AllLeaves {
    time_val: TimeValue,
    duration_val: Duration,
    durations_val: Vec<Duration>,
    bool_val: bool,
    int_val: i64,
    uint_val: u64,
    string_val: String,
    bools_val: Vec<bool>,
    ints_val: Vec<i64>,
    uints_val: Vec<u64>,
    bytes_val: Vec<u8>,
    strings_val: Vec<String>,
    int_map_val: HashMap<String, i64>,
    str_map_val: BTreeMap<String, String>,
}

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct Common {
    verbose: bool,
}

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct Nested {
    dummy: String,
    #[asp(short = "d")]
    depth: u64,
}

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct Database {
    dummy: String,
    depth: u64,
}

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct Outer {
    #[asp(embed)]
    common: Common,
    nested: Nested,
    #[asp(long = "db", env = "DATABASE", sensitive)]
    database: Database,
    #[asp(skip)]
    ignored: Vec<f64>,
}

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct WithUnsupported {
    first: String,
    ratio: f32,
    last: String,
}

fn bind(schema: &dyn Schema) -> AspResult<Vec<LeafBinding>> {
    bind_schema(schema, Attrs::root("APP"), Reserved::default())
}

fn find<'a>(bindings: &'a [LeafBinding], key: &str) -> Result<&'a LeafBinding> {
    bindings
        .iter()
        .find(|b| b.key == key)
        .ok_or_else(|| anyhow!("no binding for {key}"))
}

#[test]
fn untagged_leaves_get_name_defaults() -> Result<()> {
    let bindings = bind(&AllLeaves::default())?;
    ensure!(bindings.len() == 14);
    for binding in &bindings {
        let long = binding.key.replace('_', "-");
        let env = format!("APP_{}", binding.key.to_uppercase());
        ensure!(binding.long.as_deref() == Some(long.as_str()), "{binding:?}");
        ensure!(binding.env.as_deref() == Some(env.as_str()), "{binding:?}");
        ensure!(binding.short.is_none());
        ensure!(binding.help.starts_with("sets the "), "{}", binding.help);
        ensure!(binding.help.ends_with(&format!("(env: {env})")));
    }
    ensure!(find(&bindings, "bytes_val")?.kind == LeafKind::Bytes);
    ensure!(find(&bindings, "int_map_val")?.kind == LeafKind::IntMap);
    ensure!(find(&bindings, "time_val")?.help == "sets the time val value (env: APP_TIME_VAL)");
    Ok(())
}

#[test]
fn nesting_prefixes_names_and_embedding_flattens() -> Result<()> {
    let bindings = bind(&Outer::default())?;
    let keys: Vec<_> = bindings.iter().map(|b| b.key.as_str()).collect();
    ensure!(
        keys == [
            "verbose",
            "nested.dummy",
            "nested.depth",
            "database.dummy",
            "database.depth"
        ],
        "{keys:?}"
    );

    let verbose = find(&bindings, "verbose")?;
    ensure!(verbose.long.as_deref() == Some("verbose"));
    ensure!(verbose.env.as_deref() == Some("APP_VERBOSE"));

    let dummy = find(&bindings, "nested.dummy")?;
    ensure!(dummy.long.as_deref() == Some("nested-dummy"));
    ensure!(dummy.env.as_deref() == Some("APP_NESTED_DUMMY"));
    ensure!(!dummy.sensitive);
    ensure!(find(&bindings, "nested.depth")?.short == Some('d'));

    let db = find(&bindings, "database.dummy")?;
    ensure!(db.long.as_deref() == Some("db-dummy"));
    ensure!(db.env.as_deref() == Some("APP_DATABASE_DUMMY"));
    ensure!(db.sensitive);
    Ok(())
}

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct Twice {
    first: Nested,
    second: Nested,
}

#[test]
fn short_names_are_not_prefixed_by_parents() {
    let err = bind(&Twice::default()).err();
    assert!(
        matches!(&err, Some(AspError::DuplicateFlag { field, flag }) if field == "second.depth" && flag == "-d"),
        "{err:?}"
    );
}

#[test]
fn defaults_come_from_the_instance() -> Result<()> {
    let defaults = Nested {
        dummy: "value".into(),
        depth: 3,
    };
    let bindings = bind(&defaults)?;
    ensure!(find(&bindings, "dummy")?.default == LeafValue::Str("value".into()));
    ensure!(find(&bindings, "depth")?.default == LeafValue::Uint(3));
    Ok(())
}

#[test]
fn unsupported_fields_abort_the_walk() {
    let err = bind(&WithUnsupported::default()).err();
    assert!(
        matches!(
            &err,
            Some(AspError::UnsupportedFieldType { field, type_name }) if field == "ratio" && *type_name == "f32"
        ),
        "{err:?}"
    );
}

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct Clashing {
    #[asp(long = "name")]
    first: String,
    #[asp(long = "name")]
    second: String,
}

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct ClashingShort {
    #[asp(short = "x")]
    first: String,
    #[asp(short = "x")]
    second: String,
}

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct LongShort {
    #[asp(short = "xy")]
    first: String,
}

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct HelpClash {
    help: bool,
}

#[derive(Schema, Default)]
#[asp(crate = "crate")]
struct BadTemplate {
    #[asp(desc = "uses {Missing}")]
    first: String,
}

#[rstest]
#[case::long(&Clashing::default(), "--name")]
#[case::short(&ClashingShort::default(), "-x")]
fn repeated_flags_are_rejected(#[case] schema: &dyn Schema, #[case] expected: &str) {
    let err = bind(schema).err();
    assert!(
        matches!(&err, Some(AspError::DuplicateFlag { field, flag }) if field == "second" && flag == expected),
        "{err:?}"
    );
}

#[test]
fn reserved_flags_are_rejected() {
    let reserved = Reserved::for_command(&Command::new("demo"), true);
    let err = bind_schema(&HelpClash::default(), Attrs::root("APP"), reserved).err();
    assert!(matches!(err, Some(AspError::DuplicateFlag { .. })), "{err:?}");
}

#[test]
fn reserved_names_include_existing_arguments() {
    let command = Command::new("demo")
        .version("1.0")
        .arg(clap::Arg::new("first").long("first").short('f'));
    let reserved = Reserved::for_command(&command, false);
    assert!(reserved.longs.contains("first"));
    assert!(reserved.longs.contains("version"));
    assert!(reserved.shorts.contains(&'f'));
    assert!(reserved.shorts.contains(&'V'));
    assert!(!reserved.longs.contains("config"));
}

#[test]
fn multi_character_shorts_are_rejected() {
    let err = bind(&LongShort::default()).err();
    assert!(
        matches!(&err, Some(AspError::InvalidShortFlag { short, .. }) if short == "xy"),
        "{err:?}"
    );
}

#[test]
fn broken_templates_name_the_field() {
    let err = bind(&BadTemplate::default()).err();
    assert!(
        matches!(&err, Some(AspError::DescriptionTemplate { field, .. }) if field == "first"),
        "{err:?}"
    );
}

#[test]
fn leaf_args_carry_names_and_type_tags() -> Result<()> {
    let hooks = Arc::new(DecodeHooks::standard());
    let bindings = bind(&Outer::default())?;
    let depth = leaf_arg(find(&bindings, "nested.depth")?, &hooks).ok_or_else(|| anyhow!("no arg"))?;
    ensure!(depth.get_id() == "nested.depth");
    ensure!(depth.get_long() == Some("nested-depth"));
    ensure!(depth.get_short() == Some('d'));
    ensure!(depth.is_global_set());
    let names: Vec<_> = depth
        .get_value_names()
        .map(|names| names.iter().map(ToString::to_string).collect())
        .unwrap_or_default();
    ensure!(names == ["uint"]);
    Ok(())
}

#[test]
fn leaves_without_names_get_no_flag() {
    let binding = LeafBinding {
        key: "quiet".into(),
        kind: LeafKind::Bool,
        long: None,
        short: None,
        env: Some("QUIET".into()),
        help: String::new(),
        default: LeafValue::Bool(false),
        sensitive: false,
    };
    assert!(leaf_arg(&binding, &Arc::new(DecodeHooks::standard())).is_none());
}

#[test]
fn flags_validate_with_the_decode_hooks() -> Result<()> {
    let hooks = Arc::new(DecodeHooks::standard());
    let bindings = bind(&AllLeaves::default())?;
    let command = Command::new("demo")
        .args(bindings.iter().filter_map(|b| leaf_arg(b, &hooks)))
        .no_binary_name(true);

    ensure!(command.clone().try_get_matches_from(["--uint-val", "12"]).is_ok());
    ensure!(command.clone().try_get_matches_from(["--uint-val", "-1"]).is_err());
    ensure!(command.clone().try_get_matches_from(["--bytes-val", "xyz"]).is_err());
    ensure!(command.clone().try_get_matches_from(["--int-map-val", "a"]).is_err());
    ensure!(command.clone().try_get_matches_from(["--duration-val", "5s"]).is_ok());

    let matches = command.try_get_matches_from(["--bool-val", "--strings-val", "a", "--strings-val", "b"])?;
    let raw: Vec<_> = matches
        .get_raw("strings_val")
        .map(|values| values.map(|v| v.to_string_lossy().into_owned()).collect())
        .unwrap_or_default();
    ensure!(raw == ["a", "b"]);
    let flag: Vec<_> = matches
        .get_raw("bool_val")
        .map(|values| values.map(|v| v.to_string_lossy().into_owned()).collect())
        .unwrap_or_default();
    ensure!(flag == ["true"]);
    Ok(())
}

#[test]
fn byte_flags_take_one_hex_value() -> Result<()> {
    let hooks = Arc::new(DecodeHooks::standard());
    let bindings = bind(&AllLeaves::default())?;
    let command = Command::new("demo")
        .args(bindings.iter().filter_map(|b| leaf_arg(b, &hooks)))
        .no_binary_name(true);

    let matches = command
        .clone()
        .try_get_matches_from(["--bytes-val", "deadbeef"])?;
    let raw: Vec<_> = matches
        .get_raw("bytes_val")
        .map(|values| values.map(|v| v.to_string_lossy().into_owned()).collect())
        .unwrap_or_default();
    ensure!(raw == ["deadbeef"]);
    ensure!(
        command
            .try_get_matches_from(["--bytes-val", "dead", "--bytes-val", "beef"])
            .is_err()
    );
    Ok(())
}
