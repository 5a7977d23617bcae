//! clap argument construction for bound leaves.

use std::path::PathBuf;
use std::sync::Arc;

use clap::builder::ValueParser;
use clap::{Arg, ArgAction, value_parser};

use super::LeafBinding;
use crate::CoercionError;
use crate::decode::DecodeHooks;
use crate::leaf::LeafKind;

/// Argument id of the `--config` flag. Not a valid canonical key.
pub(crate) const CONFIG_ARG_ID: &str = "asp-config-file";

/// The global `--config <FILE>` flag.
pub(crate) fn config_arg() -> Arg {
    Arg::new(CONFIG_ARG_ID)
        .long("config")
        .value_name("FILE")
        .help("configuration file to load")
        .value_parser(value_parser!(PathBuf))
        .action(ArgAction::Set)
        .global(true)
}

/// The flag for a leaf, or `None` when it has neither a long nor a short
/// name.
pub(crate) fn leaf_arg(binding: &LeafBinding, hooks: &Arc<DecodeHooks>) -> Option<Arg> {
    if !binding.has_flag() {
        return None;
    }
    let mut arg = Arg::new(binding.key.clone())
        .help(binding.help.clone())
        .value_name(binding.kind.type_tag())
        .value_parser(validator(binding.kind, Arc::clone(hooks)))
        .global(true);
    if let Some(long) = &binding.long {
        arg = arg.long(long.clone());
    }
    if let Some(short) = binding.short {
        arg = arg.short(short);
    }
    arg = match binding.kind {
        LeafKind::Bool => arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .action(ArgAction::Set),
        kind if kind.is_aggregate() => arg.action(ArgAction::Append),
        _ => arg.action(ArgAction::Set),
    };
    if !binding.default.is_empty() {
        arg = arg
            .default_value(binding.default.render())
            .hide_default_value(binding.sensitive);
    }
    Some(arg)
}

/// Rejects text the decode hooks would reject when the value is resolved.
fn validator(kind: LeafKind, hooks: Arc<DecodeHooks>) -> ValueParser {
    ValueParser::new(move |raw: &str| -> Result<String, CoercionError> {
        hooks.decode_str(raw, kind)?;
        Ok(raw.to_owned())
    })
}
