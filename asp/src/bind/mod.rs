//! Walks a schema once at attach time and derives one binding per leaf.
//!
//! A binding ties a leaf's canonical key to its default value, its clap flag
//! and its environment variable. Bindings are collected before anything is
//! registered, so a failing walk leaves the command untouched.

mod flags;

use std::collections::HashSet;

use clap::Command;
use tracing::debug;

use crate::attributes::{Attrs, Placeholders, Scope, render_description};
use crate::error::{AspError, AspResult};
use crate::leaf::{LeafKind, LeafValue};
use crate::schema::{FieldMeta, Schema, SchemaVisitor};

pub(crate) use flags::{CONFIG_ARG_ID, config_arg, leaf_arg};

#[cfg(test)]
mod tests;

/// Everything registered for one leaf field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafBinding {
    /// Dotted canonical key, also used as the clap argument id.
    pub key: String,
    /// Leaf kind.
    pub kind: LeafKind,
    /// Long flag name, if any.
    pub long: Option<String>,
    /// Short flag name, if any.
    pub short: Option<char>,
    /// Environment variable read for this key, if any.
    pub env: Option<String>,
    /// Rendered help text.
    pub help: String,
    /// Value taken from the defaults instance.
    pub default: LeafValue,
    /// Whether the value is redacted when serialised.
    pub sensitive: bool,
}

impl LeafBinding {
    /// Whether a command-line flag exists for this leaf.
    #[must_use]
    pub const fn has_flag(&self) -> bool {
        self.long.is_some() || self.short.is_some()
    }
}

/// Flag names that leaves may not use.
#[derive(Clone, Debug, Default)]
pub(crate) struct Reserved {
    longs: HashSet<String>,
    shorts: HashSet<char>,
}

impl Reserved {
    /// Names already used by `command`, its automatic help and version flags
    /// and, when enabled, the `--config` flag.
    pub(crate) fn for_command(command: &Command, config_flag: bool) -> Self {
        let mut reserved = Self::default();
        reserved.longs.insert("help".to_owned());
        reserved.shorts.insert('h');
        if command.get_version().is_some() || command.get_long_version().is_some() {
            reserved.longs.insert("version".to_owned());
            reserved.shorts.insert('V');
        }
        if config_flag {
            reserved.longs.insert("config".to_owned());
        }
        for arg in command.get_arguments() {
            if let Some(long) = arg.get_long() {
                reserved.longs.insert(long.to_owned());
            }
            if let Some(short) = arg.get_short() {
                reserved.shorts.insert(short);
            }
        }
        reserved
    }

    fn claim(&mut self, attrs: &Attrs, short: Option<char>) -> AspResult<()> {
        let duplicate = |flag: String| AspError::DuplicateFlag {
            field: attrs.name.clone(),
            flag,
        };
        if !attrs.long.is_empty() && !self.longs.insert(attrs.long.clone()) {
            return Err(duplicate(format!("--{}", attrs.long)));
        }
        if let Some(c) = short
            && !self.shorts.insert(c)
        {
            return Err(duplicate(format!("-{c}")));
        }
        Ok(())
    }
}

/// Walks `defaults` and returns the bindings for every leaf.
///
/// # Errors
///
/// Fails on the first unsupported field, invalid or clashing flag name,
/// repeated canonical key or broken description template.
pub(crate) fn bind_schema(
    defaults: &dyn Schema,
    root: Attrs,
    reserved: Reserved,
) -> AspResult<Vec<LeafBinding>> {
    let mut binder = Binder {
        scope: Scope::new(root),
        reserved,
        keys: HashSet::new(),
        bindings: Vec::new(),
    };
    defaults.visit(&mut binder)?;
    Ok(binder.bindings)
}

struct Binder {
    scope: Scope,
    reserved: Reserved,
    keys: HashSet<String>,
    bindings: Vec<LeafBinding>,
}

impl Binder {
    fn short(attrs: &Attrs) -> AspResult<Option<char>> {
        let mut chars = attrs.short.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(None),
            (Some(c), None) if c != '-' && !c.is_whitespace() => Ok(Some(c)),
            _ => Err(AspError::InvalidShortFlag {
                field: attrs.name.clone(),
                short: attrs.short.clone(),
            }),
        }
    }
}

impl SchemaVisitor for Binder {
    fn leaf(&mut self, field: &FieldMeta, value: LeafValue) -> AspResult<()> {
        let attrs = self.scope.leaf(field);
        let vars = Placeholders {
            name: &attrs.name,
            long: &attrs.long,
            short: &attrs.short,
            env: &attrs.env,
            parent_name: &self.scope.current().name,
        };
        let help =
            render_description(&attrs.desc, &vars).map_err(|message| AspError::DescriptionTemplate {
                field: attrs.name.clone(),
                message,
            })?;
        let short = Self::short(&attrs)?;
        if !self.keys.insert(attrs.name.clone()) {
            return Err(AspError::DuplicateKey { key: attrs.name });
        }
        self.reserved.claim(&attrs, short)?;

        debug!(key = %attrs.name, long = %attrs.long, env = %attrs.env, kind = value.kind().type_tag(), "binding leaf");
        let non_empty = |s: String| (!s.is_empty()).then_some(s);
        self.bindings.push(LeafBinding {
            kind: value.kind(),
            long: non_empty(attrs.long),
            short,
            env: non_empty(attrs.env),
            help,
            default: value,
            sensitive: attrs.sensitive,
            key: attrs.name,
        });
        Ok(())
    }

    fn nested(&mut self, field: &FieldMeta, schema: &dyn Schema) -> AspResult<()> {
        self.scope.descend(field);
        let visited = schema.visit(self);
        self.scope.ascend();
        visited
    }

    fn unsupported(&mut self, field: &FieldMeta) -> AspResult<()> {
        Err(AspError::UnsupportedFieldType {
            field: self.scope.leaf(field).name,
            type_name: field.type_name,
        })
    }
}
