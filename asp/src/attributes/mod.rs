//! Resolution of a field's externally visible names.
//!
//! Each attribute is resolved independently: an attribute-specific tag wins
//! (an empty value clears the attribute), then the matching component of the
//! combined tag (an empty component falls through), then the default computed
//! from the field name.

mod template;

use heck::ToKebabCase;
use tracing::warn;

use crate::decode::parse_bool;
use crate::schema::FieldMeta;

pub use template::{DEFAULT_DESC, Placeholders, render_description};


const LONG: usize = 0;
const SHORT: usize = 1;
const ENV: usize = 2;
const DESC: usize = 3;
const SENSITIVE: usize = 4;
const COMPONENTS: usize = 5;

/// Resolved identity of a field or naming context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attrs {
    /// Dotted canonical name.
    pub name: String,
    /// Long flag name.
    pub long: String,
    /// Short flag name, possibly empty.
    pub short: String,
    /// Environment variable name, possibly empty.
    pub env: String,
    /// Description template.
    pub desc: String,
    /// Whether values are redacted when serialised.
    pub sensitive: bool,
}

impl Attrs {
    /// The root context: only the environment prefix is set.
    #[must_use]
    pub fn root(env_prefix: &str) -> Self {
        Self {
            env: env_prefix.to_owned(),
            ..Self::default()
        }
    }

    /// Resolves the attributes of `field` on its own, without a parent.
    ///
    /// ```
    /// use asp::{Attrs, FieldMeta};
    ///
    /// let attrs = Attrs::resolve(&FieldMeta::new("max_retries", "u64"));
    /// assert_eq!(attrs.long, "max-retries");
    /// assert_eq!(attrs.env, "MAX_RETRIES");
    /// assert!(attrs.short.is_empty());
    /// ```
    #[must_use]
    pub fn resolve(field: &FieldMeta) -> Self {
        let tags = &field.tags;
        let name = field.name.strip_prefix("r#").unwrap_or(field.name);
        let combined: Vec<&str> = tags
            .combined
            .map(|tag| tag.splitn(COMPONENTS, ',').map(str::trim).collect())
            .unwrap_or_default();
        let pick = |specific: Option<&str>, index: usize, fallback: String| -> String {
            if let Some(value) = specific {
                return value.to_owned();
            }
            match combined.get(index) {
                Some(component) if !component.is_empty() => (*component).to_owned(),
                _ => fallback,
            }
        };

        let sensitive = pick(tags.sensitive, SENSITIVE, String::new());
        Self {
            name: name.to_owned(),
            long: pick(tags.long, LONG, name.to_kebab_case()),
            short: pick(tags.short, SHORT, String::new()),
            env: pick(tags.env, ENV, name.to_uppercase()),
            desc: pick(tags.desc, DESC, DEFAULT_DESC.to_owned()),
            sensitive: sensitive_flag(name, &sensitive),
        }
    }

    /// Combines a parent context with a child's own attributes.
    ///
    /// `name`, `long` and `env` are joined with `.`, `-` and `_`. `short` and
    /// `desc` come from the child alone. `sensitive` is inherited.
    #[must_use]
    pub fn join(&self, child: &Self) -> Self {
        Self {
            name: join_field(&self.name, &child.name, "."),
            long: join_field(&self.long, &child.long, "-"),
            short: child.short.clone(),
            env: join_field(&self.env, &child.env, "_"),
            desc: child.desc.clone(),
            sensitive: self.sensitive || child.sensitive,
        }
    }
}

/// Joins two name segments, passing either through when the other is empty.
#[must_use]
pub fn join_field(prefix: &str, suffix: &str, separator: &str) -> String {
    match (prefix.is_empty(), suffix.is_empty()) {
        (true, _) => suffix.to_owned(),
        (_, true) => prefix.to_owned(),
        _ => format!("{prefix}{separator}{suffix}"),
    }
}

fn sensitive_flag(field: &str, raw: &str) -> bool {
    if raw.is_empty() {
        return false;
    }
    parse_bool(raw).unwrap_or_else(|_| {
        warn!(field, value = raw, "ignoring unparsable sensitive tag");
        false
    })
}

/// A stack of naming contexts followed while walking a schema.
#[derive(Clone, Debug)]
pub struct Scope {
    stack: Vec<Attrs>,
}

impl Scope {
    /// Starts a walk at `root`.
    #[must_use]
    pub fn new(root: Attrs) -> Self {
        Self { stack: vec![root] }
    }

    /// The innermost context.
    #[must_use]
    pub fn current(&self) -> &Attrs {
        static EMPTY: Attrs = Attrs {
            name: String::new(),
            long: String::new(),
            short: String::new(),
            env: String::new(),
            desc: String::new(),
            sensitive: false,
        };
        self.stack.last().unwrap_or(&EMPTY)
    }

    /// Full attributes of a leaf in the current context.
    #[must_use]
    pub fn leaf(&self, field: &FieldMeta) -> Attrs {
        self.current().join(&Attrs::resolve(field))
    }

    /// Enters a nested schema field. Embedded fields keep the current context.
    pub fn descend(&mut self, field: &FieldMeta) {
        let next = if field.embedded {
            self.current().clone()
        } else {
            self.leaf(field)
        };
        self.stack.push(next);
    }

    /// Leaves the context entered by the matching [`Scope::descend`].
    pub fn ascend(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }
}
