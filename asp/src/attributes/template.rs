//! Placeholder substitution for description templates.

use heck::ToSnakeCase;

/// Description used when a field sets none.
pub const DEFAULT_DESC: &str = "sets the {Name|words} value";

/// Values available to a description template.
#[derive(Clone, Copy, Debug, Default)]
pub struct Placeholders<'a> {
    /// `{Name}`: dotted canonical name.
    pub name: &'a str,
    /// `{Long}`: long flag name.
    pub long: &'a str,
    /// `{Short}`: short flag name.
    pub short: &'a str,
    /// `{Env}`: environment variable name.
    pub env: &'a str,
    /// `{ParentName}`: canonical name of the enclosing context.
    pub parent_name: &'a str,
}

impl Placeholders<'_> {
    fn lookup(&self, key: &str) -> Option<&str> {
        match key {
            "Name" => Some(self.name),
            "Long" => Some(self.long),
            "Short" => Some(self.short),
            "Env" => Some(self.env),
            "ParentName" => Some(self.parent_name),
            _ => None,
        }
    }
}

/// Renders `template`, appending ` (env: <Env>)` when the template never
/// mentions `{Env}` and the variable name is not empty. An empty template
/// renders as an empty description.
///
/// `{{` and `}}` produce literal braces. `{Key|words}` renders the value as
/// lower-case words.
///
/// ```
/// use asp::{Placeholders, render_description};
///
/// let vars = Placeholders { name: "db.max_conns", env: "APP_DB_MAX_CONNS", ..Placeholders::default() };
/// assert_eq!(
///     render_description("sets the {Name|words} value", &vars).as_deref(),
///     Ok("sets the db max conns value (env: APP_DB_MAX_CONNS)"),
/// );
/// ```
///
/// # Errors
///
/// Returns a message for unknown placeholders or filters and unbalanced
/// braces.
pub fn render_description(template: &str, vars: &Placeholders<'_>) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut mentions_env = false;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.next_if_eq(&'{').is_some() => out.push('{'),
            '{' => {
                let mut inner = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    inner.push(next);
                }
                if !closed {
                    return Err(format!("unclosed placeholder '{{{inner}'"));
                }
                let (key, filter) = match inner.split_once('|') {
                    Some((key, filter)) => (key.trim(), Some(filter.trim())),
                    None => (inner.trim(), None),
                };
                let value = vars
                    .lookup(key)
                    .ok_or_else(|| format!("unknown placeholder '{{{key}}}'"))?;
                mentions_env |= key == "Env";
                match filter {
                    None => out.push_str(value),
                    Some("words") => out.push_str(&words(value)),
                    Some(other) => return Err(format!("unknown filter '{other}'")),
                }
            }
            '}' if chars.next_if_eq(&'}').is_some() => out.push('}'),
            '}' => return Err("unmatched '}'".to_owned()),
            _ => out.push(c),
        }
    }
    if !mentions_env && !vars.env.is_empty() && !template.is_empty() {
        out.push_str(" (env: ");
        out.push_str(vars.env);
        out.push(')');
    }
    Ok(out)
}

fn words(value: &str) -> String {
    value.replace('.', "_").to_snake_case().replace('_', " ")
}
