//! Rendering a populated schema back into command-line flags.

use crate::attributes::{Attrs, Scope};
use crate::error::{AspError, AspResult};
use crate::leaf::LeafValue;
use crate::schema::{FieldMeta, Schema, SchemaVisitor};

/// Replacement text for sensitive values.
pub const REDACTED: &str = "[REDACTED]";

/// Renders `value` as `--long "text"` tokens joined by single spaces.
///
/// With `omit_empty`, leaves holding their zero value (including `false`)
/// are skipped. Sensitive leaves with a non-empty rendering are written as
/// `[REDACTED]`. A leaf without a long name falls back to `-short`; a leaf
/// with neither name is skipped.
///
/// ```
/// use asp::{Schema, serialize_flags};
///
/// #[derive(Schema, Default)]
/// struct Config {
///     string: String,
///     int: i64,
/// }
///
/// let empty = Config::default();
/// assert_eq!(serialize_flags(&empty, true).unwrap(), "");
/// assert_eq!(serialize_flags(&empty, false).unwrap(), r#"--string "" --int """#);
/// ```
///
/// # Errors
///
/// Returns [`AspError::UnsupportedFieldType`] for a field that cannot be
/// bound. No partial output is produced.
pub fn serialize_flags<T: Schema + ?Sized>(value: &T, omit_empty: bool) -> AspResult<String> {
    let mut writer = FlagWriter {
        scope: Scope::new(Attrs::default()),
        omit_empty,
        tokens: Vec::new(),
    };
    value.visit(&mut writer)?;
    Ok(writer.tokens.join(" "))
}

struct FlagWriter {
    scope: Scope,
    omit_empty: bool,
    tokens: Vec<String>,
}

impl SchemaVisitor for FlagWriter {
    fn leaf(&mut self, field: &FieldMeta, value: LeafValue) -> AspResult<()> {
        if self.omit_empty && value.is_empty() {
            return Ok(());
        }
        let attrs = self.scope.leaf(field);
        let flag = if !attrs.long.is_empty() {
            format!("--{}", attrs.long)
        } else if !attrs.short.is_empty() {
            format!("-{}", attrs.short)
        } else {
            return Ok(());
        };
        let text = value.render();
        let token = if attrs.sensitive && !text.is_empty() {
            format!("{flag} {REDACTED}")
        } else {
            format!("{flag} {text:?}")
        };
        self.tokens.push(token);
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
