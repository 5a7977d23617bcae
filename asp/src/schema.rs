//! The schema description traits implemented by `#[derive(Schema)]`.
//!
//! A schema is walked in two directions. [`Schema::visit`] hands each field of
//! a populated instance to a [`SchemaVisitor`] (binding and serialisation), and
//! [`Schema::assemble`] pulls each leaf back out of a [`LeafSource`] to build a
//! fresh instance (resolution).

use crate::error::{AspError, AspResult};
use crate::leaf::{Leaf, LeafKind, LeafValue};

/// Raw `#[asp(...)]` tag values attached to a field.
///
/// `None` means the tag is absent. `Some("")` on an attribute-specific tag is
/// an explicit clear, while an empty component of `combined` falls back to
/// the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldTags {
    /// Combined `long,short,env,desc,sensitive` tag.
    pub combined: Option<&'static str>,
    /// Attribute-specific long flag name.
    pub long: Option<&'static str>,
    /// Attribute-specific short flag name.
    pub short: Option<&'static str>,
    /// Attribute-specific environment variable name.
    pub env: Option<&'static str>,
    /// Attribute-specific description template.
    pub desc: Option<&'static str>,
    /// Attribute-specific sensitivity marker.
    pub sensitive: Option<&'static str>,
}

impl FieldTags {
    /// Tags with nothing set.
    pub const NONE: Self = Self {
        combined: None,
        long: None,
        short: None,
        env: None,
        desc: None,
        sensitive: None,
    };
}

/// Static description of one schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldMeta {
    /// Rust field name.
    pub name: &'static str,
    /// Source text of the field's type.
    pub type_name: &'static str,
    /// Whether the field is an anonymous embed flattened into its parent.
    pub embedded: bool,
    /// Tag values from the field's attributes.
    pub tags: FieldTags,
}

impl FieldMeta {
    /// A field with no tags.
    #[must_use]
    pub const fn new(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            embedded: false,
            tags: FieldTags::NONE,
        }
    }
}

/// A nested data structure whose fields describe configuration options.
///
/// Usually derived:
///
/// ```
/// use asp::Schema;
///
/// #[derive(Schema, Default)]
/// struct Config {
///     #[asp(short = "p")]
///     port: u64,
///     #[asp(sensitive)]
///     token: String,
/// }
/// ```
pub trait Schema {
    /// Hands every field of `self` to `visitor` in declaration order.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the visitor.
    fn visit(&self, visitor: &mut dyn SchemaVisitor) -> AspResult<()>;

    /// Builds a fresh instance by pulling every leaf from `source`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the source.
    fn assemble(source: &mut dyn LeafSource) -> AspResult<Self>
    where
        Self: Sized;
}

/// Receives the fields of a schema during [`Schema::visit`].
pub trait SchemaVisitor {
    /// A field of a supported leaf type along with its current value.
    ///
    /// # Errors
    ///
    /// Implementation defined; aborts the walk.
    fn leaf(&mut self, field: &FieldMeta, value: LeafValue) -> AspResult<()>;

    /// A field holding a nested schema. Implementations recurse by calling
    /// `schema.visit(self)` after adjusting their naming context.
    ///
    /// # Errors
    ///
    /// Implementation defined; aborts the walk.
    fn nested(&mut self, field: &FieldMeta, schema: &dyn Schema) -> AspResult<()>;

    /// A field whose type cannot be bound.
    ///
    /// # Errors
    ///
    /// Implementations normally return [`AspError::UnsupportedFieldType`].
    fn unsupported(&mut self, field: &FieldMeta) -> AspResult<()>;
}

/// Supplies resolved leaf values during [`Schema::assemble`].
pub trait LeafSource {
    /// Produces the value for a leaf field of the given kind.
    ///
    /// # Errors
    ///
    /// Fails when no value exists or it cannot be decoded.
    fn leaf(&mut self, field: &FieldMeta, kind: LeafKind) -> AspResult<LeafValue>;

    /// Enters the naming context of a nested schema field.
    fn enter(&mut self, field: &FieldMeta);

    /// Leaves the context entered by the matching [`LeafSource::enter`].
    fn leave(&mut self);

    /// Builds the error reported for a field that cannot be bound.
    fn unsupported(&mut self, field: &FieldMeta) -> AspError;
}

/// Pulls a typed leaf out of `source`. Used by derived [`Schema::assemble`].
///
/// # Errors
///
/// Returns the source's error, or [`AspError::Coercion`] when the produced
/// value does not have the kind `T` expects.
pub fn assemble_leaf<T: Leaf>(source: &mut dyn LeafSource, field: &FieldMeta) -> AspResult<T> {
    let value = source.leaf(field, T::KIND)?;
    let found = value.kind().type_tag();
    T::from_leaf(value).ok_or_else(|| {
        AspError::coercion(
            field.name,
            crate::CoercionError::TypeMismatch {
                expected: T::KIND.type_tag(),
                found,
            },
        )
    })
}

/// Assembles a nested schema inside its naming context. Used by derived
/// [`Schema::assemble`].
///
/// # Errors
///
/// Propagates the nested schema's assembly error.
pub fn assemble_nested<T: Schema>(source: &mut dyn LeafSource, field: &FieldMeta) -> AspResult<T> {
    source.enter(field);
    let assembled = T::assemble(source);
    source.leave();
    assembled
}
