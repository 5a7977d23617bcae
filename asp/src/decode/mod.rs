//! String-to-typed-value coercion used when resolving leaves.
//!
//! Values arriving as text (flags, environment variables, string entries in
//! configuration files) are offered to an ordered list of [`DecodeHook`]s;
//! the first hook that claims the target kind produces the value. Anything
//! else is decoded structurally from the layered store's value model.

mod rules;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use figment::value::Value;

use crate::CoercionError;
use crate::leaf::{Leaf, LeafKind, LeafValue};
use crate::time::parse_time;

pub use rules::{
    StringToBytes, StringToDuration, StringToIntMap, StringToList, StringToScalar,
    StringToStrMap, StringToTime, list_entries, parse_bool, parse_int, parse_uint,
};
pub(crate) use rules::unbracketed;


/// Field name under which the TOML parser exposes native datetimes.
const TOML_DATETIME: &str = "$__toml_private_datetime";

/// A coercion rule from raw text to a typed leaf value.
///
/// Returning `Ok(None)` passes the input on untouched; hooks must do so for
/// every kind they do not claim.
pub trait DecodeHook: Send + Sync {
    /// Converts `raw` into a value of kind `target`, if this hook claims it.
    ///
    /// # Errors
    ///
    /// Returns a [`CoercionError`] when the hook claims the kind but the text
    /// is malformed.
    fn decode(&self, raw: &str, target: LeafKind) -> Result<Option<LeafValue>, CoercionError>;
}

impl<F> DecodeHook for F
where
    F: Fn(&str, LeafKind) -> Result<Option<LeafValue>, CoercionError> + Send + Sync,
{
    fn decode(&self, raw: &str, target: LeafKind) -> Result<Option<LeafValue>, CoercionError> {
        self(raw, target)
    }
}

/// An ordered list of decode hooks.
///
/// ```
/// use asp::{DecodeHooks, LeafKind, LeafValue};
///
/// let hooks = DecodeHooks::standard();
/// assert_eq!(
///     hooks.decode_str("[a,b]", LeafKind::Strings),
///     Ok(Some(LeafValue::Strings(vec!["a".into(), "b".into()]))),
/// );
/// assert_eq!(hooks.decode_str("plain", LeafKind::Str), Ok(None));
/// ```
#[derive(Clone)]
pub struct DecodeHooks {
    hooks: Vec<Arc<dyn DecodeHook>>,
}

impl DecodeHooks {
    /// A list with no hooks. Only structural decoding applies.
    #[must_use]
    pub fn empty() -> Self {
        Self { hooks: Vec::new() }
    }

    /// The standard composition: duration, time, bytes, string-to-int map,
    /// string-to-string map, comma separated lists, then scalars.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with(StringToDuration)
            .with(StringToTime)
            .with(StringToBytes)
            .with(StringToIntMap::default())
            .with(StringToStrMap::default())
            .with(StringToList::default())
            .with(StringToScalar)
    }

    /// Appends `hook`, giving it lower priority than the hooks already held.
    #[must_use]
    pub fn with(mut self, hook: impl DecodeHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Inserts `hook` ahead of every hook already held.
    #[must_use]
    pub fn with_first(mut self, hook: impl DecodeHook + 'static) -> Self {
        self.hooks.insert(0, Arc::new(hook));
        self
    }

    /// Number of hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Offers `raw` to each hook in order.
    ///
    /// # Errors
    ///
    /// Returns the error of the first hook that claims `target` and fails.
    pub fn decode_str(
        &self,
        raw: &str,
        target: LeafKind,
    ) -> Result<Option<LeafValue>, CoercionError> {
        for hook in &self.hooks {
            if let Some(value) = hook.decode(raw, target)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Converts a store value into a leaf of kind `target`.
    ///
    /// # Errors
    ///
    /// Returns a [`CoercionError`] when a hook rejects the text or the value
    /// has the wrong shape.
    pub fn convert(&self, value: &Value, target: LeafKind) -> Result<LeafValue, CoercionError> {
        if let Value::String(_, raw) = value
            && let Some(decoded) = self.decode_str(raw, target)?
        {
            return Ok(decoded);
        }
        self.structural(value, target)
    }

    fn structural(&self, value: &Value, target: LeafKind) -> Result<LeafValue, CoercionError> {
        let mismatch = || CoercionError::mismatch(target, describe(value));
        let decoded = match (target, value) {
            (LeafKind::Str, Value::String(_, s)) => LeafValue::Str(s.clone()),
            (LeafKind::Str, Value::Char(_, c)) => LeafValue::Str(c.to_string()),
            (LeafKind::Bool, Value::Bool(_, b)) => LeafValue::Bool(*b),
            (LeafKind::Time, Value::Dict(_, dict)) => match dict.get(TOML_DATETIME) {
                Some(Value::String(_, raw)) if dict.len() == 1 => LeafValue::Time(parse_time(raw)?),
                _ => return Err(mismatch()),
            },
            (LeafKind::Int, Value::Num(..)) => {
                LeafValue::Int(signed(value).and_then(|i| i64::try_from(i).ok()).ok_or_else(mismatch)?)
            }
            (LeafKind::Uint, Value::Num(..)) => {
                LeafValue::Uint(unsigned(value).and_then(|u| u64::try_from(u).ok()).ok_or_else(mismatch)?)
            }
            (LeafKind::Duration, Value::Num(..)) => LeafValue::Duration(Duration::from_nanos(
                unsigned(value).and_then(|u| u64::try_from(u).ok()).ok_or_else(mismatch)?,
            )),
            (LeafKind::Bytes, Value::Array(_, items)) => LeafValue::Bytes(
                items
                    .iter()
                    .map(|item| unsigned(item).and_then(|u| u8::try_from(u).ok()).ok_or_else(mismatch))
                    .collect::<Result<_, _>>()?,
            ),
            (LeafKind::Durations, Value::Array(_, items)) => {
                LeafValue::Durations(self.elements(items, LeafKind::Duration)?)
            }
            (LeafKind::Bools, Value::Array(_, items)) => {
                LeafValue::Bools(self.elements(items, LeafKind::Bool)?)
            }
            (LeafKind::Ints, Value::Array(_, items)) => {
                LeafValue::Ints(self.elements(items, LeafKind::Int)?)
            }
            (LeafKind::Uints, Value::Array(_, items)) => {
                LeafValue::Uints(self.elements(items, LeafKind::Uint)?)
            }
            (LeafKind::Strings, Value::Array(_, items)) => {
                LeafValue::Strings(self.elements(items, LeafKind::Str)?)
            }
            (LeafKind::IntMap, Value::Dict(_, dict)) => LeafValue::IntMap(
                dict.iter()
                    .map(|(k, v)| Ok((k.clone(), self.element::<i64>(v, LeafKind::Int)?)))
                    .collect::<Result<_, CoercionError>>()?,
            ),
            (LeafKind::StrMap, Value::Dict(_, dict)) => LeafValue::StrMap(
                dict.iter()
                    .map(|(k, v)| Ok((k.clone(), self.element::<String>(v, LeafKind::Str)?)))
                    .collect::<Result<_, CoercionError>>()?,
            ),
            _ => return Err(mismatch()),
        };
        Ok(decoded)
    }

    fn elements<T: Leaf>(&self, items: &[Value], kind: LeafKind) -> Result<Vec<T>, CoercionError> {
        items.iter().map(|item| self.element(item, kind)).collect()
    }

    fn element<T: Leaf>(&self, item: &Value, kind: LeafKind) -> Result<T, CoercionError> {
        let decoded = self.convert(item, kind)?;
        let found = decoded.kind().type_tag();
        T::from_leaf(decoded).ok_or(CoercionError::TypeMismatch {
            expected: kind.type_tag(),
            found,
        })
    }
}

impl Default for DecodeHooks {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for DecodeHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeHooks")
            .field("len", &self.hooks.len())
            .finish()
    }
}

fn signed(value: &Value) -> Option<i128> {
    value
        .to_i128()
        .or_else(|| value.to_u128().and_then(|u| i128::try_from(u).ok()))
}

fn unsigned(value: &Value) -> Option<u128> {
    value
        .to_u128()
        .or_else(|| value.to_i128().and_then(|i| u128::try_from(i).ok()))
}

const fn describe(value: &Value) -> &'static str {
    match value {
        Value::String(..) => "a string",
        Value::Char(..) => "a character",
        Value::Bool(..) => "a boolean",
        Value::Num(..) => "a number",
        Value::Empty(..) => "an empty value",
        Value::Dict(..) => "a table",
        Value::Array(..) => "an array",
    }
}
