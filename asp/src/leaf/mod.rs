//! The closed set of leaf types a schema field may hold.
//!
//! [`LeafKind`] is the dispatch tag, [`LeafValue`] carries one typed value per
//! kind and [`Leaf`] converts between a Rust field type and the carrier.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::time::Duration;

use figment::value::{Dict, Tag, Value};

use crate::duration::format_duration;
use crate::time::TimeValue;


/// Dispatch tag for the supported leaf types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum LeafKind {
    /// [`TimeValue`].
    Time,
    /// [`Duration`].
    Duration,
    /// `Vec<Duration>`.
    Durations,
    /// `bool`.
    Bool,
    /// `i64`.
    Int,
    /// `u64`.
    Uint,
    /// `String`.
    Str,
    /// `Vec<bool>`.
    Bools,
    /// `Vec<i64>`.
    Ints,
    /// `Vec<u64>`.
    Uints,
    /// `Vec<u8>`, written as hex.
    Bytes,
    /// `Vec<String>`.
    Strings,
    /// String keyed integer map.
    IntMap,
    /// String keyed string map.
    StrMap,
}

impl LeafKind {
    /// Short type name shown as the flag's value placeholder in help output.
    #[must_use]
    pub const fn type_tag(self) -> &'static str {
        match self {
            Self::Time => TimeValue::TYPE_TAG,
            Self::Duration => "duration",
            Self::Durations => "durationSlice",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Str => "string",
            Self::Bools => "boolSlice",
            Self::Ints => "intSlice",
            Self::Uints => "uintSlice",
            Self::Bytes => "bytesHex",
            Self::Strings => "stringSlice",
            Self::IntMap => "stringToInt",
            Self::StrMap => "stringToString",
        }
    }

    /// Element kind of a list kind.
    #[must_use]
    pub const fn element(self) -> Option<Self> {
        match self {
            Self::Durations => Some(Self::Duration),
            Self::Bools => Some(Self::Bool),
            Self::Ints => Some(Self::Int),
            Self::Uints => Some(Self::Uint),
            Self::Strings => Some(Self::Str),
            _ => None,
        }
    }

    /// Whether repeated flag occurrences accumulate. A byte sequence is a
    /// single hex value, so it does not.
    #[must_use]
    pub const fn is_aggregate(self) -> bool {
        matches!(self, Self::IntMap | Self::StrMap) || self.element().is_some()
    }
}

/// A typed leaf value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum LeafValue {
    /// A point in time, possibly unset.
    Time(TimeValue),
    /// A span of time.
    Duration(Duration),
    /// A list of spans.
    Durations(Vec<Duration>),
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    Uint(u64),
    /// A string.
    Str(String),
    /// A list of booleans.
    Bools(Vec<bool>),
    /// A list of signed integers.
    Ints(Vec<i64>),
    /// A list of unsigned integers.
    Uints(Vec<u64>),
    /// A byte sequence.
    Bytes(Vec<u8>),
    /// A list of strings.
    Strings(Vec<String>),
    /// A string keyed integer map.
    IntMap(BTreeMap<String, i64>),
    /// A string keyed string map.
    StrMap(BTreeMap<String, String>),
}

impl LeafValue {
    /// Kind tag of this value.
    #[must_use]
    pub const fn kind(&self) -> LeafKind {
        match self {
            Self::Time(_) => LeafKind::Time,
            Self::Duration(_) => LeafKind::Duration,
            Self::Durations(_) => LeafKind::Durations,
            Self::Bool(_) => LeafKind::Bool,
            Self::Int(_) => LeafKind::Int,
            Self::Uint(_) => LeafKind::Uint,
            Self::Str(_) => LeafKind::Str,
            Self::Bools(_) => LeafKind::Bools,
            Self::Ints(_) => LeafKind::Ints,
            Self::Uints(_) => LeafKind::Uints,
            Self::Bytes(_) => LeafKind::Bytes,
            Self::Strings(_) => LeafKind::Strings,
            Self::IntMap(_) => LeafKind::IntMap,
            Self::StrMap(_) => LeafKind::StrMap,
        }
    }

    /// Whether the value counts as empty when flags are serialised with
    /// `omit_empty`. `false` is empty, other values are empty when they
    /// render to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Bool(false)) || self.render().is_empty()
    }

    /// Renders the value in the grammar accepted by the standard decode hooks.
    ///
    /// Zero and empty values render as the empty string, except `false`.
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use asp::LeafValue;
    ///
    /// let map = BTreeMap::from([("b".to_owned(), 2), ("a".to_owned(), 1)]);
    /// assert_eq!(LeafValue::IntMap(map).render(), "a=1,b=2");
    /// assert_eq!(LeafValue::Bytes(vec![0xde, 0xad]).render(), "dead");
    /// assert_eq!(LeafValue::Int(0).render(), "");
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Time(t) => t.render(),
            Self::Duration(d) if d.is_zero() => String::new(),
            Self::Duration(d) => format_duration(*d),
            Self::Durations(ds) => join(ds.iter().map(|d| format_duration(*d))),
            Self::Bool(b) => b.to_string(),
            Self::Int(0) | Self::Uint(0) => String::new(),
            Self::Int(i) => i.to_string(),
            Self::Uint(u) => u.to_string(),
            Self::Str(s) => s.clone(),
            Self::Bools(bs) => join(bs.iter().map(ToString::to_string)),
            Self::Ints(is) => join(is.iter().map(ToString::to_string)),
            Self::Uints(us) => join(us.iter().map(ToString::to_string)),
            Self::Bytes(bytes) => hex::encode(bytes),
            Self::Strings(ss) => ss.join(","),
            Self::IntMap(map) => join(map.iter().map(|(k, v)| format!("{k}={v}"))),
            Self::StrMap(map) => join(map.iter().map(|(k, v)| format!("{k}={v}"))),
        }
    }

    /// Converts the value into the layered store's value model.
    ///
    /// Times, durations and byte sequences become strings so they flow back
    /// through the decode hooks when read.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Time(t) => Value::from(t.render()),
            Self::Duration(d) => Value::from(format_duration(*d)),
            Self::Durations(ds) => array(ds.iter().map(|d| Value::from(format_duration(*d)))),
            Self::Bool(b) => Value::from(*b),
            Self::Int(i) => Value::from(*i),
            Self::Uint(u) => Value::from(*u),
            Self::Str(s) => Value::from(s.clone()),
            Self::Bools(bs) => array(bs.iter().map(|b| Value::from(*b))),
            Self::Ints(is) => array(is.iter().map(|i| Value::from(*i))),
            Self::Uints(us) => array(us.iter().map(|u| Value::from(*u))),
            Self::Bytes(bytes) => Value::from(hex::encode(bytes)),
            Self::Strings(ss) => array(ss.iter().map(|s| Value::from(s.clone()))),
            Self::IntMap(map) => dict(map.iter().map(|(k, v)| (k.clone(), Value::from(*v)))),
            Self::StrMap(map) => {
                dict(map.iter().map(|(k, v)| (k.clone(), Value::from(v.clone()))))
            }
        }
    }
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(",")
}

fn array(items: impl Iterator<Item = Value>) -> Value {
    Value::Array(Tag::Default, items.collect())
}

fn dict(entries: impl Iterator<Item = (String, Value)>) -> Value {
    Value::Dict(Tag::Default, entries.collect::<Dict>())
}

/// A Rust type usable as a schema leaf.
pub trait Leaf: Sized {
    /// Dispatch tag for this type.
    const KIND: LeafKind;

    /// Copies the current value into the carrier.
    fn to_leaf(&self) -> LeafValue;

    /// Extracts a value of this type, or `None` when the kind differs.
    fn from_leaf(value: LeafValue) -> Option<Self>;
}

macro_rules! impl_leaf {
    ($ty:ty, $variant:ident) => {
        impl Leaf for $ty {
            const KIND: LeafKind = LeafKind::$variant;

            fn to_leaf(&self) -> LeafValue {
                LeafValue::$variant(self.clone())
            }

            fn from_leaf(value: LeafValue) -> Option<Self> {
                match value {
                    LeafValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_leaf!(TimeValue, Time);
impl_leaf!(Duration, Duration);
impl_leaf!(Vec<Duration>, Durations);
impl_leaf!(bool, Bool);
impl_leaf!(i64, Int);
impl_leaf!(u64, Uint);
impl_leaf!(String, Str);
impl_leaf!(Vec<bool>, Bools);
impl_leaf!(Vec<i64>, Ints);
impl_leaf!(Vec<u64>, Uints);
impl_leaf!(Vec<u8>, Bytes);
impl_leaf!(Vec<String>, Strings);
impl_leaf!(BTreeMap<String, i64>, IntMap);
impl_leaf!(BTreeMap<String, String>, StrMap);

impl<S: BuildHasher + Default> Leaf for HashMap<String, i64, S> {
    const KIND: LeafKind = LeafKind::IntMap;

    fn to_leaf(&self) -> LeafValue {
        LeafValue::IntMap(self.iter().map(|(k, v)| (k.clone(), *v)).collect())
    }

    fn from_leaf(value: LeafValue) -> Option<Self> {
        match value {
            LeafValue::IntMap(map) => Some(map.into_iter().collect()),
            _ => None,
        }
    }
}

impl<S: BuildHasher + Default> Leaf for HashMap<String, String, S> {
    const KIND: LeafKind = LeafKind::StrMap;

    fn to_leaf(&self) -> LeafValue {
        LeafValue::StrMap(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn from_leaf(value: LeafValue) -> Option<Self> {
        match value {
            LeafValue::StrMap(map) => Some(map.into_iter().collect()),
            _ => None,
        }
    }
}
