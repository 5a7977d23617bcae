//! A figment provider over dotted canonical keys.

use figment::value::{Dict, Map, Tag, Value};
use figment::{Error, Metadata, Profile, Provider};

/// Values addressed by dotted canonical keys, nested into tables on read.
///
/// ```
/// use asp::KeyedValues;
/// use figment::{Figment, value::Value};
///
/// let mut values = KeyedValues::new("defaults");
/// values.insert("server.port", Value::from(8080_u64));
/// let merged: Value = Figment::from(values).extract().unwrap();
/// assert_eq!(merged.find_ref("server.port").and_then(Value::to_u128), Some(8080));
/// ```
#[derive(Clone, Debug)]
pub struct KeyedValues {
    name: &'static str,
    entries: Vec<(String, Value)>,
}

impl KeyedValues {
    /// An empty set of values reported under `name`.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    /// Adds a value. Later inserts for the same key win.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.push((key.into(), value));
    }

    /// Number of inserted values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Provider for KeyedValues {
    fn metadata(&self) -> Metadata {
        Metadata::named(self.name)
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();
        for (key, value) in &self.entries {
            nest(&mut dict, key, value.clone());
        }
        Ok(Profile::Default.collect(dict))
    }
}

fn nest(dict: &mut Dict, key: &str, value: Value) {
    let Some((head, rest)) = key.split_once('.') else {
        dict.insert(key.to_owned(), value);
        return;
    };
    let entry = dict
        .entry(head.to_owned())
        .or_insert_with(|| Value::Dict(Tag::Default, Dict::new()));
    if !matches!(entry, Value::Dict(..)) {
        *entry = Value::Dict(Tag::Default, Dict::new());
    }
    if let Value::Dict(_, child) = entry {
        nest(child, rest, value);
    }
}
