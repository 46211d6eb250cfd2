// src/dynamic/value.rs
//! Engine-independent dynamic value exchanged with scripting runtimes

use ahash::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest integer magnitude a double represents exactly (2^53).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_992;

/// Dynamic value type
///
/// Numbers carry either an integer or a double payload. Equality compares
/// them numerically, so `Int(3) == Float(3.0)`. NaN follows IEEE-754 and is
/// never equal to anything, itself included, so a NaN survives a round trip
/// bit for bit but the round-tripped value does not compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dynamic {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Dynamic>),
    Object(HashMap<String, Dynamic>),
}

impl Dynamic {
    /// Empty object value
    pub fn object() -> Self {
        Dynamic::Object(HashMap::default())
    }

    /// Empty array value
    pub fn array() -> Self {
        Dynamic::Array(Vec::new())
    }

    /// Name of the variant tag, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Int(_) => "int",
            Dynamic::Float(_) => "float",
            Dynamic::String(_) => "string",
            Dynamic::Array(_) => "array",
            Dynamic::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Dynamic::Int(_) | Dynamic::Float(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Dynamic::Array(_) | Dynamic::Object(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric payload as a double. Integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Dynamic::Int(n) => Some(*n as f64),
            Dynamic::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Numeric payload as an integer. Doubles only convert when integral
    /// and in range.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Dynamic::Int(n) => Some(*n),
            Dynamic::Float(f) => float_to_exact_int(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Dynamic]> {
        match self {
            Dynamic::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, Dynamic>> {
        match self {
            Dynamic::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key on an object value
    pub fn get(&self, key: &str) -> Option<&Dynamic> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Look up an element on an array value
    pub fn index(&self, index: usize) -> Option<&Dynamic> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Element or entry count for containers, `None` for scalars
    pub fn len(&self) -> Option<usize> {
        match self {
            Dynamic::Array(items) => Some(items.len()),
            Dynamic::Object(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Insert into an object value, returning the previous entry.
    ///
    /// Returns `None` without inserting when `self` is not an object.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Dynamic>) -> Option<Dynamic> {
        match self {
            Dynamic::Object(map) => map.insert(key.into(), value.into()),
            _ => None,
        }
    }

    /// Append to an array value. No-op for anything else.
    pub fn push(&mut self, value: impl Into<Dynamic>) {
        if let Dynamic::Array(items) = self {
            items.push(value.into());
        }
    }

    /// Builder form of [`Dynamic::insert`]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Dynamic>) -> Self {
        self.insert(key, value);
        self
    }

    /// Maximum container nesting. Scalars have depth 0, `[]` has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(&Dynamic, usize)> = vec![(self, 0)];

        while let Some((value, depth)) = pending.pop() {
            match value {
                Dynamic::Array(items) => {
                    deepest = deepest.max(depth + 1);
                    pending.extend(items.iter().map(|item| (item, depth + 1)));
                }
                Dynamic::Object(map) => {
                    deepest = deepest.max(depth + 1);
                    pending.extend(map.values().map(|item| (item, depth + 1)));
                }
                _ => {}
            }
        }

        deepest
    }
}

fn float_to_exact_int(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl PartialEq for Dynamic {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Dynamic::Null, Dynamic::Null) => true,
            (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
            (Dynamic::Int(a), Dynamic::Int(b)) => a == b,
            (Dynamic::Float(a), Dynamic::Float(b)) => a == b,
            (Dynamic::Int(i), Dynamic::Float(f)) | (Dynamic::Float(f), Dynamic::Int(i)) => {
                float_to_exact_int(*f) == Some(*i)
            }
            (Dynamic::String(a), Dynamic::String(b)) => a == b,
            (Dynamic::Array(a), Dynamic::Array(b)) => a == b,
            (Dynamic::Object(a), Dynamic::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Default for Dynamic {
    fn default() -> Self {
        Dynamic::Null
    }
}

impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null => write!(f, "null"),
            Dynamic::Bool(b) => write!(f, "{}", b),
            Dynamic::Int(n) => write!(f, "{}", n),
            Dynamic::Float(n) => write!(f, "{}", n),
            Dynamic::String(s) => write!(f, "{:?}", s),
            Dynamic::Array(arr) => {
                write!(f, "[")?;
                for (i, val) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            Dynamic::Object(obj) => {
                // Sorted so output is stable across hasher seeds
                let mut entries: Vec<_> = obj.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));

                write!(f, "{{")?;
                for (i, (k, v)) in entries.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

// Convenient conversions
impl From<bool> for Dynamic {
    fn from(b: bool) -> Self {
        Dynamic::Bool(b)
    }
}

impl From<i32> for Dynamic {
    fn from(n: i32) -> Self {
        Dynamic::Int(n as i64)
    }
}

impl From<u32> for Dynamic {
    fn from(n: u32) -> Self {
        Dynamic::Int(n as i64)
    }
}

impl From<i64> for Dynamic {
    fn from(n: i64) -> Self {
        Dynamic::Int(n)
    }
}

impl From<f64> for Dynamic {
    fn from(f: f64) -> Self {
        Dynamic::Float(f)
    }
}

impl From<String> for Dynamic {
    fn from(s: String) -> Self {
        Dynamic::String(s)
    }
}

impl From<&str> for Dynamic {
    fn from(s: &str) -> Self {
        Dynamic::String(s.to_string())
    }
}

impl<T: Into<Dynamic>> From<Vec<T>> for Dynamic {
    fn from(v: Vec<T>) -> Self {
        Dynamic::Array(v.into_iter().map(|x| x.into()).collect())
    }
}

impl<T: Into<Dynamic>> From<Option<T>> for Dynamic {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Dynamic::Null,
        }
    }
}

impl<T: Into<Dynamic>> From<HashMap<String, T>> for Dynamic {
    fn from(map: HashMap<String, T>) -> Self {
        Dynamic::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Dynamic>> FromIterator<(K, V)> for Dynamic {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Dynamic::Object(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Value> for Dynamic {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Dynamic::Null,
            serde_json::Value::Bool(b) => Dynamic::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Dynamic::Int(i),
                None => Dynamic::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Dynamic::String(s),
            serde_json::Value::Array(items) => {
                Dynamic::Array(items.into_iter().map(Dynamic::from).collect())
            }
            serde_json::Value::Object(map) => {
                Dynamic::Object(map.into_iter().map(|(k, v)| (k, Dynamic::from(v))).collect())
            }
        }
    }
}

/// Non-finite doubles become `null`, the same way serde_json writes them.
impl From<&Dynamic> for serde_json::Value {
    fn from(value: &Dynamic) -> Self {
        match value {
            Dynamic::Null => serde_json::Value::Null,
            Dynamic::Bool(b) => serde_json::Value::Bool(*b),
            Dynamic::Int(n) => serde_json::Value::from(*n),
            Dynamic::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Dynamic::String(s) => serde_json::Value::String(s.clone()),
            Dynamic::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Dynamic::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}
