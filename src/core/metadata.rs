//! Structured metadata attached to log records
//!
//! Arrays and objects are shared nodes, so the same node can appear several
//! times in one value, or even inside itself. Serialization keeps a per-call
//! set of visited nodes and writes a short `@Object` / `@Array` marker for any
//! node it meets a second time, which keeps output finite for cyclic values.

use super::error::{LoggerError, Result};
use parking_lot::RwLock;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Marker written in place of an object that was already serialized
pub const OBJECT_MARKER: &str = "@Object";
/// Marker written in place of an array that was already serialized
pub const ARRAY_MARKER: &str = "@Array";

#[derive(Clone, Default)]
pub enum Metadata {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(MetaArray),
    Object(MetaObject),
}

/// Shared, mutable object node. Keys keep insertion order.
#[derive(Clone, Default)]
pub struct MetaObject(Arc<RwLock<Vec<(String, Metadata)>>>);

/// Shared, mutable array node
#[derive(Clone, Default)]
pub struct MetaArray(Arc<RwLock<Vec<Metadata>>>);

impl MetaObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert and return `self`, for building values inline
    #[must_use]
    pub fn with(self, key: impl Into<String>, value: impl Into<Metadata>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a key
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Metadata>) {
        let key = key.into();
        let value = value.into();
        let mut entries = self.0.write();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Metadata> {
        self.0
            .read()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Whether both handles point at the same node
    pub fn same_node(&self, other: &MetaObject) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl MetaArray {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(self, value: impl Into<Metadata>) -> Self {
        self.push(value);
        self
    }

    pub fn push(&self, value: impl Into<Metadata>) {
        self.0.write().push(value.into());
    }

    pub fn get(&self, index: usize) -> Option<Metadata> {
        self.0.read().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn same_node(&self, other: &MetaArray) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl Metadata {
    /// Convert any serializable value
    ///
    /// Values serde cannot represent as JSON are downgraded to a string
    /// placeholder instead of failing the log call.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Self {
        match Self::try_from_serializable(value) {
            Ok(metadata) => metadata,
            Err(e) => Metadata::String(format!("<{}>", e)),
        }
    }

    pub fn try_from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Metadata::from)
            .map_err(|e| LoggerError::serialization(e.to_string()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Metadata::Null)
    }

    /// Null, `false`, zero or the empty string
    pub fn is_empty_value(&self) -> bool {
        match self {
            Metadata::Null => true,
            Metadata::Bool(b) => !b,
            Metadata::Number(n) => n.as_f64() == Some(0.0),
            Metadata::String(s) => s.is_empty(),
            Metadata::Array(_) | Metadata::Object(_) => false,
        }
    }

    /// Snapshot as a JSON value, replacing revisited nodes with markers
    pub fn to_json(&self) -> Value {
        let mut seen = HashSet::new();
        self.to_json_with(&mut seen)
    }

    /// Cycle-safe JSON text
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(&self.to_json()).map_err(|e| LoggerError::serialization(e.to_string()))
    }

    fn to_json_with(&self, seen: &mut HashSet<usize>) -> Value {
        match self {
            Metadata::Null => Value::Null,
            Metadata::Bool(b) => Value::Bool(*b),
            Metadata::Number(n) => Value::Number(n.clone()),
            Metadata::String(s) => Value::String(s.clone()),
            Metadata::Array(array) => {
                if !seen.insert(array.id()) {
                    return Value::String(ARRAY_MARKER.to_string());
                }
                // Snapshot first so no lock is held while descending into children.
                let items = array.0.read().clone();
                Value::Array(items.iter().map(|item| item.to_json_with(seen)).collect())
            }
            Metadata::Object(object) => {
                if !seen.insert(object.id()) {
                    return Value::String(OBJECT_MARKER.to_string());
                }
                let entries = object.0.read().clone();
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in &entries {
                    map.insert(key.clone(), value.to_json_with(seen));
                }
                Value::Object(map)
            }
        }
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metadata({})", self.to_json())
    }
}

impl fmt::Debug for MetaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Metadata::Object(self.clone()), f)
    }
}

impl fmt::Debug for MetaArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Metadata::Array(self.clone()), f)
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<Value> for Metadata {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Metadata::Null,
            Value::Bool(b) => Metadata::Bool(b),
            Value::Number(n) => Metadata::Number(n),
            Value::String(s) => Metadata::String(s),
            Value::Array(items) => {
                Metadata::Array(MetaArray(Arc::new(RwLock::new(
                    items.into_iter().map(Metadata::from).collect(),
                ))))
            }
            Value::Object(map) => Metadata::Object(MetaObject(Arc::new(RwLock::new(
                map.into_iter().map(|(k, v)| (k, Metadata::from(v))).collect(),
            )))),
        }
    }
}

impl From<MetaObject> for Metadata {
    fn from(object: MetaObject) -> Self {
        Metadata::Object(object)
    }
}

impl From<MetaArray> for Metadata {
    fn from(array: MetaArray) -> Self {
        Metadata::Array(array)
    }
}

impl From<&str> for Metadata {
    fn from(s: &str) -> Self {
        Metadata::String(s.to_string())
    }
}

impl From<String> for Metadata {
    fn from(s: String) -> Self {
        Metadata::String(s)
    }
}

impl From<bool> for Metadata {
    fn from(b: bool) -> Self {
        Metadata::Bool(b)
    }
}

impl From<i64> for Metadata {
    fn from(n: i64) -> Self {
        Metadata::Number(n.into())
    }
}

impl From<i32> for Metadata {
    fn from(n: i32) -> Self {
        Metadata::Number(n.into())
    }
}

impl From<u64> for Metadata {
    fn from(n: u64) -> Self {
        Metadata::Number(n.into())
    }
}

impl From<f64> for Metadata {
    /// Non-finite floats have no JSON form and become `Null`
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Metadata::Null, Metadata::Number)
    }
}

impl<T: Into<Metadata>> From<Option<T>> for Metadata {
    fn from(value: Option<T>) -> Self {
        value.map_or(Metadata::Null, Into::into)
    }
}
