use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::errors::SchemaError;

/// A single field value inside a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Time(DateTime<Utc>),
    /// Write-only sentinel; the store replaces it with its own clock when the
    /// write is applied. Every sentinel in one write resolves to one instant.
    ServerTime,
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Build a list value from anything convertible to values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Replace every `ServerTime` sentinel with the given instant.
    pub fn resolve(self, server_time: DateTime<Utc>) -> Self {
        match self {
            Value::ServerTime => Value::Time(server_time),
            Value::List(items) => {
                Value::List(items.into_iter().map(|v| v.resolve(server_time)).collect())
            }
            Value::Map(m) => Value::Map(
                m.into_iter()
                    .map(|(k, v)| (k, v.resolve(server_time)))
                    .collect(),
            ),
            other => other,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        // Saturate rather than wrap: a stored balance or counter must never
        // come back negative.
        Value::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

/// A stored document: named fields with dynamic values.
///
/// Documents are the wire shape of everything the platform persists. Typed
/// records decode from them at the repository boundary and refuse documents
/// with missing or mistyped required fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields.get_mut(field)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    /// Replace every `ServerTime` sentinel in the document with one instant.
    pub fn resolve_server_time(&mut self, server_time: DateTime<Utc>) {
        let fields = std::mem::take(&mut self.fields);
        self.fields = fields
            .into_iter()
            .map(|(k, v)| (k, v.resolve(server_time)))
            .collect();
    }

    pub fn require_text(&self, field: &'static str) -> Result<&str, SchemaError> {
        self.get(field)
            .ok_or(SchemaError::MissingField(field))?
            .as_text()
            .ok_or(SchemaError::WrongKind(field))
    }

    pub fn require_int(&self, field: &'static str) -> Result<i64, SchemaError> {
        self.get(field)
            .ok_or(SchemaError::MissingField(field))?
            .as_int()
            .ok_or(SchemaError::WrongKind(field))
    }

    /// Non-negative integer field, e.g. a currency balance or a counter.
    pub fn require_uint(&self, field: &'static str) -> Result<u64, SchemaError> {
        let n = self.require_int(field)?;
        u64::try_from(n).map_err(|_| SchemaError::WrongKind(field))
    }

    pub fn require_time(&self, field: &'static str) -> Result<DateTime<Utc>, SchemaError> {
        self.get(field)
            .ok_or(SchemaError::MissingField(field))?
            .as_time()
            .ok_or(SchemaError::WrongKind(field))
    }

    pub fn require_list(&self, field: &'static str) -> Result<&[Value], SchemaError> {
        self.get(field)
            .ok_or(SchemaError::MissingField(field))?
            .as_list()
            .ok_or(SchemaError::WrongKind(field))
    }

    /// A list field whose elements must all be text.
    pub fn require_text_list(&self, field: &'static str) -> Result<Vec<String>, SchemaError> {
        self.require_list(field)?
            .iter()
            .map(|v| {
                v.as_text()
                    .map(|s| s.to_string())
                    .ok_or(SchemaError::WrongKind(field))
            })
            .collect()
    }

    pub fn require_map(
        &self,
        field: &'static str,
    ) -> Result<&BTreeMap<String, Value>, SchemaError> {
        self.get(field)
            .ok_or(SchemaError::MissingField(field))?
            .as_map()
            .ok_or(SchemaError::WrongKind(field))
    }
}

/// One field-level mutation inside a store write batch.
///
/// These are the only writes the managers issue against shared documents:
/// concurrent `Union`/`Remove` on the same set field commute, so two clients
/// mutating one profile never overwrite each other's entries.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Overwrite a single named field. Never the whole document.
    Set(String, Value),
    /// Set-union one value into a list field. An absent field becomes a
    /// one-element list; a value already present is not duplicated; a
    /// non-list field is overwritten with a one-element list.
    Union(String, Value),
    /// Remove every occurrence of a value from a list field. An absent
    /// field or value is a no-op; a non-list field becomes an empty list.
    Remove(String, Value),
}

impl FieldUpdate {
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FieldUpdate::Set(field.into(), value.into())
    }

    pub fn union(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FieldUpdate::Union(field.into(), value.into())
    }

    pub fn remove(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FieldUpdate::Remove(field.into(), value.into())
    }

    /// Replace any `ServerTime` sentinel in the update's value.
    pub fn resolve(self, server_time: DateTime<Utc>) -> Self {
        match self {
            FieldUpdate::Set(f, v) => FieldUpdate::Set(f, v.resolve(server_time)),
            FieldUpdate::Union(f, v) => FieldUpdate::Union(f, v.resolve(server_time)),
            FieldUpdate::Remove(f, v) => FieldUpdate::Remove(f, v.resolve(server_time)),
        }
    }

    /// Apply this update to a document in place. Store backends call this
    /// after resolving sentinels.
    pub fn apply_to(self, document: &mut Document) {
        match self {
            FieldUpdate::Set(field, value) => {
                document.set(&field, value);
            }
            FieldUpdate::Union(field, value) => match document.get_mut(&field) {
                Some(Value::List(items)) => {
                    if !items.contains(&value) {
                        items.push(value);
                    }
                }
                _ => document.set(&field, Value::List(vec![value])),
            },
            FieldUpdate::Remove(field, value) => match document.get_mut(&field) {
                Some(Value::List(items)) => {
                    items.retain(|item| item != &value);
                }
                Some(_) => document.set(&field, Value::List(Vec::new())),
                None => {}
            },
        }
    }
}

/// Single-field query predicate, the only query shape the store offers.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field == value`.
    Eq(String, Value),
    /// List field contains the value (the store's array-contains query).
    Contains(String, Value),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Contains(field.into(), value.into())
    }

    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::Eq(field, value) => document.get(field) == Some(value),
            Filter::Contains(field, value) => document
                .get(field)
                .and_then(Value::as_list)
                .is_some_and(|items| items.contains(value)),
        }
    }
}
