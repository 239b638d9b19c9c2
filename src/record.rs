//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Zi Record Module
//!
//! This module provides the data structures for one exportable logical row.
//! A [`ZiRecord`] is an ordered mapping from field name to [`ZiValue`]; the
//! order of insertion is the order fields are discovered and exported in.
//!
//! ## Value Shapes
//!
//! - **Scalars**: null, booleans, integers, floats and text
//! - **Mappings**: further named sub-values, in their own order
//! - **Sequences**: ordered lists of values
//! - **Opaque**: handles from the model layer that have no exportable shape.
//!   These are coerced to their textual form at export time.
//!
//! ## Usage Example
//!
//! ```rust
//! use zix_export::record::{ZiRecord, ZiValue};
//! use serde_json::json;
//!
//! let record = ZiRecord::from_json(json!({"name": "x", "meta": {"a": 1}}))?;
//! assert_eq!(record.get("name"), Some(&ZiValue::from("x")));
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::errors::{Result, ZiError};

/// Ordered name to value mapping used for nested values.
pub type ZiFieldMap = IndexMap<String, ZiValue>;

/// A raw or transformed field value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ZiValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Map(ZiFieldMap),
    List(Vec<ZiValue>),
    Opaque(ZiOpaque),
}

/// A model-layer value with no scalar, mapping or sequence shape.
///
/// Carries the originating type name and a textual rendering so the engine can
/// coerce it to a cell instead of failing the export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZiOpaque {
    pub type_name: String,
    pub text: String,
}

impl Serialize for ZiOpaque {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl fmt::Display for ZiOpaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl ZiValue {
    /// Wraps a model handle that only offers a textual rendering.
    pub fn opaque(type_name: impl Into<String>, text: impl Into<String>) -> Self {
        ZiValue::Opaque(ZiOpaque {
            type_name: type_name.into(),
            text: text.into(),
        })
    }

    /// True for mappings and sequences, which are flattened into sub-columns.
    pub fn is_container(&self) -> bool {
        matches!(self, ZiValue::Map(_) | ZiValue::List(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ZiValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ZiValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Converts back into a JSON value. Opaque handles become strings.
    pub fn to_json(&self) -> Value {
        match self {
            ZiValue::Null => Value::Null,
            ZiValue::Bool(b) => Value::Bool(*b),
            ZiValue::Int(i) => Value::from(*i),
            ZiValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ZiValue::Text(s) => Value::String(s.clone()),
            ZiValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            ZiValue::List(items) => Value::Array(items.iter().map(ZiValue::to_json).collect()),
            ZiValue::Opaque(o) => Value::String(o.text.clone()),
        }
    }
}

impl From<Value> for ZiValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ZiValue::Null,
            Value::Bool(b) => ZiValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ZiValue::Int(i),
                None => ZiValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ZiValue::Text(s),
            Value::Array(items) => ZiValue::List(items.into_iter().map(ZiValue::from).collect()),
            Value::Object(map) => {
                ZiValue::Map(map.into_iter().map(|(k, v)| (k, ZiValue::from(v))).collect())
            }
        }
    }
}

impl From<&str> for ZiValue {
    fn from(value: &str) -> Self {
        ZiValue::Text(value.to_string())
    }
}

impl From<String> for ZiValue {
    fn from(value: String) -> Self {
        ZiValue::Text(value)
    }
}

impl From<i64> for ZiValue {
    fn from(value: i64) -> Self {
        ZiValue::Int(value)
    }
}

impl From<f64> for ZiValue {
    fn from(value: f64) -> Self {
        ZiValue::Float(value)
    }
}

impl From<bool> for ZiValue {
    fn from(value: bool) -> Self {
        ZiValue::Bool(value)
    }
}

impl<T: Into<ZiValue>> From<Option<T>> for ZiValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ZiValue::Null)
    }
}

/// One exportable logical row.
///
/// Model-backed records also carry the model's natural display name, which
/// the transformer emits as a leading `name` column.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ZiRecord {
    #[serde(flatten)]
    fields: ZiFieldMap,
    #[serde(skip)]
    display_name: Option<String>,
}

impl ZiRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a JSON object, keeping key order.
    ///
    /// Any other JSON shape is rejected as an invalid source item.
    pub fn from_json(value: Value) -> Result<Self> {
        match ZiValue::from(value) {
            ZiValue::Map(fields) => Ok(Self {
                fields,
                display_name: None,
            }),
            other => Err(ZiError::invalid_source(format!(
                "records must be mapping-like, got {}",
                shape_name(&other)
            ))),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<ZiValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ZiValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ZiValue> {
        self.fields.get(name)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ZiValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> ZiFieldMap {
        self.fields
    }

    /// JSON object view of the fields, in order.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl From<ZiFieldMap> for ZiRecord {
    fn from(fields: ZiFieldMap) -> Self {
        Self {
            fields,
            display_name: None,
        }
    }
}

impl<K: Into<String>, V: Into<ZiValue>> FromIterator<(K, V)> for ZiRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            display_name: None,
        }
    }
}

pub(crate) fn shape_name(value: &ZiValue) -> &'static str {
    match value {
        ZiValue::Null => "null",
        ZiValue::Bool(_) => "boolean",
        ZiValue::Int(_) | ZiValue::Float(_) => "number",
        ZiValue::Text(_) => "string",
        ZiValue::Map(_) => "mapping",
        ZiValue::List(_) => "sequence",
        ZiValue::Opaque(_) => "opaque value",
    }
}

/// Convenience alias for working on batches of records.
pub type ZiRecordBatch = Vec<ZiRecord>;
