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

//! # Field Transformation
//!
//! Computes exported values for one record. Each selected field goes through
//! its exporter (identity by default); nested results are flattened into
//! synthetic `field_subkey` columns so every emitted cell is a scalar.
//!
//! ## Flattening Rules
//!
//! - Mappings emit one column per key, `field_key`, in the mapping's order
//! - Sequences emit one column per item, `field_0`, `field_1`, ...
//! - Nesting recurses: `{a: {b: 1}}` under `f` yields `f_a_b`
//! - The parent field never becomes a cell itself
//!
//! Values with no exportable shape are coerced to text and reported as
//! [`ZiError::UnsupportedValue`] anomalies; they never fail the export.

use std::fmt;

use serde::Serialize;

use crate::errors::ZiError;
use crate::ingest::ZiSourceKind;
use crate::model::ZiExporterFn;
use crate::record::{ZiRecord, ZiValue};
use crate::schema::ZiResolvedSchema;

/// Leading pseudo-field emitted for model-backed records.
pub const ZI_NAME_FIELD: &str = "name";

/// A scalar cell value ready for a sink.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ZiCell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ZiCell {
    /// Text cells are the only ones a charset converter touches.
    pub fn is_text(&self) -> bool {
        matches!(self, ZiCell::Text(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ZiCell::Null)
    }
}

impl fmt::Display for ZiCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZiCell::Null => Ok(()),
            ZiCell::Bool(b) => write!(f, "{b}"),
            ZiCell::Int(i) => write!(f, "{i}"),
            ZiCell::Float(v) => write!(f, "{v}"),
            ZiCell::Text(s) => f.write_str(s),
        }
    }
}

/// Result of transforming one field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZiTransformed {
    /// `(column_name, cell)` pairs in emission order.
    pub pairs: Vec<(String, ZiCell)>,
    /// Recoverable anomalies met while flattening.
    pub anomalies: Vec<ZiError>,
}

/// Result of transforming a whole record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZiTransformedRecord {
    /// Exported values, unflattened, for sinks without a column concept.
    pub values: ZiRecord,
    /// Flattened `(column_name, cell)` pairs for every emitted column.
    pub pairs: Vec<(String, ZiCell)>,
    pub anomalies: Vec<ZiError>,
}

/// Turns raw record values into named scalar cells.
///
/// Stateless apart from whether the source is model-backed; one instance
/// serves a whole job.
#[derive(Clone, Copy, Debug)]
pub struct ZiFieldTransformer {
    emit_name: bool,
}

impl ZiFieldTransformer {
    /// Model-backed sources get the synthetic leading `name` field.
    pub fn for_source(kind: ZiSourceKind) -> Self {
        Self {
            emit_name: kind.is_model_backed(),
        }
    }

    /// Applies the exporter to a raw value.
    pub fn export_value(
        &self,
        raw: &ZiValue,
        record: &ZiRecord,
        exporter: Option<&ZiExporterFn>,
    ) -> ZiValue {
        match exporter {
            Some(exporter) => exporter(raw, record),
            None => raw.clone(),
        }
    }

    /// Transforms one field into one or more `(column, cell)` pairs.
    pub fn transform(
        &self,
        field_name: &str,
        raw: &ZiValue,
        record: &ZiRecord,
        exporter: Option<&ZiExporterFn>,
    ) -> ZiTransformed {
        let value = self.export_value(raw, record, exporter);
        let mut out = ZiTransformed::default();
        flatten_into(field_name.to_string(), value, &mut out);
        out
    }

    /// Transforms every selected field of a record, leading with `name` for
    /// model-backed sources. Fields missing from the record export as null.
    /// When the schema came from the first record, keys that record lacked
    /// are appended after the schema fields in the record's own order.
    pub fn transform_record(
        &self,
        schema: &ZiResolvedSchema,
        record: &ZiRecord,
    ) -> ZiTransformedRecord {
        let mut result = ZiTransformedRecord::default();

        if self.emit_name {
            let name = ZiValue::from(record.display_name().map(str::to_string));
            result.values.insert(ZI_NAME_FIELD, name.clone());
            let mut out = ZiTransformed::default();
            flatten_into(ZI_NAME_FIELD.to_string(), name, &mut out);
            result.pairs.extend(out.pairs);
        }

        for field in schema.fields() {
            let raw = record.get(&field.name).unwrap_or(&ZiValue::Null);
            let value = self.export_value(raw, record, field.exporter());
            push_field(&mut result, &field.name, value);
        }

        // Keys first seen after the first record follow the resolved fields.
        if schema.is_open() {
            for (name, raw) in record.iter() {
                if !schema.contains(name) {
                    push_field(&mut result, name, raw.clone());
                }
            }
        }

        result
    }
}

fn push_field(result: &mut ZiTransformedRecord, name: &str, value: ZiValue) {
    result.values.insert(name.to_string(), value.clone());

    let mut out = ZiTransformed::default();
    flatten_into(name.to_string(), value, &mut out);
    result.pairs.extend(out.pairs);
    result.anomalies.extend(out.anomalies);
}

fn flatten_into(column: String, value: ZiValue, out: &mut ZiTransformed) {
    match value {
        ZiValue::Null => out.pairs.push((column, ZiCell::Null)),
        ZiValue::Bool(b) => out.pairs.push((column, ZiCell::Bool(b))),
        ZiValue::Int(i) => out.pairs.push((column, ZiCell::Int(i))),
        ZiValue::Float(f) => out.pairs.push((column, ZiCell::Float(f))),
        ZiValue::Text(s) => out.pairs.push((column, ZiCell::Text(s))),
        ZiValue::Map(map) => {
            for (key, nested) in map {
                flatten_into(format!("{column}_{key}"), nested, out);
            }
        }
        ZiValue::List(items) => {
            for (idx, nested) in items.into_iter().enumerate() {
                flatten_into(format!("{column}_{idx}"), nested, out);
            }
        }
        ZiValue::Opaque(opaque) => {
            log::warn!(
                "field '{}' holds an unsupported {} value, exporting its text form",
                column,
                opaque.type_name
            );
            out.anomalies.push(ZiError::unsupported_value(
                column.clone(),
                format!("{} coerced to text", opaque.type_name),
            ));
            out.pairs.push((column, ZiCell::Text(opaque.text)));
        }
    }
}
