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

//! # Record Sources
//!
//! Three input shapes feed the exporter: collections of typed models, tabular
//! query results, and plain record sequences. [`ZiRecordSource`] tags the
//! shape once; [`normalize`] turns any of them into a single-pass stream of
//! [`ZiRecord`]s. Records are produced lazily, so a forward-only cursor works
//! without holding the result set in memory.

use std::collections::HashSet;
use std::fmt;
use std::iter::Peekable;

use serde_json::Value;

use crate::errors::{Result, ZiError};
use crate::model::{ZiFieldDescriptor, ZiModel};
use crate::record::{ZiRecord, ZiValue};

/// Lazy, fallible stream of records.
pub type ZiRecordIter<'a> = Box<dyn Iterator<Item = Result<ZiRecord>> + 'a>;

type ZiModelIter<'a> = Box<dyn Iterator<Item = Box<dyn ZiModel + 'a>> + 'a>;
type ZiRowIter<'a> = Box<dyn Iterator<Item = Result<Vec<ZiValue>>> + 'a>;

/// Shape of the input, decided once at normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZiSourceKind {
    ModelCollection,
    TabularRows,
    PlainRecords,
}

impl ZiSourceKind {
    pub fn is_model_backed(self) -> bool {
        matches!(self, ZiSourceKind::ModelCollection)
    }
}

/// Export input, tagged by shape.
pub enum ZiRecordSource<'a> {
    /// Homogeneous typed models plus their declared fields.
    ModelCollection {
        descriptors: Vec<ZiFieldDescriptor>,
        models: ZiModelIter<'a>,
    },
    /// Query result: column names and positional rows.
    TabularRows {
        columns: Vec<String>,
        rows: ZiRowIter<'a>,
    },
    /// Plain mapping-like records.
    PlainRecords(ZiRecordIter<'a>),
}

impl<'a> ZiRecordSource<'a> {
    pub fn models<I, M>(descriptors: Vec<ZiFieldDescriptor>, models: I) -> Self
    where
        I: IntoIterator<Item = M>,
        I::IntoIter: 'a,
        M: ZiModel + 'a,
    {
        ZiRecordSource::ModelCollection {
            descriptors,
            models: Box::new(
                models
                    .into_iter()
                    .map(|m| Box::new(m) as Box<dyn ZiModel + 'a>),
            ),
        }
    }

    pub fn tabular<I>(columns: Vec<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<ZiValue>>,
        I::IntoIter: 'a,
    {
        Self::try_tabular(columns, rows.into_iter().map(Ok))
    }

    /// Tabular rows from a fallible cursor.
    pub fn try_tabular<I>(columns: Vec<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = Result<Vec<ZiValue>>>,
        I::IntoIter: 'a,
    {
        ZiRecordSource::TabularRows {
            columns,
            rows: Box::new(rows.into_iter()),
        }
    }

    pub fn records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ZiRecord>,
        I::IntoIter: 'a,
    {
        Self::try_records(records.into_iter().map(Ok))
    }

    pub fn try_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Result<ZiRecord>>,
        I::IntoIter: 'a,
    {
        ZiRecordSource::PlainRecords(Box::new(records.into_iter()))
    }

    /// Interprets a JSON document as plain records.
    ///
    /// An array must hold objects only; a lone object is a one-record source.
    /// Every array item is checked here, so a wrong shape fails before the
    /// job writes anything.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => {
                if let Some((idx, item)) = items.iter().enumerate().find(|(_, v)| !v.is_object()) {
                    return Err(ZiError::invalid_source(format!(
                        "input data must be an array of objects or an object, item {} is {}",
                        idx,
                        json_shape(item)
                    )));
                }
                let records = items
                    .into_iter()
                    .map(ZiRecord::from_json)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::records(records))
            }
            Value::Object(_) => {
                let record = ZiRecord::from_json(value)?;
                Ok(Self::records(std::iter::once(record)))
            }
            other => Err(ZiError::invalid_source(format!(
                "input data must be an array of objects or an object, got {}",
                json_shape(&other)
            ))),
        }
    }

    pub fn kind(&self) -> ZiSourceKind {
        match self {
            ZiRecordSource::ModelCollection { .. } => ZiSourceKind::ModelCollection,
            ZiRecordSource::TabularRows { .. } => ZiSourceKind::TabularRows,
            ZiRecordSource::PlainRecords(_) => ZiSourceKind::PlainRecords,
        }
    }
}

impl fmt::Debug for ZiRecordSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZiRecordSource::ModelCollection { descriptors, .. } => f
                .debug_struct("ModelCollection")
                .field("descriptors", descriptors)
                .finish_non_exhaustive(),
            ZiRecordSource::TabularRows { columns, .. } => f
                .debug_struct("TabularRows")
                .field("columns", columns)
                .finish_non_exhaustive(),
            ZiRecordSource::PlainRecords(_) => f.write_str("PlainRecords(..)"),
        }
    }
}

/// Uniform record stream produced by [`normalize`].
pub struct ZiNormalizedSource<'a> {
    kind: ZiSourceKind,
    descriptors: Vec<ZiFieldDescriptor>,
    records: Peekable<ZiRecordIter<'a>>,
}

impl<'a> ZiNormalizedSource<'a> {
    pub fn kind(&self) -> ZiSourceKind {
        self.kind
    }

    /// Declared field descriptors; empty unless the source is model-backed.
    pub fn descriptors(&self) -> &[ZiFieldDescriptor] {
        &self.descriptors
    }

    /// Looks at the first record without consuming it.
    pub fn first_record(&mut self) -> Result<Option<&ZiRecord>> {
        match self.records.peek() {
            None => Ok(None),
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(err)) => Err(err.clone()),
        }
    }
}

impl Iterator for ZiNormalizedSource<'_> {
    type Item = Result<ZiRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }
}

/// Normalizes any source shape into a lazy record stream.
pub fn normalize(source: ZiRecordSource<'_>) -> Result<ZiNormalizedSource<'_>> {
    let kind = source.kind();
    match source {
        ZiRecordSource::ModelCollection { descriptors, models } => {
            if descriptors.is_empty() {
                return Err(ZiError::invalid_source(
                    "model collection declares no fields",
                ));
            }
            let names: Vec<String> = descriptors.iter().map(|d| d.name.clone()).collect();
            let records: ZiRecordIter<'_> = Box::new(models.map(move |model| {
                let mut record = ZiRecord::new().with_display_name(model.display_name());
                for name in &names {
                    record.insert(name.clone(), model.field_value(name));
                }
                Ok(record)
            }));
            Ok(ZiNormalizedSource {
                kind,
                descriptors,
                records: records.peekable(),
            })
        }
        ZiRecordSource::TabularRows { columns, rows } => {
            if columns.is_empty() {
                return Err(ZiError::invalid_source("tabular result has no columns"));
            }
            let mut seen = HashSet::new();
            if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
                return Err(ZiError::invalid_source(format!(
                    "tabular result repeats column '{dup}'"
                )));
            }
            let records: ZiRecordIter<'_> = Box::new(rows.enumerate().map(move |(idx, row)| {
                let row = row?;
                if row.len() != columns.len() {
                    return Err(ZiError::invalid_source(format!(
                        "row {} has {} values for {} columns",
                        idx,
                        row.len(),
                        columns.len()
                    )));
                }
                Ok(columns.iter().cloned().zip(row).collect())
            }));
            Ok(ZiNormalizedSource {
                kind,
                descriptors: Vec::new(),
                records: records.peekable(),
            })
        }
        ZiRecordSource::PlainRecords(records) => Ok(ZiNormalizedSource {
            kind,
            descriptors: Vec::new(),
            records: records.peekable(),
        }),
    }
}

fn json_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
