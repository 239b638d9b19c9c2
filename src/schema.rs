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

//! # Schema Resolution
//!
//! Decides which fields of each record are exported, in which order, and
//! which of them go through a custom exporter. Resolution happens once per
//! job, before the first record is transformed.
//!
//! ## Resolution Order
//!
//! 1. An explicit field list from the caller is used verbatim.
//! 2. Model-backed sources use their exportable descriptors in declaration
//!    order.
//! 3. Anything else takes the key order of the first record.

use std::fmt;

use crate::errors::{Result, ZiError};
use crate::ingest::ZiSourceKind;
use crate::model::{ZiExporterFn, ZiFieldDescriptor};
use crate::record::ZiRecord;

/// Where the resolved field list came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZiSchemaOrigin {
    Explicit,
    ModelDescriptors,
    FirstRecord,
}

/// One selected field and its optional exporter.
#[derive(Clone)]
pub struct ZiSchemaField {
    pub name: String,
    exporter: Option<ZiExporterFn>,
}

impl ZiSchemaField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exporter: None,
        }
    }

    pub fn exporter(&self) -> Option<&ZiExporterFn> {
        self.exporter.as_ref()
    }
}

impl PartialEq for ZiSchemaField {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.exporter.is_some() == other.exporter.is_some()
    }
}

impl fmt::Debug for ZiSchemaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiSchemaField")
            .field("name", &self.name)
            .field("has_exporter", &self.exporter.is_some())
            .finish()
    }
}

/// Ordered field list fixed for the lifetime of a job.
#[derive(Clone, Debug, PartialEq)]
pub struct ZiResolvedSchema {
    fields: Vec<ZiSchemaField>,
    origin: ZiSchemaOrigin,
}

impl ZiResolvedSchema {
    /// Selected fields in export order.
    pub fn fields(&self) -> &[ZiSchemaField] {
        &self.fields
    }

    /// Field names in export order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Where the field list came from.
    pub fn origin(&self) -> ZiSchemaOrigin {
        self.origin
    }

    /// Whether the field list is only a starting column order.
    ///
    /// A list taken from the first record grows with keys that later records
    /// introduce. Explicit and model-declared lists are closed.
    pub fn is_open(&self) -> bool {
        self.origin == ZiSchemaOrigin::FirstRecord
    }

    /// True if `name` is one of the selected fields.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ZiSchemaResolver;

impl ZiSchemaResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves the ordered field list for a job.
    ///
    /// Explicit fields are taken as given, without filtering on the
    /// exportable flag. For model-backed sources they still pick up the
    /// exporter of a declared field with the same name.
    pub fn resolve(
        &self,
        kind: ZiSourceKind,
        explicit_fields: Option<&[String]>,
        descriptors: &[ZiFieldDescriptor],
        first_record: Option<&ZiRecord>,
    ) -> Result<ZiResolvedSchema> {
        let model_backed = kind.is_model_backed();

        if let Some(explicit) = explicit_fields {
            let fields = explicit
                .iter()
                .map(|name| ZiSchemaField {
                    name: name.clone(),
                    exporter: if model_backed {
                        find_exporter(descriptors, name)
                    } else {
                        None
                    },
                })
                .collect();
            return Ok(self.finish(fields, ZiSchemaOrigin::Explicit));
        }

        let Some(first) = first_record else {
            return Err(ZiError::missing_schema(
                "source yielded no records and no field list was given",
            ));
        };

        if model_backed {
            let fields = descriptors
                .iter()
                .filter(|d| d.exportable)
                .map(|d| ZiSchemaField {
                    name: d.name.clone(),
                    exporter: d.exporter().cloned(),
                })
                .collect();
            return Ok(self.finish(fields, ZiSchemaOrigin::ModelDescriptors));
        }

        let fields = first.keys().map(ZiSchemaField::new).collect();
        Ok(self.finish(fields, ZiSchemaOrigin::FirstRecord))
    }

    fn finish(&self, fields: Vec<ZiSchemaField>, origin: ZiSchemaOrigin) -> ZiResolvedSchema {
        let schema = ZiResolvedSchema { fields, origin };
        log::debug!(
            "resolved export schema from {:?}: {:?}",
            origin,
            schema.names()
        );
        schema
    }
}

fn find_exporter(descriptors: &[ZiFieldDescriptor], name: &str) -> Option<ZiExporterFn> {
    descriptors
        .iter()
        .find(|d| d.name == name)
        .and_then(|d| d.exporter().cloned())
}
