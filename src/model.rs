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

//! # Model Interfaces
//!
//! The export engine does not know how models are declared. The model layer
//! hands it a list of [`ZiFieldDescriptor`]s in declaration order and a set of
//! [`ZiModel`] handles that can be read field by field.

use std::fmt;
use std::sync::Arc;

use crate::record::{ZiRecord, ZiValue};

/// Per-field export formatting hook: `(raw_value, record) -> exported_value`.
pub type ZiExporterFn = Arc<dyn Fn(&ZiValue, &ZiRecord) -> ZiValue + Send + Sync>;

/// Export-relevant view of one declared model field.
#[derive(Clone)]
pub struct ZiFieldDescriptor {
    /// Field name as declared on the model.
    pub name: String,
    /// False for fields the model marks as not exportable.
    pub exportable: bool,
    exporter: Option<ZiExporterFn>,
}

impl ZiFieldDescriptor {
    /// An exportable field with no custom exporter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exportable: true,
            exporter: None,
        }
    }

    /// Marks the field as excluded from schema discovery.
    pub fn disable_export(mut self) -> Self {
        self.exportable = false;
        self
    }

    /// Sets the formatting hook. It receives the raw value and the whole
    /// record, so it can read sibling fields.
    pub fn with_exporter<F>(mut self, exporter: F) -> Self
    where
        F: Fn(&ZiValue, &ZiRecord) -> ZiValue + Send + Sync + 'static,
    {
        self.exporter = Some(Arc::new(exporter));
        self
    }

    pub fn has_custom_exporter(&self) -> bool {
        self.exporter.is_some()
    }

    pub fn exporter(&self) -> Option<&ZiExporterFn> {
        self.exporter.as_ref()
    }

    /// Applies the exporter, or returns the raw value unchanged.
    pub fn export(&self, raw: &ZiValue, record: &ZiRecord) -> ZiValue {
        match &self.exporter {
            Some(exporter) => exporter(raw, record),
            None => raw.clone(),
        }
    }
}

impl fmt::Debug for ZiFieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiFieldDescriptor")
            .field("name", &self.name)
            .field("exportable", &self.exportable)
            .field("has_custom_exporter", &self.has_custom_exporter())
            .finish()
    }
}

/// A typed model instance as seen by the exporter.
pub trait ZiModel {
    /// The record's natural display name, exported as the leading `name` column.
    fn display_name(&self) -> String;

    /// Raw value of a declared field. Missing fields read as null.
    fn field_value(&self, field: &str) -> ZiValue;
}

impl<M: ZiModel + ?Sized> ZiModel for Box<M> {
    fn display_name(&self) -> String {
        (**self).display_name()
    }

    fn field_value(&self, field: &str) -> ZiValue {
        (**self).field_value(field)
    }
}
