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

//! # Sink Contract
//!
//! Every output format implements [`ZiSink`]. A job calls
//! `write_header` once after the first record, `write_row` per record, and
//! `finish` exactly once when the stream is exhausted. A job that fails or is
//! cancelled never calls `finish`; whatever the sink already wrote is not
//! valid output.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::export::columns::ZiColumn;
use crate::record::ZiRecord;
use crate::transform::ZiCell;

/// Output format requested by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiSinkKind {
    /// Whole record set as one JSON array.
    Json,
    /// Append-only delimited text.
    #[default]
    Delimited,
    /// Random-access spreadsheet grid.
    TabularBinary,
}

impl ZiSinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZiSinkKind::Json => "json",
            ZiSinkKind::Delimited => "delimited",
            ZiSinkKind::TabularBinary => "tabular_binary",
        }
    }
}

/// One cell placed in the output grid.
#[derive(Clone, Debug, PartialEq)]
pub struct ZiPlacedCell {
    pub column: ZiColumn,
    pub cell: ZiCell,
    /// The column was first seen in this row, after the header was written.
    pub discovered: bool,
}

/// One transformed record as handed to a sink.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZiRow {
    /// Unflattened exported values.
    pub record: ZiRecord,
    /// Flattened cells; empty for sinks that do not track columns.
    pub cells: Vec<ZiPlacedCell>,
}

/// Response metadata for the produced byte stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiExportHeaders {
    pub content_type: String,
    /// Download name used in the content disposition.
    pub file_name: String,
    /// Set to `max-age=0` for spreadsheet output.
    pub cache_control: Option<String>,
}

impl ZiExportHeaders {
    pub fn new(content_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            file_name: file_name.into(),
            cache_control: None,
        }
    }

    pub fn with_cache_control(mut self, value: impl Into<String>) -> Self {
        self.cache_control = Some(value.into());
        self
    }

    /// `attachment; filename="..."`, with quotes in the name escaped.
    pub fn content_disposition(&self) -> String {
        format!(
            "attachment; filename=\"{}\"",
            self.file_name.replace('"', "\\\"")
        )
    }

    /// Header name/value pairs in the order a response would send them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("Content-Type", self.content_type.clone()),
            ("Content-Disposition", self.content_disposition()),
        ];
        if let Some(cache) = &self.cache_control {
            pairs.push(("Cache-Control", cache.clone()));
        }
        pairs
    }
}

/// Terminal writer for transformed rows.
pub trait ZiSink {
    fn kind(&self) -> ZiSinkKind;

    /// Sinks without a column concept skip header and cell handling.
    fn tracks_columns(&self) -> bool {
        true
    }

    /// Random-access sinks may revisit earlier cells.
    fn is_random_access(&self) -> bool {
        false
    }

    fn write_header(&mut self, columns: &[ZiColumn]) -> Result<()>;

    fn write_row(&mut self, row: &ZiRow) -> Result<()>;

    /// Flushes the output and returns the number of data rows written.
    fn finish(self: Box<Self>) -> Result<usize>;
}
