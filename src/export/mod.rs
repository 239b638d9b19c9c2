//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd project team.
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

//! # Data Export Module
//!
//! This module writes a normalized record stream to one output format.
//!
//! ## Module Components
//!
//! - **Columns** ([columns.rs](columns/index.html)): First-seen column positions
//! - **Encoding** ([encoding.rs](encoding/index.html)): Charset conversion for text output
//! - **Sink** ([sink.rs](sink/index.html)): Sink contract and response headers
//! - **Json** ([json.rs](json/index.html)): Buffered JSON array output
//! - **Delimited** ([delimited.rs](delimited/index.html)): Append-only delimited text
//! - **Tabular** ([tabular.rs](tabular/index.html)): Random-access grid and spreadsheet engines
//! - **Xlsx** ([xlsx.rs](xlsx/index.html)): OOXML workbook engine (feature `xlsx`)
//! - **Job** ([job.rs](job/index.html)): Job state machine and streaming driver
//!
//! ## Supported Output Formats
//!
//! - **JSON**: Compact or pretty-printed array of nested records
//! - **Delimited**: CSV-style text, optionally transcoded (e.g. UTF-16LE for Excel)
//! - **Tabular binary**: Spreadsheet grid rendered by a [`ZiSpreadsheetEngine`]
//!
//! ## Usage Patterns
//!
//! ```rust
//! use zix_export::export::{ZiExportJob, ZiSinkKind};
//! use zix_export::{ZiExportConfig, ZiRecordSource};
//! use serde_json::json;
//!
//! let source = ZiRecordSource::from_json(json!([{"id": 1, "meta": {"a": 1}}]))?;
//! let config = ZiExportConfig::new().with_sink_kind(ZiSinkKind::Delimited);
//! let mut out = Vec::new();
//! let outcome = ZiExportJob::new(config).run(source, &mut out)?;
//! // id,meta_a
//! // 1,1
//! ```

pub mod columns;
pub mod delimited;
pub mod encoding;
pub mod job;
pub mod json;
pub mod sink;
pub mod tabular;
#[cfg(feature = "xlsx")]
pub mod xlsx;

pub use columns::{ZiColumn, ZiColumnRegistry};
pub use delimited::{delimiter_byte, ZiDelimitedOptions, ZiDelimitedSink, ZiLineEnding};
pub use encoding::{ZiEncoding, ZiEncodingConverter, ZI_EXCEL_CHARSET};
pub use job::{export, ZiExportJob, ZiExportOutcome, ZiExportPlan, ZiJobState};
pub use json::ZiJsonSink;
pub use sink::{ZiExportHeaders, ZiPlacedCell, ZiRow, ZiSink, ZiSinkKind};
pub use tabular::{default_engine, ZiGrid, ZiGridCsvEngine, ZiSpreadsheetEngine, ZiTabularSink};
#[cfg(feature = "xlsx")]
pub use xlsx::ZiXlsxEngine;
