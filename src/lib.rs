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

//! # Zi Export Library
//!
//! Streaming export engine for the Zi framework. A job takes records from
//! one of three source shapes, settles the exported field list once, turns
//! every value into flat `(column, cell)` pairs and writes them to a JSON,
//! delimited text or spreadsheet sink.
//!
//! ## Module Overview
//!
//! - **errors**: `ZiError` taxonomy and `Result` alias
//! - **record**: `ZiRecord` and `ZiValue`, ordered field mappings
//! - **model**: Field descriptors, custom exporters and the model accessor trait
//! - **ingest**: Source shapes and normalization into a record stream
//! - **schema**: Exported field list resolution
//! - **transform**: Per-field export and flattening into cells
//! - **export**: Column registry, encodings, sinks and the job driver
//! - **context**: Host collaborators (error reporter, model loader, cancellation)
//! - **config**: Job configuration
//!
//! ## Feature Flags
//!
//! - `xlsx` (default): Built-in OOXML engine for spreadsheet output. Without
//!   it spreadsheet requests fall back to delimited text.
//!
//! ## Quick Start
//!
//! ```rust
//! use zix_export::{export, ZiExportConfig, ZiRecordSource};
//! use serde_json::json;
//!
//! let source = ZiRecordSource::from_json(json!([{"name": "x", "age": 1}]))?;
//! let mut out = Vec::new();
//! let outcome = export(source, ZiExportConfig::new(), &mut out)?;
//! assert_eq!(outcome.rows, 1);
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, ZiError>`. Structural errors (invalid
//! source, missing schema, missing engine) stop a job before any bytes are
//! written; unsupported values are coerced to text and reported.

pub mod config;
pub mod context;
pub mod errors;
pub mod export;
pub mod ingest;
pub mod model;
pub mod record;
pub mod schema;
pub mod transform;

pub use config::ZiExportConfig;
pub use context::{ZiCancellation, ZiErrorReporter, ZiExportContext, ZiLogReporter, ZiModelLoader};
pub use errors::{Result, ZiError};
pub use export::{
    export, ZiEncoding, ZiExportHeaders, ZiExportJob, ZiExportOutcome, ZiJobState, ZiSinkKind,
};
pub use ingest::{normalize, ZiRecordSource, ZiSourceKind};
pub use model::{ZiExporterFn, ZiFieldDescriptor, ZiModel};
pub use record::{ZiRecord, ZiRecordBatch, ZiValue};
pub use schema::{ZiResolvedSchema, ZiSchemaResolver};
pub use transform::{ZiCell, ZiFieldTransformer};
