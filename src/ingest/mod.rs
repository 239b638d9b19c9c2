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

//! # Data Ingestion Module
//!
//! This module turns export inputs into a uniform record stream.
//!
//! ## Module Components
//!
//! - **Source** ([source.rs](source/index.html)): Tagged input shapes and normalization
//!
//! ## Supported Input Shapes
//!
//! - **Model collections**: Typed models with declared field descriptors
//! - **Tabular rows**: Query results with named columns
//! - **Plain records**: Mapping-like records, including JSON arrays of objects
//!
//! ## Usage Patterns
//!
//! ```rust
//! use zix_export::ingest::{normalize, ZiRecordSource};
//! use serde_json::json;
//!
//! let source = ZiRecordSource::from_json(json!([{"a": 1}, {"a": 2}]))?;
//! let mut records = normalize(source)?;
//! let first = records.first_record()?;
//! ```

pub mod source;

pub use source::{normalize, ZiNormalizedSource, ZiRecordIter, ZiRecordSource, ZiSourceKind};
