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

//! # Zi Export Error Module
//!
//! This module defines the error types used throughout the export engine.
//!
//! ## Error Categories
//!
//! Structural errors abort a job before any bytes are written:
//!
//! - **InvalidSource**: The input is not a model collection, tabular result,
//!   or sequence of mapping-like records
//! - **MissingSchema**: No records and no explicit field list
//! - **MissingEngine**: A spreadsheet sink was requested with a custom
//!   encoding but no spreadsheet engine is available
//!
//! Per-value anomalies are recovered locally:
//!
//! - **UnsupportedValue**: A transformed value is not a scalar, mapping or
//!   sequence. The engine coerces it to text and carries on.
//!
//! Everything else (IO, serialization, encoding, cancellation) fails the
//! running job.
//!
//! ## Usage
//!
//! ```rust
//! use zix_export::errors::{Result, ZiError};
//!
//! fn check_delimiter(c: char) -> Result<u8> {
//!     if !c.is_ascii() {
//!         return Err(ZiError::validation("delimiter must be ASCII"));
//!     }
//!     Ok(c as u8)
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout the export engine.
pub type Result<T> = std::result::Result<T, ZiError>;

/// Canonical error enumeration for the export engine.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ZiError {
    /// Input is not one of the recognized source shapes.
    #[error("invalid source: {message}")]
    InvalidSource { message: String },

    /// Schema cannot be inferred: zero records and no explicit field list.
    #[error("missing schema: {message}")]
    MissingSchema { message: String },

    /// Random-access output requested but no spreadsheet engine is available.
    #[error("missing spreadsheet engine: {message}")]
    MissingEngine { message: String },

    /// A cell value that is neither scalar, mapping nor sequence.
    #[error("unsupported value in field '{field}': {message}")]
    UnsupportedValue { field: String, message: String },

    /// Validation errors triggered by invalid configuration.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Text could not be transcoded to the requested charset.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The host stopped the job before it finished.
    #[error("export cancelled after {rows} rows")]
    Cancelled { rows: usize },

    /// Errors originating from the output stream.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapper for serialization issues (JSON and delimited writers).
    #[error("serialization error: {0}")]
    Serde(String),

    /// Errors from the workbook container.
    #[error("zip error: {0}")]
    Zip(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for ZiError {
    fn from(err: io::Error) -> Self {
        ZiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ZiError {
    fn from(err: serde_json::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl From<csv::Error> for ZiError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            ZiError::Io(err.to_string())
        } else {
            ZiError::Serde(err.to_string())
        }
    }
}

#[cfg(feature = "xlsx")]
impl From<zip::result::ZipError> for ZiError {
    fn from(err: zip::result::ZipError) -> Self {
        ZiError::Zip(err.to_string())
    }
}

impl ZiError {
    /// Helper to construct invalid source errors.
    pub fn invalid_source<T: Into<String>>(message: T) -> Self {
        ZiError::InvalidSource {
            message: message.into(),
        }
    }

    /// Helper to construct missing schema errors.
    pub fn missing_schema<T: Into<String>>(message: T) -> Self {
        ZiError::MissingSchema {
            message: message.into(),
        }
    }

    /// Helper to construct missing engine errors.
    pub fn missing_engine<T: Into<String>>(message: T) -> Self {
        ZiError::MissingEngine {
            message: message.into(),
        }
    }

    /// Helper to construct unsupported value errors.
    pub fn unsupported_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::UnsupportedValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        ZiError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct encoding errors.
    pub fn encoding<T: Into<String>>(message: T) -> Self {
        ZiError::Encoding(message.into())
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        ZiError::Internal(message.into())
    }

    /// Everything except unsupported values stops the job.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ZiError::UnsupportedValue { .. })
    }

    /// True for the errors a job can raise before it starts streaming.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ZiError::InvalidSource { .. }
                | ZiError::MissingSchema { .. }
                | ZiError::MissingEngine { .. }
        )
    }
}
