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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, ZiError};
use crate::export::delimited::{delimiter_byte, ZiLineEnding};
use crate::export::encoding::ZiEncoding;
use crate::export::sink::ZiSinkKind;

/// Configuration for one export job. Every field is optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiExportConfig {
    /// Explicit field list; resolved from the source when absent.
    pub fields: Option<Vec<String>>,
    /// Download file name; format-specific default when absent.
    pub file_name: Option<String>,
    /// Output charset for delimited text.
    pub encoding: ZiEncoding,
    /// Delimiter override.
    pub delimiter: Option<char>,
    /// Requested output format.
    pub sink_kind: ZiSinkKind,
    /// Pretty-print JSON output.
    pub pretty: bool,
    /// Line terminator for delimited output.
    pub line_ending: ZiLineEnding,
    /// Write to a temp file then rename when exporting to a path.
    pub atomic_write: bool,
}

impl Default for ZiExportConfig {
    fn default() -> Self {
        Self {
            fields: None,
            file_name: None,
            encoding: ZiEncoding::Default,
            delimiter: None,
            sink_kind: ZiSinkKind::Delimited,
            pretty: false,
            line_ending: ZiLineEnding::Lf,
            atomic_write: true,
        }
    }
}

impl ZiExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a configuration object.
    pub fn from_json(value: &Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value.clone())
            .map_err(|err| ZiError::validation(format!("invalid export config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(delimiter) = self.delimiter {
            delimiter_byte(delimiter)?;
        }
        if let Some(fields) = &self.fields {
            if fields.iter().any(|f| f.is_empty()) {
                return Err(ZiError::validation("field names must not be empty"));
            }
        }
        if let ZiEncoding::Custom(label) = &self.encoding {
            if label.trim().is_empty() {
                return Err(ZiError::validation("custom encoding label is empty"));
            }
        }
        Ok(())
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_encoding(mut self, encoding: ZiEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_sink_kind(mut self, sink_kind: ZiSinkKind) -> Self {
        self.sink_kind = sink_kind;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_line_ending(mut self, line_ending: ZiLineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn with_atomic_write(mut self, atomic_write: bool) -> Self {
        self.atomic_write = atomic_write;
        self
    }

    /// `;` when a custom encoding is active, `,` otherwise. An explicit
    /// delimiter always wins.
    pub fn resolved_delimiter(&self) -> Result<u8> {
        match self.delimiter {
            Some(delimiter) => delimiter_byte(delimiter),
            None if self.encoding.is_custom() => Ok(b';'),
            None => Ok(b','),
        }
    }
}
