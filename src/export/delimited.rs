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

//! # Delimited Text Sink
//!
//! Append-only, row-at-a-time output. The header line is written once from
//! the columns known after the first record. Columns discovered later are
//! appended to the rows that carry them, but the header already written is
//! never revisited, so late columns appear as unheaded trailing values.

use std::io::Write;

use csv::{ByteRecord, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::export::columns::ZiColumn;
use crate::export::encoding::ZiEncodingConverter;
use crate::export::sink::{ZiRow, ZiSink, ZiSinkKind};
use crate::transform::ZiCell;

/// Line terminator for delimited output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiLineEnding {
    #[default]
    Lf,
    Crlf,
}

impl ZiLineEnding {
    pub(crate) fn terminator(self) -> Terminator {
        match self {
            ZiLineEnding::Lf => Terminator::Any(b'\n'),
            ZiLineEnding::Crlf => Terminator::CRLF,
        }
    }
}

/// Options shared by every writer of delimited text.
#[derive(Clone, Debug)]
pub struct ZiDelimitedOptions {
    pub delimiter: u8,
    pub line_ending: ZiLineEnding,
    /// Charset for text cells and header names; `None` writes UTF-8.
    pub converter: Option<ZiEncodingConverter>,
}

impl Default for ZiDelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            line_ending: ZiLineEnding::Lf,
            converter: None,
        }
    }
}

impl ZiDelimitedOptions {
    /// Bytes for a header name or text cell, transcoded when configured.
    pub fn encode_text(&self, text: &str) -> Vec<u8> {
        match &self.converter {
            Some(converter) => converter.convert(text),
            None => text.as_bytes().to_vec(),
        }
    }

    /// Bytes for a cell. Only text cells are transcoded.
    pub fn encode_cell(&self, cell: &ZiCell) -> Vec<u8> {
        match cell {
            ZiCell::Text(s) => self.encode_text(s),
            other => other.to_string().into_bytes(),
        }
    }

    pub(crate) fn writer<W: Write>(&self, out: W) -> csv::Writer<W> {
        WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(self.line_ending.terminator())
            .flexible(true)
            .from_writer(out)
    }
}

/// Checks that a delimiter can be written as a single byte.
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
        return Err(ZiError::validation(format!(
            "delimiter {delimiter:?} must be a single ASCII character other than quote or newline"
        )));
    }
    Ok(delimiter as u8)
}

/// Append-only sink. The header is written once and never revised, so a
/// column first seen later shows up as a trailing unheaded value.
pub struct ZiDelimitedSink<W: Write> {
    writer: csv::Writer<W>,
    options: ZiDelimitedOptions,
    width: usize,
    rows: usize,
}

impl<W: Write> ZiDelimitedSink<W> {
    pub fn new(out: W, options: ZiDelimitedOptions) -> Self {
        Self {
            writer: options.writer(out),
            options,
            width: 0,
            rows: 0,
        }
    }
}

impl<W: Write> ZiSink for ZiDelimitedSink<W> {
    fn kind(&self) -> ZiSinkKind {
        ZiSinkKind::Delimited
    }

    fn write_header(&mut self, columns: &[ZiColumn]) -> Result<()> {
        let record: ByteRecord = columns
            .iter()
            .map(|c| self.options.encode_text(&c.name))
            .collect();
        self.writer.write_byte_record(&record)?;
        self.width = columns.len();
        Ok(())
    }

    fn write_row(&mut self, row: &ZiRow) -> Result<()> {
        let needed = row
            .cells
            .iter()
            .map(|c| c.column.position + 1)
            .max()
            .unwrap_or(0);
        self.width = self.width.max(needed);

        let mut fields: Vec<Vec<u8>> = vec![Vec::new(); self.width];
        for placed in &row.cells {
            fields[placed.column.position] = self.options.encode_cell(&placed.cell);
        }
        self.writer.write_record(&fields)?;
        self.rows += 1;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.rows)
    }
}
