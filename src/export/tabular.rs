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

//! # Tabular Binary Sink
//!
//! Random-access output backed by an in-memory grid. When a row introduces a
//! column after the header was written, the sink fills in that column's
//! header cell before writing the data cell; earlier rows simply stay blank
//! in that column. The grid is rendered by a [`ZiSpreadsheetEngine`] when the
//! job finishes.
//!
//! ## Engines
//!
//! - **ZiXlsxEngine** (feature `xlsx`): OOXML workbook
//! - **ZiGridCsvEngine**: the reconciled grid as CRLF-terminated delimited text

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::errors::Result;
use crate::export::columns::ZiColumn;
use crate::export::delimited::{ZiDelimitedOptions, ZiLineEnding};
use crate::export::sink::{ZiRow, ZiSink, ZiSinkKind};
use crate::transform::ZiCell;

/// Header row plus data rows, addressed by column position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZiGrid {
    header: Vec<String>,
    rows: Vec<Vec<ZiCell>>,
}

impl ZiGrid {
    /// Creates an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a header cell, widening the header row as needed. Backfilling a
    /// late column goes through here too.
    pub fn set_header(&mut self, position: usize, name: &str) {
        if self.header.len() <= position {
            self.header.resize(position + 1, String::new());
        }
        self.header[position] = name.to_string();
    }

    /// Appends an empty data row and returns its index.
    pub fn push_row(&mut self) -> usize {
        self.rows.push(Vec::new());
        self.rows.len() - 1
    }

    /// Writes one data cell. Missing rows and cells in between are created
    /// as blanks.
    pub fn set(&mut self, row: usize, position: usize, cell: ZiCell) {
        if self.rows.len() <= row {
            self.rows.resize(row + 1, Vec::new());
        }
        let cells = &mut self.rows[row];
        if cells.len() <= position {
            cells.resize(position + 1, ZiCell::Null);
        }
        cells[position] = cell;
    }

    /// Header cells by position; unnamed positions are empty strings.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<ZiCell>] {
        &self.rows
    }

    /// Cell at `row` and `position`, or `ZiCell::Null` outside the written area.
    pub fn cell(&self, row: usize, position: usize) -> &ZiCell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(position))
            .unwrap_or(&ZiCell::Null)
    }

    /// Number of columns spanned by the header or any row.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Capability that renders a finished grid into a byte stream.
///
/// Checked once when the job builds its sink; without one the job falls back
/// to delimited text.
pub trait ZiSpreadsheetEngine: fmt::Debug + Send + Sync {
    /// Short identifier used in log lines.
    fn name(&self) -> &'static str;

    /// MIME type of the rendered output, without a charset parameter.
    fn content_type(&self) -> &'static str;

    /// File name used when the config does not give one.
    fn default_file_name(&self) -> &'static str;

    /// Whether the output can carry a transcoded charset. Engines that cannot
    /// are skipped in favour of delimited text when an encoding is requested.
    fn supports_encoding(&self) -> bool;

    /// Serializes the whole grid. Called once, from the sink's `finish`.
    fn render(&self, grid: &ZiGrid, options: &ZiDelimitedOptions, out: &mut dyn Write) -> Result<()>;
}

/// The engine available in this build, if any.
pub fn default_engine() -> Option<Arc<dyn ZiSpreadsheetEngine>> {
    #[cfg(feature = "xlsx")]
    {
        Some(Arc::new(crate::export::xlsx::ZiXlsxEngine::new()))
    }
    #[cfg(not(feature = "xlsx"))]
    {
        None
    }
}

/// Renders the grid as delimited text with CRLF line endings.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZiGridCsvEngine;

impl ZiGridCsvEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ZiSpreadsheetEngine for ZiGridCsvEngine {
    fn name(&self) -> &'static str {
        "grid-csv"
    }

    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn default_file_name(&self) -> &'static str {
        "export.csv"
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn render(&self, grid: &ZiGrid, options: &ZiDelimitedOptions, out: &mut dyn Write) -> Result<()> {
        let options = ZiDelimitedOptions {
            line_ending: ZiLineEnding::Crlf,
            ..options.clone()
        };
        let width = grid.width();
        let mut writer = options.writer(out);

        let header: Vec<Vec<u8>> = (0..width)
            .map(|pos| {
                grid.header()
                    .get(pos)
                    .map(|name| options.encode_text(name))
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&header)?;

        for row in 0..grid.rows().len() {
            let fields: Vec<Vec<u8>> = (0..width)
                .map(|pos| options.encode_cell(grid.cell(row, pos)))
                .collect();
            writer.write_record(&fields)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Random-access sink: cells go into a [`ZiGrid`] and the engine renders it on
/// `finish`, so nothing reaches `out` before then.
pub struct ZiTabularSink<W: Write> {
    out: W,
    engine: Arc<dyn ZiSpreadsheetEngine>,
    options: ZiDelimitedOptions,
    grid: ZiGrid,
    header_written: bool,
}

impl<W: Write> ZiTabularSink<W> {
    pub fn new(out: W, engine: Arc<dyn ZiSpreadsheetEngine>, options: ZiDelimitedOptions) -> Self {
        Self {
            out,
            engine,
            options,
            grid: ZiGrid::new(),
            header_written: false,
        }
    }

    /// The grid filled so far.
    pub fn grid(&self) -> &ZiGrid {
        &self.grid
    }
}

impl<W: Write> ZiSink for ZiTabularSink<W> {
    fn kind(&self) -> ZiSinkKind {
        ZiSinkKind::TabularBinary
    }

    fn is_random_access(&self) -> bool {
        true
    }

    fn write_header(&mut self, columns: &[ZiColumn]) -> Result<()> {
        for column in columns {
            self.grid.set_header(column.position, &column.name);
        }
        self.header_written = true;
        Ok(())
    }

    fn write_row(&mut self, row: &ZiRow) -> Result<()> {
        let index = self.grid.push_row();
        for placed in &row.cells {
            if placed.discovered && self.header_written {
                log::debug!(
                    "backfilling header cell {} with late column '{}'",
                    placed.column.position,
                    placed.column.name
                );
                self.grid
                    .set_header(placed.column.position, &placed.column.name);
            }
            self.grid
                .set(index, placed.column.position, placed.cell.clone());
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<usize> {
        log::debug!(
            "rendering {}x{} grid with {} engine",
            self.grid.rows().len(),
            self.grid.width(),
            self.engine.name()
        );
        self.engine
            .render(&self.grid, &self.options, &mut self.out)?;
        self.out.flush()?;
        Ok(self.grid.rows().len())
    }
}
