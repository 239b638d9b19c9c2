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

use std::io::{BufWriter, Write};

use crate::errors::Result;
use crate::export::columns::ZiColumn;
use crate::export::sink::{ZiRow, ZiSink, ZiSinkKind};
use crate::record::ZiRecordBatch;

pub const ZI_JSON_CONTENT_TYPE: &str = "application/json";

/// Buffers every transformed record and writes one JSON array on finish.
pub struct ZiJsonSink<W: Write> {
    writer: BufWriter<W>,
    records: ZiRecordBatch,
    pretty: bool,
}

impl<W: Write> ZiJsonSink<W> {
    /// `pretty` selects indented output.
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer: BufWriter::new(writer),
            records: Vec::new(),
            pretty,
        }
    }
}

impl<W: Write> ZiSink for ZiJsonSink<W> {
    fn kind(&self) -> ZiSinkKind {
        ZiSinkKind::Json
    }

    fn tracks_columns(&self) -> bool {
        false
    }

    fn write_header(&mut self, _columns: &[ZiColumn]) -> Result<()> {
        Ok(())
    }

    fn write_row(&mut self, row: &ZiRow) -> Result<()> {
        self.records.push(row.record.clone());
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<usize> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &self.records)?;
        } else {
            serde_json::to_writer(&mut self.writer, &self.records)?;
        }
        self.writer.flush()?;
        Ok(self.records.len())
    }
}
