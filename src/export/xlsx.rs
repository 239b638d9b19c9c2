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

//! # OOXML Workbook Engine
//!
//! Writes a single-sheet `.xlsx` package. Strings are stored inline so no
//! shared-string table is needed; numbers and booleans keep their cell types.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::{Result, ZiError};
use crate::export::delimited::ZiDelimitedOptions;
use crate::export::tabular::{ZiGrid, ZiSpreadsheetEngine};
use crate::transform::ZiCell;

pub const ZI_XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

const SHEET_NAME_FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Renders the grid as a single-sheet workbook named `Export` by default.
#[derive(Clone, Debug)]
pub struct ZiXlsxEngine {
    sheet_name: String,
    creator: String,
}

impl Default for ZiXlsxEngine {
    fn default() -> Self {
        Self {
            sheet_name: "Export".to_string(),
            creator: "Zi".to_string(),
        }
    }
}

impl ZiXlsxEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheet names are limited to 31 characters and may not contain `[]:*?/\`.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty()
            || name.chars().count() > 31
            || name.contains(SHEET_NAME_FORBIDDEN)
        {
            return Err(ZiError::validation(format!("invalid sheet name '{name}'")));
        }
        self.sheet_name = name;
        Ok(self)
    }

    /// Author recorded in the document properties.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    fn workbook_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            escape_xml(&self.sheet_name)
        )
    }

    fn core_xml(&self) -> String {
        let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:creator>{}</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{created}</dcterms:modified></cp:coreProperties>"#,
            escape_xml(&self.creator)
        )
    }
}

impl ZiSpreadsheetEngine for ZiXlsxEngine {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn content_type(&self) -> &'static str {
        ZI_XLSX_CONTENT_TYPE
    }

    fn default_file_name(&self) -> &'static str {
        "export.xlsx"
    }

    fn supports_encoding(&self) -> bool {
        false
    }

    fn render(&self, grid: &ZiGrid, _options: &ZiDelimitedOptions, out: &mut dyn Write) -> Result<()> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", ROOT_RELS.to_string()),
            ("docProps/core.xml", self.core_xml()),
            ("xl/workbook.xml", self.workbook_xml()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
            ("xl/worksheets/sheet1.xml", sheet_xml(grid)),
        ];
        for (name, body) in parts {
            zip.start_file(name, options)?;
            zip.write_all(body.as_bytes())?;
        }

        let cursor = zip.finish()?;
        out.write_all(&cursor.into_inner())?;
        Ok(())
    }
}

fn sheet_xml(grid: &ZiGrid) -> String {
    let width = grid.width();
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    xml.push_str(r#"<row r="1">"#);
    for (pos, name) in grid.header().iter().enumerate() {
        if !name.is_empty() {
            push_cell(&mut xml, &cell_ref(pos, 1), &ZiCell::Text(name.clone()));
        }
    }
    xml.push_str("</row>");

    for (index, _) in grid.rows().iter().enumerate() {
        let line = index + 2;
        let _ = write!(xml, r#"<row r="{line}">"#);
        for pos in 0..width {
            push_cell(&mut xml, &cell_ref(pos, line), grid.cell(index, pos));
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_cell(xml: &mut String, reference: &str, cell: &ZiCell) {
    let _ = match cell {
        ZiCell::Null => Ok(()),
        ZiCell::Bool(b) => write!(xml, r#"<c r="{reference}" t="b"><v>{}</v></c>"#, u8::from(*b)),
        ZiCell::Int(i) => write!(xml, r#"<c r="{reference}"><v>{i}</v></c>"#),
        ZiCell::Float(f) if f.is_finite() => write!(xml, r#"<c r="{reference}"><v>{f}</v></c>"#),
        other => write!(
            xml,
            r#"<c r="{reference}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            escape_xml(&other.to_string())
        ),
    };
}

fn cell_ref(position: usize, line: usize) -> String {
    format!("{}{line}", column_letters(position))
}

/// Zero-based column index to spreadsheet letters: 0 is `A`, 26 is `AA`.
pub fn column_letters(position: usize) -> String {
    let mut n = position + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\t' | '\n' | '\r' => escaped.push(ch),
            // not representable in XML 1.0
            c if (c as u32) < 0x20 => {}
            c => escaped.push(c),
        }
    }
    escaped
}
