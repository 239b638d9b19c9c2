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

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;
use zix_export::export::{ZiGridCsvEngine, ZiJobState};
use zix_export::{
    ZiEncoding, ZiError, ZiExportConfig, ZiExportContext, ZiExportJob, ZiFieldDescriptor,
    ZiModel, ZiModelLoader, ZiRecordSource, ZiSinkKind, ZiValue,
};

fn tabular_config() -> ZiExportConfig {
    ZiExportConfig::new().with_sink_kind(ZiSinkKind::TabularBinary)
}

fn grow_source() -> ZiRecordSource<'static> {
    ZiRecordSource::from_json(json!([{"a": 1}, {"a": 1, "b": 2}])).unwrap()
}

struct SharedLoader(Arc<AtomicBool>);

impl ZiModelLoader for SharedLoader {
    fn lazy_loading(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn set_lazy_loading(&self, enabled: bool) {
        self.0.store(enabled, Ordering::SeqCst);
    }
}

/// Records whether lazy loading was on when its field was read.
struct Probe(Arc<AtomicBool>);

impl ZiModel for Probe {
    fn display_name(&self) -> String {
        "probe".to_string()
    }

    fn field_value(&self, _field: &str) -> ZiValue {
        ZiValue::Bool(self.0.load(Ordering::SeqCst))
    }
}

#[test]
fn test_grid_backfills_late_header() {
    let mut out = Vec::new();
    let outcome = ZiExportJob::new(tabular_config())
        .with_engine(Arc::new(ZiGridCsvEngine::new()))
        .run(grow_source(), &mut out)
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "a,b\r\n1,\r\n1,2\r\n");
    assert_eq!(outcome.sink_kind, ZiSinkKind::TabularBinary);
    assert_eq!(outcome.headers.cache_control.as_deref(), Some("max-age=0"));
    assert_eq!(outcome.columns.len(), 2);
}

#[test]
fn test_grid_engine_honours_encoding() {
    let mut out = Vec::new();
    ZiExportJob::new(tabular_config().with_encoding(ZiEncoding::Custom("windows-1250".into())))
        .with_engine(Arc::new(ZiGridCsvEngine::new()))
        .run(ZiRecordSource::from_json(json!([{"w": "ő"}])).unwrap(), &mut out)
        .unwrap();
    assert_eq!(out, b"w\r\n\xF5\r\n".to_vec());
}

#[test]
fn test_missing_engine_falls_back_to_delimited() {
    let mut out = Vec::new();
    let mut job = ZiExportJob::new(tabular_config()).without_engine();
    let outcome = job.run(grow_source(), &mut out).unwrap();
    assert_eq!(outcome.sink_kind, ZiSinkKind::Delimited);
    assert_eq!(String::from_utf8(out).unwrap(), "a\n1\n1,2\n");
    assert_eq!(job.state(), ZiJobState::Finished(2));
}

#[test]
fn test_missing_engine_with_encoding_fails_before_output() {
    let mut out = Vec::new();
    let mut job = ZiExportJob::new(tabular_config().with_encoding(ZiEncoding::Excel)).without_engine();
    let err = job.run(grow_source(), &mut out).unwrap_err();
    assert!(matches!(err, ZiError::MissingEngine { .. }));
    assert!(out.is_empty());
    assert_eq!(job.state(), ZiJobState::Failed);
}

#[test]
fn test_lazy_loading_is_suspended_while_streaming() {
    let flag = Arc::new(AtomicBool::new(true));
    let context = ZiExportContext::new().with_loader(Arc::new(SharedLoader(flag.clone())));
    let source = ZiRecordSource::models(
        vec![ZiFieldDescriptor::new("lazy")],
        vec![Probe(flag.clone()), Probe(flag.clone())],
    );

    let mut out = Vec::new();
    ZiExportJob::new(tabular_config())
        .with_engine(Arc::new(ZiGridCsvEngine::new()))
        .with_context(context)
        .run(source, &mut out)
        .unwrap();

    // The first model is read while resolving the schema, before the sink exists.
    assert_eq!(String::from_utf8(out).unwrap(), "name,lazy\r\nprobe,true\r\nprobe,false\r\n");
    assert!(flag.load(Ordering::SeqCst));
}

#[test]
fn test_lazy_loading_restored_after_failure() {
    let flag = Arc::new(AtomicBool::new(true));
    let context = ZiExportContext::new().with_loader(Arc::new(SharedLoader(flag.clone())));
    let source = ZiRecordSource::tabular(
        vec!["a".to_string()],
        vec![vec![ZiValue::Int(1)], vec![ZiValue::Int(1), ZiValue::Int(2)]],
    );

    let result = ZiExportJob::new(tabular_config())
        .with_engine(Arc::new(ZiGridCsvEngine::new()))
        .with_context(context)
        .run(source, Vec::new());
    assert!(matches!(result, Err(ZiError::InvalidSource { .. })));
    assert!(flag.load(Ordering::SeqCst));
}

#[cfg(feature = "xlsx")]
mod xlsx {
    use super::*;
    use std::io::{Cursor, Read};
    use zix_export::export::ZiXlsxEngine;

    fn sheet(bytes: Vec<u8>) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_workbook_backfills_header() {
        let mut out = Vec::new();
        let outcome = ZiExportJob::new(tabular_config())
            .with_engine(Arc::new(ZiXlsxEngine::new()))
            .run(grow_source(), &mut out)
            .unwrap();

        let xml = sheet(out);
        assert!(xml.contains(r#"<c r="B1" t="inlineStr"><is><t xml:space="preserve">b</t></is></c>"#));
        assert!(xml.contains(r#"<c r="B3"><v>2</v></c>"#));
        assert!(!xml.contains(r#"r="B2""#));
        assert_eq!(outcome.headers.file_name, "export.xlsx");
        assert_eq!(
            outcome.headers.content_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }

    #[test]
    fn test_default_job_uses_workbook_engine() {
        let job = ZiExportJob::new(tabular_config().with_file_name("people.xlsx"));
        let plan = job.plan().unwrap();
        assert_eq!(plan.engine().map(|e| e.name()), Some("xlsx"));
        assert_eq!(plan.headers.file_name, "people.xlsx");
    }

    #[test]
    fn test_workbook_with_encoding_downgrades_to_text() {
        let mut out = Vec::new();
        let outcome = ZiExportJob::new(tabular_config().with_encoding(ZiEncoding::Excel))
            .run(grow_source(), &mut out)
            .unwrap();

        assert_eq!(outcome.sink_kind, ZiSinkKind::Delimited);
        assert_eq!(
            outcome.headers.content_type,
            "application/vnd.ms-excel; charset=UTF-16LE"
        );
        assert_eq!(outcome.headers.file_name, "export.csv");

        let mut expected: Vec<u8> = "a".encode_utf16().flat_map(u16::to_le_bytes).collect();
        expected.extend(b"\n1\n1;2\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_workbook_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.xlsx");
        let outcome = ZiExportJob::new(tabular_config())
            .run_to_path(grow_source(), &path)
            .unwrap();
        assert_eq!(outcome.rows, 2);

        let bytes = std::fs::read(&path).unwrap();
        assert!(sheet(bytes).contains(r#"<c r="A2"><v>1</v></c>"#));
        assert!(!dir.path().join(".grid.xlsx.tmp").exists());
    }
}
