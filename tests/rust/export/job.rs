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

use std::sync::{Arc, Mutex};

use serde_json::json;
use zix_export::export::ZiJobState;
use zix_export::{
    ZiCancellation, ZiError, ZiErrorReporter, ZiExportConfig, ZiExportContext, ZiExportJob,
    ZiRecord, ZiRecordSource, ZiValue,
};

#[derive(Default)]
struct Collector(Mutex<Vec<(String, bool)>>);

impl ZiErrorReporter for Collector {
    fn report(&self, message: &str, is_fatal: bool) {
        self.0.lock().unwrap().push((message.to_string(), is_fatal));
    }
}

fn numbered(count: i64) -> Vec<ZiRecord> {
    (0..count).map(|i| ZiRecord::new().with_field("n", i)).collect()
}

#[test]
fn test_job_finishes_with_row_count() {
    let mut job = ZiExportJob::new(ZiExportConfig::new());
    assert_eq!(job.state(), ZiJobState::Created);

    let mut out = Vec::new();
    let outcome = job.run(ZiRecordSource::records(numbered(3)), &mut out).unwrap();
    assert_eq!(outcome.rows, 3);
    assert_eq!(job.state(), ZiJobState::Finished(3));
    assert!(job.state().is_terminal());
    assert_eq!(outcome.headers.file_name, "export.csv");
    assert_eq!(outcome.headers.content_type, "text/csv; charset=UTF-8");
}

#[test]
fn test_job_runs_only_once() {
    let mut job = ZiExportJob::new(ZiExportConfig::new());
    job.run(ZiRecordSource::records(numbered(1)), Vec::new()).unwrap();
    let err = job
        .run(ZiRecordSource::records(numbered(1)), Vec::new())
        .unwrap_err();
    assert!(matches!(err, ZiError::Validation { .. }));
    assert_eq!(job.state(), ZiJobState::Finished(1));
}

#[test]
fn test_structural_failure_is_reported_as_fatal() {
    let reporter = Arc::new(Collector::default());
    let mut job = ZiExportJob::new(ZiExportConfig::new())
        .with_context(ZiExportContext::new().with_reporter(reporter.clone()));

    let mut out = Vec::new();
    let err = job
        .run(ZiRecordSource::records(Vec::new()), &mut out)
        .unwrap_err();
    assert!(err.is_fatal());
    assert!(out.is_empty());
    assert_eq!(job.state(), ZiJobState::Failed);

    let reports = reporter.0.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].0.contains("missing schema"));
    assert!(reports[0].1);
}

#[test]
fn test_unsupported_values_are_coerced_and_reported() {
    let reporter = Arc::new(Collector::default());
    let record = ZiRecord::new()
        .with_field("id", 1i64)
        .with_field("when", ZiValue::opaque("DateTime", "2024-05-01T10:00:00Z"));

    let mut out = Vec::new();
    let mut job = ZiExportJob::new(ZiExportConfig::new())
        .with_context(ZiExportContext::new().with_reporter(reporter.clone()));
    job.run(ZiRecordSource::records(vec![record]), &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "id,when\n1,2024-05-01T10:00:00Z\n"
    );
    assert_eq!(job.state(), ZiJobState::Finished(1));
    let reports = reporter.0.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].0.contains("when"));
    assert!(!reports[0].1);
}

#[test]
fn test_cancelled_before_start() {
    let token = ZiCancellation::new();
    token.cancel();
    let mut job = ZiExportJob::new(ZiExportConfig::new())
        .with_context(ZiExportContext::new().with_cancellation(token));

    let err = job
        .run(ZiRecordSource::records(numbered(2)), Vec::new())
        .unwrap_err();
    assert_eq!(err, ZiError::Cancelled { rows: 0 });
    assert_eq!(job.state(), ZiJobState::Failed);
}

#[test]
fn test_cancelled_mid_stream_stops_pulling() {
    let token = ZiCancellation::new();
    let trigger = token.clone();
    let pulled = Arc::new(Mutex::new(0));
    let counter = pulled.clone();
    let records = (0..10).map(move |i| {
        *counter.lock().unwrap() += 1;
        if i == 2 {
            trigger.cancel();
        }
        Ok(ZiRecord::new().with_field("n", i as i64))
    });

    let mut job = ZiExportJob::new(ZiExportConfig::new().with_sink_kind(zix_export::ZiSinkKind::Json))
        .with_context(ZiExportContext::new().with_cancellation(token));
    let mut out = Vec::new();
    let err = job
        .run(ZiRecordSource::try_records(records), &mut out)
        .unwrap_err();

    assert_eq!(err, ZiError::Cancelled { rows: 3 });
    assert_eq!(*pulled.lock().unwrap(), 3);
    // finish() never ran, so the JSON sink wrote nothing
    assert!(out.is_empty());
}

#[test]
fn test_failed_row_moves_job_to_failed() {
    let records = vec![
        Ok(ZiRecord::new().with_field("n", 1i64)),
        Err(ZiError::invalid_source("cursor closed")),
    ];
    let mut job = ZiExportJob::new(ZiExportConfig::new());
    let err = job
        .run(ZiRecordSource::try_records(records), Vec::new())
        .unwrap_err();
    assert!(matches!(err, ZiError::InvalidSource { .. }));
    assert_eq!(job.state(), ZiJobState::Failed);
}

#[test]
fn test_run_to_path_is_atomic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let mut job = ZiExportJob::new(ZiExportConfig::new());
    job.run_to_path(ZiRecordSource::records(numbered(2)), &path)
        .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "n\n0\n1\n");
    assert!(!dir.path().join(".out.csv.tmp").exists());
}

#[test]
fn test_failed_run_to_path_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");

    let mut job = ZiExportJob::new(ZiExportConfig::new());
    assert!(job
        .run_to_path(ZiRecordSource::from_json(json!([])).unwrap(), &path)
        .is_err());
    assert!(!path.exists());
    assert!(!dir.path().join(".empty.csv.tmp").exists());
}

#[test]
fn test_config_from_json_drives_job() {
    let config = ZiExportConfig::from_json(&json!({
        "fields": ["b"],
        "delimiter": "|",
        "file_name": "b.csv"
    }))
    .unwrap();
    let mut out = Vec::new();
    let outcome = zix_export::export(
        ZiRecordSource::from_json(json!([{"a": 1, "b": {"x": 1, "y": 2}}])).unwrap(),
        config,
        &mut out,
    )
    .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "b_x|b_y\n1|2\n");
    assert_eq!(outcome.headers.file_name, "b.csv");
}
