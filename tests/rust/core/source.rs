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

use serde_json::json;
use zix_export::ingest::{normalize, ZiRecordSource, ZiSourceKind};
use zix_export::{ZiError, ZiFieldDescriptor, ZiModel, ZiRecord, ZiValue};

struct City {
    title: String,
    population: i64,
}

impl ZiModel for City {
    fn display_name(&self) -> String {
        self.title.clone()
    }

    fn field_value(&self, field: &str) -> ZiValue {
        match field {
            "population" => self.population.into(),
            _ => ZiValue::Null,
        }
    }
}

#[test]
fn test_json_array_keeps_source_order() {
    let source = ZiRecordSource::from_json(json!([{"id": 1}, {"id": 2}, {"id": 3}])).unwrap();
    assert_eq!(source.kind(), ZiSourceKind::PlainRecords);

    let ids: Vec<ZiValue> = normalize(source)
        .unwrap()
        .map(|r| r.unwrap().get("id").cloned().unwrap())
        .collect();
    assert_eq!(ids, vec![ZiValue::Int(1), ZiValue::Int(2), ZiValue::Int(3)]);
}

#[test]
fn test_single_object_is_one_record() {
    let source = ZiRecordSource::from_json(json!({"a": 1, "b": "x"})).unwrap();
    let records: Vec<ZiRecord> = normalize(source).unwrap().map(Result::unwrap).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].keys().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_scalar_input_is_invalid() {
    let err = ZiRecordSource::from_json(json!(42)).unwrap_err();
    assert!(matches!(err, ZiError::InvalidSource { .. }));

    let err = ZiRecordSource::from_json(json!(["a", "b"])).unwrap_err();
    assert!(matches!(err, ZiError::InvalidSource { .. }));
}

#[test]
fn test_every_array_item_is_checked() {
    let err = ZiRecordSource::from_json(json!([{"a": 1}, {"a": 2}, null])).unwrap_err();
    assert!(matches!(err, ZiError::InvalidSource { .. }));
    assert!(err.to_string().contains("item 2 is null"));
}

#[test]
fn test_first_record_is_not_consumed() {
    let source = ZiRecordSource::from_json(json!([{"n": 1}, {"n": 2}])).unwrap();
    let mut records = normalize(source).unwrap();
    let first = records.first_record().unwrap().cloned().unwrap();
    assert_eq!(first.get("n"), Some(&ZiValue::Int(1)));
    assert_eq!(records.count(), 2);
}

#[test]
fn test_tabular_rows_become_records() {
    let source = ZiRecordSource::tabular(
        vec!["id".to_string(), "city".to_string()],
        vec![
            vec![ZiValue::Int(1), ZiValue::from("Oslo")],
            vec![ZiValue::Int(2), ZiValue::from("Rome")],
        ],
    );
    let records: Vec<ZiRecord> = normalize(source).unwrap().map(Result::unwrap).collect();
    assert_eq!(records[1].get("city").and_then(ZiValue::as_str), Some("Rome"));
    assert_eq!(records[0].keys().collect::<Vec<_>>(), vec!["id", "city"]);
}

#[test]
fn test_tabular_shape_errors() {
    let empty = ZiRecordSource::tabular(Vec::new(), Vec::<Vec<ZiValue>>::new());
    assert!(matches!(normalize(empty), Err(ZiError::InvalidSource { .. })));

    let duplicated = ZiRecordSource::tabular(
        vec!["a".to_string(), "a".to_string()],
        Vec::<Vec<ZiValue>>::new(),
    );
    assert!(matches!(normalize(duplicated), Err(ZiError::InvalidSource { .. })));

    let ragged = ZiRecordSource::tabular(
        vec!["a".to_string(), "b".to_string()],
        vec![vec![ZiValue::Int(1), ZiValue::Int(2)], vec![ZiValue::Int(3)]],
    );
    let results: Vec<_> = normalize(ragged).unwrap().collect();
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(ZiError::InvalidSource { .. })));
}

#[test]
fn test_models_read_declared_fields() {
    let cities = vec![City {
        title: "Lyon".to_string(),
        population: 520_000,
    }];
    let source = ZiRecordSource::models(vec![ZiFieldDescriptor::new("population")], cities);
    assert!(source.kind().is_model_backed());

    let mut records = normalize(source).unwrap();
    assert_eq!(records.descriptors().len(), 1);
    let record = records.next().unwrap().unwrap();
    assert_eq!(record.display_name(), Some("Lyon"));
    assert_eq!(record.get("population"), Some(&ZiValue::Int(520_000)));
}

#[test]
fn test_models_without_descriptors_are_invalid() {
    let source = ZiRecordSource::models(Vec::new(), Vec::<City>::new());
    assert!(matches!(normalize(source), Err(ZiError::InvalidSource { .. })));
}
