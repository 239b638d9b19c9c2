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

use proptest::prelude::*;
use serde_json::json;
use zix_export::schema::ZiSchemaOrigin;
use zix_export::{ZiError, ZiFieldDescriptor, ZiRecord, ZiSchemaResolver, ZiSourceKind, ZiValue};

fn descriptors() -> Vec<ZiFieldDescriptor> {
    vec![
        ZiFieldDescriptor::new("email"),
        ZiFieldDescriptor::new("password").disable_export(),
        ZiFieldDescriptor::new("age").with_exporter(|raw: &ZiValue, _: &ZiRecord| match raw {
            ZiValue::Int(n) => ZiValue::Int(n * 2),
            other => other.clone(),
        }),
    ]
}

#[test]
fn test_first_record_keys_define_schema() {
    let record = ZiRecord::from_json(json!({"b": 1, "a": 2, "c": 3})).unwrap();
    let schema = ZiSchemaResolver::new()
        .resolve(ZiSourceKind::PlainRecords, None, &[], Some(&record))
        .unwrap();
    assert_eq!(schema.names(), vec!["b", "a", "c"]);
    assert_eq!(schema.origin(), ZiSchemaOrigin::FirstRecord);
}

#[test]
fn test_explicit_fields_are_used_verbatim() {
    let explicit = vec!["password".to_string(), "missing".to_string()];
    let schema = ZiSchemaResolver::new()
        .resolve(
            ZiSourceKind::ModelCollection,
            Some(explicit.as_slice()),
            &descriptors(),
            None,
        )
        .unwrap();
    assert_eq!(schema.names(), vec!["password", "missing"]);
    assert_eq!(schema.origin(), ZiSchemaOrigin::Explicit);
}

#[test]
fn test_model_schema_skips_non_exportable_fields() {
    let record = ZiRecord::new().with_field("email", "a@b.c");
    let schema = ZiSchemaResolver::new()
        .resolve(ZiSourceKind::ModelCollection, None, &descriptors(), Some(&record))
        .unwrap();
    assert_eq!(schema.names(), vec!["email", "age"]);
    assert!(schema.fields()[1].exporter().is_some());
}

#[test]
fn test_model_schema_is_idempotent() {
    let resolver = ZiSchemaResolver::new();
    let record = ZiRecord::new();
    let set = descriptors();
    let first = resolver
        .resolve(ZiSourceKind::ModelCollection, None, &set, Some(&record))
        .unwrap();
    let second = resolver
        .resolve(ZiSourceKind::ModelCollection, None, &set, Some(&record))
        .unwrap();
    assert_eq!(first.names(), second.names());
    assert_eq!(first, second);
}

#[test]
fn test_zero_records_without_fields_is_missing_schema() {
    let err = ZiSchemaResolver::new()
        .resolve(ZiSourceKind::PlainRecords, None, &[], None)
        .unwrap_err();
    assert!(matches!(err, ZiError::MissingSchema { .. }));
}

proptest! {
    #[test]
    fn test_schema_follows_first_record_order(keys in prop::collection::hash_set("[a-z]{1,8}", 1..10)) {
        let keys: Vec<String> = keys.into_iter().collect();
        let record: ZiRecord = keys.iter().map(|k| (k.clone(), ZiValue::Int(1))).collect();
        let schema = ZiSchemaResolver::new()
            .resolve(ZiSourceKind::PlainRecords, None, &[], Some(&record))
            .unwrap();
        let names: Vec<String> = schema.names().into_iter().map(str::to_string).collect();
        prop_assert_eq!(names, keys);
    }
}
