// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reconcile + normalize pipeline over both routes encodings.

use route_calendar::models::RawRoutes;
use route_calendar::services::{ingest_record, reconcile, IngestError, ShapeError};
use serde_json::{json, Value};

fn keyed(value: Value) -> RawRoutes {
    RawRoutes::Keyed(value.as_object().cloned().unwrap())
}

#[test]
fn test_sequence_is_returned_unchanged() {
    let entries = vec![json!({"users": {"A": "2025-12-10"}}), json!(null), json!(3)];
    assert_eq!(
        reconcile(RawRoutes::Sequential(entries.clone())).unwrap(),
        entries
    );
}

#[test]
fn test_keyed_collection_is_ordered_numerically() {
    assert_eq!(
        reconcile(keyed(json!({"2": "c", "0": "a", "1": "b"}))).unwrap(),
        vec![json!("a"), json!("b"), json!("c")]
    );
    assert_eq!(
        reconcile(keyed(json!({"10": "ten", "9": "nine", "1": "one"}))).unwrap(),
        vec![json!("one"), json!("nine"), json!("ten")]
    );
}

#[test]
fn test_non_numeric_key_is_rejected() {
    let err = reconcile(keyed(json!({"0": "a", "first": "b"}))).unwrap_err();
    assert_eq!(err, ShapeError::NonNumericKey("first".to_string()));

    let err = ingest_record(json!({"routes": {"-1": {}}})).unwrap_err();
    assert!(matches!(err, IngestError::Shape(ShapeError::NonNumericKey(_))));
}

#[test]
fn test_keyed_and_sequential_records_agree() {
    let sequential = ingest_record(json!({"routes": [
        {"users": {"Alice": "2025-12-10", "Bob": true}},
        {"users": {"Alice": null}}
    ]}))
    .unwrap();
    let keyed = ingest_record(json!({"routes": {
        "1": {"users": {"Alice": null}},
        "0": {"users": {"Alice": "2025-12-10", "Bob": true}}
    }}))
    .unwrap();

    assert_eq!(sequential, keyed);
    assert_eq!(sequential.routes[0].users["Bob"], None);
}

#[test]
fn test_unusable_records_are_rejected_whole() {
    assert_eq!(
        ingest_record(json!({"routes": []})).unwrap_err(),
        IngestError::Empty
    );
    assert_eq!(
        ingest_record(json!({"users": {}})).unwrap_err(),
        IngestError::MissingRoutes
    );
    assert!(matches!(
        ingest_record(json!("routes")).unwrap_err(),
        IngestError::Malformed(_)
    ));
    assert!(matches!(
        ingest_record(json!({"routes": {}})).unwrap_err(),
        IngestError::Shape(ShapeError::EmptyKeySet)
    ));
}
