// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Validation pipeline for snapshots arriving from a store.
//!
//! Raw JSON -> [`RawRecord`] -> reconciler -> non-empty check -> normalizer.
//! A payload either comes out as a complete [`Snapshot`] or is rejected as a
//! whole; nothing is partially applied.

use crate::models::{RawRecord, RawRoutes, Snapshot};
use crate::services::normalizer::normalize_entry;
use crate::services::reconciler::{reconcile, ShapeError};
use serde::Serialize;
use serde_json::Value;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Number of keys listed by [`inspect_record`].
const SAMPLE_KEYS: usize = 5;

/// Reasons an incoming payload is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestError {
    #[error("Record is not an object or has a malformed routes field: {0}")]
    Malformed(String),

    #[error("Record has no routes field")]
    MissingRoutes,

    #[error("Routes collection could not be reconciled: {0}")]
    Shape(#[from] ShapeError),

    #[error("Routes collection is empty")]
    Empty,
}

/// Turn an untrusted record into a sanitized snapshot.
pub fn ingest_record(value: Value) -> Result<Snapshot, IngestError> {
    let record: RawRecord =
        serde_json::from_value(value).map_err(|e| IngestError::Malformed(e.to_string()))?;
    let routes = record.routes.ok_or(IngestError::MissingRoutes)?;
    let entries = reconcile(routes)?;
    if entries.is_empty() {
        return Err(IngestError::Empty);
    }

    Ok(Snapshot {
        routes: entries.iter().map(normalize_entry).collect(),
    })
}

/// How the `routes` collection of a record is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum RoutesShape {
    Absent,
    MissingRoutes,
    Sequential,
    Keyed,
    Invalid,
}

/// Diagnostic description of a stored record.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecordShape {
    pub shape: RoutesShape,
    pub entries: usize,
    /// First few keys of a keyed collection
    pub sample_keys: Vec<String>,
    /// Whether [`ingest_record`] would accept the record
    pub accepted: bool,
    pub rejection: Option<String>,
}

/// Describe a record without applying it.
pub fn inspect_record(value: Option<&Value>) -> RecordShape {
    let Some(value) = value else {
        return RecordShape {
            shape: RoutesShape::Absent,
            entries: 0,
            sample_keys: vec![],
            accepted: false,
            rejection: None,
        };
    };

    let (shape, entries, sample_keys) = match serde_json::from_value::<RawRecord>(value.clone()) {
        Err(_) => (RoutesShape::Invalid, 0, vec![]),
        Ok(RawRecord { routes: None }) => (RoutesShape::MissingRoutes, 0, vec![]),
        Ok(RawRecord {
            routes: Some(RawRoutes::Sequential(seq)),
        }) => (RoutesShape::Sequential, seq.len(), vec![]),
        Ok(RawRecord {
            routes: Some(RawRoutes::Keyed(map)),
        }) => (
            RoutesShape::Keyed,
            map.len(),
            map.keys().take(SAMPLE_KEYS).cloned().collect(),
        ),
    };

    let verdict = ingest_record(value.clone());
    RecordShape {
        shape,
        entries,
        sample_keys,
        accepted: verdict.is_ok(),
        rejection: verdict.err().map(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyed_record_is_reconciled_and_normalized() {
        let snapshot = ingest_record(json!({
            "routes": {
                "1": {"users": {"Bob": true}},
                "0": {"users": {"Alice": "2025-12-10"}}
            }
        }))
        .unwrap();

        assert_eq!(snapshot.routes.len(), 2);
        assert_eq!(snapshot.routes[0].users["Alice"].as_deref(), Some("2025-12-10"));
        assert_eq!(snapshot.routes[1].users["Bob"], None);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(ingest_record(json!({})), Err(IngestError::MissingRoutes));
        assert_eq!(ingest_record(json!({"routes": []})), Err(IngestError::Empty));
        assert_eq!(
            ingest_record(json!({"routes": {}})),
            Err(IngestError::Shape(ShapeError::EmptyKeySet))
        );
        assert!(matches!(
            ingest_record(json!({"routes": {"a": {}}})),
            Err(IngestError::Shape(ShapeError::NonNumericKey(_)))
        ));
        assert!(matches!(
            ingest_record(json!({"routes": 7})),
            Err(IngestError::Malformed(_))
        ));
        assert!(matches!(
            ingest_record(json!("routes")),
            Err(IngestError::Malformed(_))
        ));
    }

    #[test]
    fn test_inspect_reports_shape() {
        let absent = inspect_record(None);
        assert_eq!(absent.shape, RoutesShape::Absent);
        assert!(!absent.accepted);

        let keyed = inspect_record(Some(&json!({"routes": {"0": {}, "1": {}}})));
        assert_eq!(keyed.shape, RoutesShape::Keyed);
        assert_eq!(keyed.entries, 2);
        assert_eq!(keyed.sample_keys, vec!["0", "1"]);
        assert!(keyed.accepted);

        let broken = inspect_record(Some(&json!({"routes": {"x": {}}})));
        assert_eq!(broken.shape, RoutesShape::Keyed);
        assert!(!broken.accepted);
        assert!(broken.rejection.is_some());
    }
}
