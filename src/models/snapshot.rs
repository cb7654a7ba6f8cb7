// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Snapshot wire format shared by the local slot and the remote record.
//!
//! A snapshot is always read and written whole:
//!
//! ```json
//! { "routes": [ { "users": { "Alice": "2025-12-10", "Bob": null } } ] }
//! ```
//!
//! The remote store may hand the `routes` sequence back as an object keyed by
//! numeric strings (`{"0": {...}, "1": {...}}`). [`RawRoutes`] keeps both
//! encodings apart until the reconciler collapses them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Per-route assignment mapping: user -> date (`None` = not assigned).
pub type UserDates = BTreeMap<String, Option<String>>;

/// Canonical, sanitized snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub routes: Vec<RouteEntry>,
}

/// One route's assignments, at the same index as the route in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    #[serde(default)]
    pub users: UserDates,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn to_value(&self) -> Value {
        // Only string keys and plain values: serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Untrusted record as received from a store, before reconciliation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub routes: Option<RawRoutes>,
}

/// The two encodings a `routes` collection can arrive in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawRoutes {
    Sequential(Vec<Value>),
    Keyed(Map<String, Value>),
}

impl RawRoutes {
    pub fn len(&self) -> usize {
        match self {
            RawRoutes::Sequential(seq) => seq.len(),
            RawRoutes::Keyed(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_routes_detects_encoding() {
        let seq: RawRecord = serde_json::from_value(json!({"routes": [{"users": {}}]})).unwrap();
        assert!(matches!(seq.routes, Some(RawRoutes::Sequential(ref v)) if v.len() == 1));

        let keyed: RawRecord =
            serde_json::from_value(json!({"routes": {"0": {"users": {}}}})).unwrap();
        assert!(matches!(keyed.routes, Some(RawRoutes::Keyed(ref m)) if m.len() == 1));

        let missing: RawRecord = serde_json::from_value(json!({"other": 1})).unwrap();
        assert!(missing.routes.is_none());
    }

    #[test]
    fn test_scalar_routes_is_rejected() {
        let result: Result<RawRecord, _> = serde_json::from_value(json!({"routes": "oops"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_serializes_nulls() {
        let mut users = UserDates::new();
        users.insert("Alice".to_string(), Some("2025-12-10".to_string()));
        users.insert("Bob".to_string(), None);
        let snapshot = Snapshot {
            routes: vec![RouteEntry { users }],
        };

        assert_eq!(
            snapshot.to_value(),
            json!({"routes": [{"users": {"Alice": "2025-12-10", "Bob": null}}]})
        );
    }
}
