// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Restores sequence order for collections stored as keyed objects.
//!
//! The realtime store keeps arrays as maps keyed by numeric strings and may
//! return them that way. This is the only place that collapses
//! [`RawRoutes`] back into a plain sequence.

use crate::models::RawRoutes;
use serde_json::Value;

/// Errors from shape reconciliation.
///
/// The caller must discard the whole payload and keep its last-known-good
/// state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("Keyed collection has no entries")]
    EmptyKeySet,

    #[error("Keyed collection has a non-numeric key: {0:?}")]
    NonNumericKey(String),
}

/// Convert either encoding into an ordered sequence.
///
/// Sequences pass through unchanged. Keyed objects must have only `^\d+$`
/// keys; values are emitted in ascending numeric key order.
pub fn reconcile(routes: RawRoutes) -> Result<Vec<Value>, ShapeError> {
    let map = match routes {
        RawRoutes::Sequential(seq) => return Ok(seq),
        RawRoutes::Keyed(map) => map,
    };

    if map.is_empty() {
        return Err(ShapeError::EmptyKeySet);
    }

    let mut keyed = Vec::with_capacity(map.len());
    for (key, value) in map {
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
            tracing::warn!(key = %key, "Keyed collection has non-numeric key");
            return Err(ShapeError::NonNumericKey(key));
        }
        keyed.push((key, value));
    }

    // Numeric order without parsing, so arbitrarily long keys cannot overflow:
    // strip leading zeros, then shorter is smaller, then compare digits.
    keyed.sort_by(|(a, _), (b, _)| {
        let a = a.trim_start_matches('0');
        let b = b.trim_start_matches('0');
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    });

    tracing::debug!(entries = keyed.len(), "Converted keyed collection to sequence");
    Ok(keyed.into_iter().map(|(_, value)| value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn keyed(value: Value) -> RawRoutes {
        RawRoutes::Keyed(value.as_object().cloned().unwrap_or_else(Map::new))
    }

    #[test]
    fn test_sequence_is_identity() {
        let seq = vec![json!("b"), json!(null), json!({"users": {}})];
        assert_eq!(reconcile(RawRoutes::Sequential(seq.clone())), Ok(seq));
        assert_eq!(reconcile(RawRoutes::Sequential(vec![])), Ok(vec![]));
    }

    #[test]
    fn test_keyed_sorted_numerically() {
        let result = reconcile(keyed(json!({"2": "c", "0": "a", "1": "b"})));
        assert_eq!(result, Ok(vec![json!("a"), json!("b"), json!("c")]));
    }

    #[test]
    fn test_keyed_numeric_not_lexical() {
        let result = reconcile(keyed(json!({"10": "k", "9": "j", "1": "b"})));
        assert_eq!(result, Ok(vec![json!("b"), json!("j"), json!("k")]));
    }

    #[test]
    fn test_keyed_with_gaps_keeps_order() {
        let result = reconcile(keyed(json!({"5": "f", "0": "a"})));
        assert_eq!(result, Ok(vec![json!("a"), json!("f")]));
    }

    #[test]
    fn test_non_numeric_key_fails() {
        let result = reconcile(keyed(json!({"0": "a", "routes": "x"})));
        assert_eq!(result, Err(ShapeError::NonNumericKey("routes".to_string())));

        let result = reconcile(keyed(json!({"-1": "a"})));
        assert!(matches!(result, Err(ShapeError::NonNumericKey(_))));

        let result = reconcile(keyed(json!({"1.5": "a"})));
        assert!(matches!(result, Err(ShapeError::NonNumericKey(_))));
    }

    #[test]
    fn test_empty_keyed_fails() {
        assert_eq!(reconcile(keyed(json!({}))), Err(ShapeError::EmptyKeySet));
    }
}
