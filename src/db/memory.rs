// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process remote store with broadcast fan-out.
//!
//! Behaves like the realtime store: every write, including the subscriber's
//! own, is delivered to every subscriber. Clones share the same record, so a
//! clone handed to a second engine acts as another client. Failure injection
//! makes transport errors reproducible in tests.

use crate::db::remote::{ChangeStream, RemoteTransportError};
use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

const CHANGE_BUFFER: usize = 64;

#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    value: Mutex<Option<Value>>,
    /// Replaced to end every open subscription
    changes: Mutex<broadcast::Sender<Option<Value>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_subscribe: AtomicBool,
    writes: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            inner: Arc::new(Inner {
                value: Mutex::new(None),
                changes: Mutex::new(changes),
                fail_reads: AtomicBool::new(false),
                fail_writes: AtomicBool::new(false),
                fail_subscribe: AtomicBool::new(false),
                writes: AtomicU64::new(0),
            }),
        }
    }

    /// Store seeded with an initial record (no notification is sent).
    pub fn with_value(value: Value) -> Self {
        let store = Self::new();
        *store.value() = Some(value);
        store
    }

    fn value(&self) -> MutexGuard<'_, Option<Value>> {
        self.inner
            .value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn changes(&self) -> MutexGuard<'_, broadcast::Sender<Option<Value>>> {
        self.inner
            .changes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn fetch(&self) -> Result<Option<Value>, RemoteTransportError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(RemoteTransportError::Unavailable(
                "injected read failure".to_string(),
            ));
        }
        Ok(self.value().clone())
    }

    pub fn put(&self, value: &Value) -> Result<(), RemoteTransportError> {
        self.write(Some(value.clone()))
    }

    pub fn remove(&self) -> Result<(), RemoteTransportError> {
        self.write(None)
    }

    fn write(&self, value: Option<Value>) -> Result<(), RemoteTransportError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteTransportError::Unavailable(
                "injected write failure".to_string(),
            ));
        }
        let mut current = self.value();
        *current = value.clone();
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        // No subscribers is fine
        let _ = self.changes().send(value);
        Ok(())
    }

    pub fn subscribe(&self) -> Result<ChangeStream, RemoteTransportError> {
        if self.inner.fail_subscribe.load(Ordering::SeqCst) {
            return Err(RemoteTransportError::Unavailable(
                "injected subscribe failure".to_string(),
            ));
        }
        let rx = self.changes().subscribe();
        let stream = stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(value) => return Some((Ok(value), rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Change subscriber lagged, notifications dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed();
        Ok(stream)
    }

    /// End every open subscription, as a dropped connection would.
    pub fn close_subscriptions(&self) {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        *self.changes() = changes;
    }

    /// Current record without failure injection.
    pub fn current(&self) -> Option<Value> {
        self.value().clone()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_subscribe(&self, fail: bool) {
        self.inner.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes (puts and removes).
    pub fn write_count(&self) -> u64 {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Number of live change subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.changes().receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_writes_reach_every_subscriber() {
        let store = MemoryStore::new();
        let mut first = store.subscribe().unwrap();
        let mut second = store.clone().subscribe().unwrap();

        store.put(&json!({"routes": []})).unwrap();
        store.remove().unwrap();

        assert_eq!(first.next().await, Some(Ok(Some(json!({"routes": []})))));
        assert_eq!(first.next().await, Some(Ok(None)));
        assert_eq!(second.next().await, Some(Ok(Some(json!({"routes": []})))));
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_dropping_stream_unsubscribes() {
        let store = MemoryStore::new();
        let stream = store.subscribe().unwrap();
        assert_eq!(store.subscriber_count(), 1);
        drop(stream);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_injected_failures() {
        let store = MemoryStore::with_value(json!({"routes": [{}]}));
        store.set_fail_writes(true);
        assert!(store.put(&json!({})).is_err());
        assert_eq!(store.current(), Some(json!({"routes": [{}]})));

        store.set_fail_reads(true);
        assert!(store.fetch().is_err());

        store.set_fail_subscribe(true);
        assert!(store.subscribe().is_err());
    }

    #[tokio::test]
    async fn test_close_ends_open_subscriptions() {
        let store = MemoryStore::new();
        let mut stream = store.subscribe().unwrap();

        store.close_subscriptions();

        assert_eq!(stream.next().await, None);
        assert_eq!(store.subscriber_count(), 0);

        // New subscriptions see later writes
        let mut stream = store.subscribe().unwrap();
        store.put(&json!({"routes": [{}]})).unwrap();
        assert_eq!(stream.next().await, Some(Ok(Some(json!({"routes": [{}]})))));
    }
}
