// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Remote realtime store contract.
//!
//! A single named record supports:
//! - one-shot read (value or absent)
//! - full-value write
//! - delete
//! - a change subscription that delivers the new value (or absent) after
//!   every write from any client, including the subscriber's own writes

use crate::db::firebase::FirebaseClient;
use crate::db::memory::MemoryStore;
use futures_util::stream::BoxStream;
use serde_json::Value;

/// A change notification: the record's new value, `None` when deleted.
pub type Change = Result<Option<Value>, RemoteTransportError>;

/// Cancellable stream of change notifications. Dropping it unsubscribes.
pub type ChangeStream = BoxStream<'static, Change>;

/// Remote store backend.
#[derive(Clone)]
pub enum RemoteStore {
    Firebase(FirebaseClient),
    Memory(MemoryStore),
}

impl RemoteStore {
    /// Backend name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteStore::Firebase(_) => "firebase",
            RemoteStore::Memory(_) => "memory",
        }
    }

    /// Read the record once.
    pub async fn fetch(&self) -> Result<Option<Value>, RemoteTransportError> {
        match self {
            RemoteStore::Firebase(client) => client.fetch().await,
            RemoteStore::Memory(store) => store.fetch(),
        }
    }

    /// Replace the record.
    pub async fn put(&self, value: &Value) -> Result<(), RemoteTransportError> {
        match self {
            RemoteStore::Firebase(client) => client.put(value).await,
            RemoteStore::Memory(store) => store.put(value),
        }
    }

    /// Delete the record.
    pub async fn remove(&self) -> Result<(), RemoteTransportError> {
        match self {
            RemoteStore::Firebase(client) => client.remove().await,
            RemoteStore::Memory(store) => store.remove(),
        }
    }

    /// Subscribe to changes of the record.
    pub async fn subscribe(&self) -> Result<ChangeStream, RemoteTransportError> {
        match self {
            RemoteStore::Firebase(client) => client.subscribe().await,
            RemoteStore::Memory(store) => store.subscribe(),
        }
    }
}

/// Errors talking to the remote store. Always recoverable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteTransportError {
    #[error("Remote request failed: {0}")]
    Request(String),

    #[error("Remote store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Remote store returned an undecodable payload: {0}")]
    Decode(String),

    #[error("Remote subscription ended: {0}")]
    SubscriptionClosed(String),

    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}
