// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer: the local snapshot slot and the remote realtime record.

pub mod firebase;
pub mod local;
pub mod memory;
pub mod remote;

pub use firebase::FirebaseClient;
pub use local::{LocalStore, LocalStoreError};
pub use memory::MemoryStore;
pub use remote::{Change, ChangeStream, RemoteStore, RemoteTransportError};
