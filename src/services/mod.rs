// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod calendar;
pub mod catalog;
pub mod ingest;
pub mod normalizer;
pub mod reconciler;
pub mod sync;

pub use catalog::{CatalogLoadError, RouteCatalog};
pub use ingest::{ingest_record, inspect_record, IngestError, RecordShape, RoutesShape};
pub use reconciler::{reconcile, ShapeError};
pub use sync::{
    ModelView, RepairAction, RepairReport, SyncEngine, SyncError, SyncHandle, SyncState,
    SyncStatus, WipeReport,
};
