// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync engine: keeps the assignment model consistent across clients.
//!
//! One task owns the model, the echo flag and the sync state. It handles
//! commands from [`SyncHandle`], completions of remote I/O (run in spawned
//! tasks) and change notifications one at a time, so the model needs no lock.
//! Readers get immutable [`ModelView`]s through a `watch` channel.
//!
//! Lifecycle:
//! - no remote store: `LocalOnly`, model seeded from the local slot
//! - remote store: `Loading` until the first read completes, then `Synced`;
//!   a valid remote record replaces the model, otherwise the local slot does
//! - every mutation is persisted locally, then pushed whole (`Saving`)
//!
//! Commands that arrive before the initial load finishes are held and run
//! once it has. After a resubscription the record is read again to pick up
//! writes made while no subscription was open.
//!
//! Echo suppression: a flag is raised before every remote write and the next
//! change notification clears it and is dropped, whether or not it is the
//! write's own echo. With overlapping writes a concurrent remote update can be
//! dropped this way.

use crate::db::{
    Change, ChangeStream, LocalStore, LocalStoreError, RemoteStore, RemoteTransportError,
};
use crate::models::AssignmentModel;
use crate::services::ingest::{ingest_record, inspect_record, RecordShape};
use crate::services::RouteCatalog;
use futures_util::StreamExt;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Delay before re-opening a failed change subscription.
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

const COMMAND_BUFFER: usize = 32;

// ─── Published State ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Disconnected,
    Loading,
    Synced,
    Saving,
    LocalOnly,
}

impl SyncState {
    /// Whether the initial load has finished.
    pub fn is_ready(self) -> bool {
        matches!(
            self,
            SyncState::Synced | SyncState::Saving | SyncState::LocalOnly
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncState::Disconnected => "disconnected",
            SyncState::Loading => "loading",
            SyncState::Synced => "synced",
            SyncState::Saving => "saving",
            SyncState::LocalOnly => "local_only",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SyncStatus {
    pub state: SyncState,
    /// Remote backend name, `None` when running local-only
    pub remote: Option<String>,
    pub subscribed: bool,
    pub echo_pending: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub notifications_applied: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub notifications_rejected: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub echoes_suppressed: u64,
    /// Re-reads of the record applied after resubscribing
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub resyncs: u64,
    pub last_error: Option<String>,
}

/// Immutable view of the model handed to readers.
#[derive(Debug, Clone)]
pub struct ModelView {
    /// Increases on every model replacement or mutation
    pub revision: u64,
    pub status: SyncStatus,
    pub model: AssignmentModel,
}

/// Result of a wipe. `remote_cleared` is `None` without a remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WipeReport {
    pub local_cleared: bool,
    pub remote_cleared: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum RepairAction {
    /// Local snapshot re-pushed over the remote record
    PushedLocal,
    /// No local snapshot; remote record deleted
    RemovedRemote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RepairReport {
    pub action: RepairAction,
    pub routes: usize,
}

/// Errors returned to callers of [`SyncHandle`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyncError {
    #[error("Unknown route index {0}")]
    UnknownRoute(usize),

    #[error("No remote store is configured")]
    RemoteNotConfigured,

    #[error("Local snapshot is unusable: {0}")]
    LocalCorrupt(String),

    #[error(transparent)]
    Local(#[from] LocalStoreError),

    #[error(transparent)]
    Remote(#[from] RemoteTransportError),

    #[error("Sync engine is not running")]
    EngineStopped,
}

// ─── Messages ────────────────────────────────────────────────

enum Command {
    Assign {
        route_index: usize,
        user: String,
        date: String,
        reply: oneshot::Sender<Result<(), SyncError>>,
    },
    Unassign {
        route_index: usize,
        user: String,
        reply: oneshot::Sender<Result<(), SyncError>>,
    },
    Wipe {
        reply: oneshot::Sender<WipeReport>,
    },
    Repair {
        reply: oneshot::Sender<Result<RepairReport, SyncError>>,
    },
    Shutdown,
}

/// Completions of spawned remote I/O.
enum Outcome {
    /// `resync` is set for every subscription after the first attempt
    Subscribed {
        result: Result<ChangeStream, RemoteTransportError>,
        resync: bool,
    },
    Loaded(Result<Option<Value>, RemoteTransportError>),
    Refetched(Result<Option<Value>, RemoteTransportError>),
    Written {
        result: Result<(), RemoteTransportError>,
        after: AfterWrite,
    },
}

enum RemoteWrite {
    Put(Value),
    Remove,
}

/// What to do once a remote write completes.
enum AfterWrite {
    Save,
    Wipe {
        local_cleared: bool,
        reply: oneshot::Sender<WipeReport>,
    },
    Repair {
        report: RepairReport,
        reply: oneshot::Sender<Result<RepairReport, SyncError>>,
    },
}

// ─── Engine ──────────────────────────────────────────────────

pub struct SyncEngine {
    catalog: Arc<RouteCatalog>,
    local: LocalStore,
    remote: Option<RemoteStore>,
    resubscribe_delay: Duration,
    model: AssignmentModel,
    revision: u64,
    status: SyncStatus,
    writes_in_flight: usize,
    /// Commands received before the initial load finished
    deferred: VecDeque<Command>,
    subscription: Option<ChangeStream>,
    view_tx: watch::Sender<Arc<ModelView>>,
    outcomes_tx: mpsc::UnboundedSender<Outcome>,
    outcomes_rx: mpsc::UnboundedReceiver<Outcome>,
}

impl SyncEngine {
    /// Create an engine seeded with the catalog's assignments.
    ///
    /// `remote` of `None` runs local-only.
    pub fn new(catalog: Arc<RouteCatalog>, local: LocalStore, remote: Option<RemoteStore>) -> Self {
        let model = catalog.initial_assignments();
        let status = SyncStatus {
            state: SyncState::Disconnected,
            remote: remote.as_ref().map(|r| r.kind().to_string()),
            subscribed: false,
            echo_pending: false,
            notifications_applied: 0,
            notifications_rejected: 0,
            echoes_suppressed: 0,
            resyncs: 0,
            last_error: None,
        };
        let (view_tx, _) = watch::channel(Arc::new(ModelView {
            revision: 0,
            status: status.clone(),
            model: model.clone(),
        }));
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();

        Self {
            catalog,
            local,
            remote,
            resubscribe_delay: RESUBSCRIBE_DELAY,
            model,
            revision: 0,
            status,
            writes_in_flight: 0,
            deferred: VecDeque::new(),
            subscription: None,
            view_tx,
            outcomes_tx,
            outcomes_rx,
        }
    }

    pub fn with_resubscribe_delay(mut self, delay: Duration) -> Self {
        self.resubscribe_delay = delay;
        self
    }

    /// Start the engine task and return a handle to it.
    pub fn spawn(self) -> SyncHandle {
        let (commands, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = SyncHandle {
            commands,
            view: self.view_tx.subscribe(),
            remote: self.remote.clone(),
        };
        tokio::spawn(self.run(commands_rx));
        handle
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        self.start().await;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) if self.status.state.is_ready() => {
                        self.handle_command(command).await
                    }
                    Some(command) => self.deferred.push_back(command),
                },
                Some(outcome) = self.outcomes_rx.recv() => self.handle_outcome(outcome).await,
                change = next_change(&mut self.subscription) => self.handle_change(change),
            }
        }

        // Unsubscribe before the command channel closes
        drop(self.subscription.take());
        tracing::info!("Sync engine stopped");
    }

    async fn start(&mut self) {
        let Some(remote) = self.remote.clone() else {
            tracing::info!("No remote store configured, running local-only");
            self.status.state = SyncState::LocalOnly;
            self.load_local().await;
            self.publish(true);
            return;
        };

        tracing::info!(remote = remote.kind(), "Loading assignments from remote store");
        self.status.state = SyncState::Loading;
        self.publish(false);

        // Subscribe before reading so no change between the two is missed
        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = remote.subscribe().await;
            let _ = outcomes.send(Outcome::Subscribed {
                result,
                resync: false,
            });
            let _ = outcomes.send(Outcome::Loaded(remote.fetch().await));
        });
    }

    /// Replace the model from the local slot, if it holds a valid snapshot.
    async fn load_local(&mut self) {
        match self.local.read().await {
            Ok(Some(value)) => match ingest_record(value) {
                Ok(snapshot) => {
                    tracing::info!(routes = snapshot.routes.len(), "Loaded local snapshot");
                    self.model.replace_all(&snapshot);
                }
                Err(e) => tracing::warn!(error = %e, "Ignoring invalid local snapshot"),
            },
            Ok(None) => tracing::info!("No local snapshot, using catalog assignments"),
            Err(e) => tracing::warn!(error = %e, "Failed to read local snapshot"),
        }
    }

    /// Publish a new view. `changed` bumps the revision.
    fn publish(&mut self, changed: bool) {
        if changed {
            self.revision += 1;
        }
        self.view_tx.send_replace(Arc::new(ModelView {
            revision: self.revision,
            status: self.status.clone(),
            model: self.model.clone(),
        }));
    }

    fn record_error(&mut self, message: String) {
        self.status.last_error = Some(message);
    }

    // ─── Commands ────────────────────────────────────────────

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Assign {
                route_index,
                user,
                date,
                reply,
            } => {
                let result = self
                    .mutate(route_index, |model| model.assign(route_index, &user, &date))
                    .await;
                if result.is_ok() {
                    tracing::info!(route_index, user = %user, date = %date, "Assigned route");
                }
                let _ = reply.send(result);
            }
            Command::Unassign {
                route_index,
                user,
                reply,
            } => {
                let result = self
                    .mutate(route_index, |model| model.unassign(route_index, &user))
                    .await;
                if result.is_ok() {
                    tracing::info!(route_index, user = %user, "Unassigned route");
                }
                let _ = reply.send(result);
            }
            Command::Wipe { reply } => self.wipe(reply).await,
            Command::Repair { reply } => self.repair(reply).await,
            Command::Shutdown => {}
        }
    }

    /// Apply a mutation, persist locally, then push to the remote store.
    async fn mutate(
        &mut self,
        route_index: usize,
        apply: impl FnOnce(&mut AssignmentModel),
    ) -> Result<(), SyncError> {
        if self.catalog.route(route_index).is_none() {
            return Err(SyncError::UnknownRoute(route_index));
        }

        apply(&mut self.model);
        self.publish(true);

        let snapshot = self.model.snapshot();
        if let Err(e) = self.local.write(&snapshot).await {
            tracing::warn!(error = %e, "Failed to save local snapshot");
            self.record_error(e.to_string());
        }

        if self.remote.is_some() {
            self.spawn_write(RemoteWrite::Put(snapshot.to_value()), AfterWrite::Save);
        }
        Ok(())
    }

    async fn wipe(&mut self, reply: oneshot::Sender<WipeReport>) {
        self.model.clear();
        self.publish(true);

        let local_cleared = match self.local.clear().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to clear local snapshot");
                self.record_error(e.to_string());
                false
            }
        };
        tracing::info!(local_cleared, "Wiped assignments");

        if self.remote.is_some() {
            self.spawn_write(
                RemoteWrite::Remove,
                AfterWrite::Wipe {
                    local_cleared,
                    reply,
                },
            );
        } else {
            let _ = reply.send(WipeReport {
                local_cleared,
                remote_cleared: None,
            });
        }
    }

    /// Overwrite the remote record with the local snapshot.
    async fn repair(&mut self, reply: oneshot::Sender<Result<RepairReport, SyncError>>) {
        if self.remote.is_none() {
            let _ = reply.send(Err(SyncError::RemoteNotConfigured));
            return;
        }

        let (write, report) = match self.local.read().await {
            Ok(Some(value)) => match ingest_record(value) {
                Ok(snapshot) => {
                    let report = RepairReport {
                        action: RepairAction::PushedLocal,
                        routes: snapshot.routes.len(),
                    };
                    (RemoteWrite::Put(snapshot.to_value()), report)
                }
                Err(e) => {
                    let _ = reply.send(Err(SyncError::LocalCorrupt(e.to_string())));
                    return;
                }
            },
            Ok(None) => (
                RemoteWrite::Remove,
                RepairReport {
                    action: RepairAction::RemovedRemote,
                    routes: 0,
                },
            ),
            Err(LocalStoreError::Corrupt(e)) => {
                let _ = reply.send(Err(SyncError::LocalCorrupt(e)));
                return;
            }
            Err(e) => {
                let _ = reply.send(Err(e.into()));
                return;
            }
        };

        tracing::info!(action = ?report.action, "Repairing remote record");
        self.spawn_write(write, AfterWrite::Repair { report, reply });
    }

    /// Raise the echo flag and run a remote write in the background.
    fn spawn_write(&mut self, write: RemoteWrite, after: AfterWrite) {
        let Some(remote) = self.remote.clone() else {
            return;
        };

        self.status.echo_pending = true;
        self.writes_in_flight += 1;
        if self.status.state == SyncState::Synced {
            self.status.state = SyncState::Saving;
        }
        self.publish(false);

        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = match write {
                RemoteWrite::Put(value) => remote.put(&value).await,
                RemoteWrite::Remove => remote.remove().await,
            };
            let _ = outcomes.send(Outcome::Written { result, after });
        });
    }

    // ─── Remote Events ───────────────────────────────────────

    async fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Subscribed {
                result: Ok(stream),
                resync,
            } => {
                tracing::info!(resync, "Subscribed to remote changes");
                self.subscription = Some(stream);
                self.status.subscribed = true;
                self.publish(false);
                if resync {
                    self.spawn_refetch();
                }
            }
            Outcome::Subscribed { result: Err(e), .. } => {
                tracing::warn!(error = %e, "Failed to subscribe to remote changes");
                self.record_error(e.to_string());
                self.schedule_resubscribe();
                self.publish(false);
            }
            Outcome::Loaded(result) => {
                self.handle_loaded(result).await;
                self.run_deferred().await;
            }
            Outcome::Refetched(result) => self.handle_refetched(result),
            Outcome::Written { result, after } => self.handle_written(result, after),
        }
    }

    async fn handle_loaded(&mut self, result: Result<Option<Value>, RemoteTransportError>) {
        match result {
            Ok(Some(value)) => match ingest_record(value) {
                Ok(snapshot) => {
                    tracing::info!(routes = snapshot.routes.len(), "Loaded remote snapshot");
                    self.model.replace_all(&snapshot);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Remote record rejected, falling back to local");
                    self.record_error(e.to_string());
                    self.load_local().await;
                }
            },
            Ok(None) => {
                tracing::info!("Remote record absent, falling back to local");
                self.load_local().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote read failed, falling back to local");
                self.record_error(e.to_string());
                self.load_local().await;
            }
        }

        if self.status.state == SyncState::Loading {
            self.status.state = SyncState::Synced;
        }
        self.publish(true);
    }

    /// Run commands held back while loading, in arrival order.
    async fn run_deferred(&mut self) {
        if self.deferred.is_empty() {
            return;
        }
        tracing::debug!(count = self.deferred.len(), "Running commands received while loading");
        while let Some(command) = self.deferred.pop_front() {
            self.handle_command(command).await;
        }
    }

    fn spawn_refetch(&self) {
        let Some(remote) = self.remote.clone() else {
            return;
        };
        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let _ = outcomes.send(Outcome::Refetched(remote.fetch().await));
        });
    }

    /// Apply a re-read made after resubscribing.
    ///
    /// Skipped while an own write is pending: that write replaces the whole
    /// record and its echo is still to come.
    fn handle_refetched(&mut self, result: Result<Option<Value>, RemoteTransportError>) {
        if self.writes_in_flight > 0 || self.status.echo_pending {
            tracing::debug!("Own write pending, skipping re-read");
            return;
        }

        match result {
            Ok(Some(value)) => match ingest_record(value) {
                Ok(snapshot) => {
                    tracing::info!(routes = snapshot.routes.len(), "Resynced from remote record");
                    self.model.replace_all(&snapshot);
                    self.status.resyncs += 1;
                    self.publish(true);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring invalid remote record on re-read");
                    self.record_error(e.to_string());
                    self.publish(false);
                }
            },
            Ok(None) => tracing::debug!("Remote record absent on re-read"),
            Err(e) => {
                tracing::warn!(error = %e, "Remote re-read failed");
                self.record_error(e.to_string());
                self.publish(false);
            }
        }
    }

    fn handle_written(&mut self, result: Result<(), RemoteTransportError>, after: AfterWrite) {
        self.writes_in_flight = self.writes_in_flight.saturating_sub(1);

        if let Err(e) = &result {
            tracing::warn!(error = %e, "Remote write failed, keeping local state");
            self.status.echo_pending = false;
            self.record_error(e.to_string());
        }
        if self.writes_in_flight == 0 && self.status.state == SyncState::Saving {
            self.status.state = SyncState::Synced;
        }
        self.publish(false);

        match after {
            AfterWrite::Save => {}
            AfterWrite::Wipe {
                local_cleared,
                reply,
            } => {
                let _ = reply.send(WipeReport {
                    local_cleared,
                    remote_cleared: Some(result.is_ok()),
                });
            }
            AfterWrite::Repair { report, reply } => {
                let _ = reply.send(result.map(|()| report).map_err(SyncError::from));
            }
        }
    }

    fn handle_change(&mut self, change: Option<Change>) {
        let value = match change {
            None => {
                tracing::warn!("Remote change stream ended");
                self.subscription = None;
                self.status.subscribed = false;
                self.schedule_resubscribe();
                self.publish(false);
                return;
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Remote change stream error");
                self.record_error(e.to_string());
                self.publish(false);
                return;
            }
            Some(Ok(value)) => value,
        };

        if self.status.echo_pending {
            self.status.echo_pending = false;
            self.status.echoes_suppressed += 1;
            tracing::debug!("Ignoring change notification from own write");
            self.publish(false);
            return;
        }

        let Some(value) = value else {
            tracing::warn!("Ignoring change notification for deleted record");
            self.status.notifications_rejected += 1;
            self.publish(false);
            return;
        };

        match ingest_record(value) {
            Ok(snapshot) => {
                tracing::info!(routes = snapshot.routes.len(), "Applied remote change");
                self.model.replace_all(&snapshot);
                self.status.notifications_applied += 1;
                self.publish(true);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring invalid remote change");
                self.status.notifications_rejected += 1;
                self.publish(false);
            }
        }
    }

    fn schedule_resubscribe(&mut self) {
        let Some(remote) = self.remote.clone() else {
            return;
        };
        let delay = self.resubscribe_delay;
        let outcomes = self.outcomes_tx.clone();
        tracing::info!(delay_ms = delay.as_millis() as u64, "Resubscribing to remote changes");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = remote.subscribe().await;
            let _ = outcomes.send(Outcome::Subscribed {
                result,
                resync: true,
            });
        });
    }
}

/// Next notification, or never when not subscribed.
async fn next_change(subscription: &mut Option<ChangeStream>) -> Option<Change> {
    match subscription {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

// ─── Handle ──────────────────────────────────────────────────

/// Cloneable handle to a running [`SyncEngine`].
#[derive(Clone)]
pub struct SyncHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<Arc<ModelView>>,
    remote: Option<RemoteStore>,
}

impl SyncHandle {
    /// Latest published view.
    pub fn view(&self) -> Arc<ModelView> {
        self.view.borrow().clone()
    }

    pub fn status(&self) -> SyncStatus {
        self.view.borrow().status.clone()
    }

    /// Receiver notified on every published view.
    pub fn subscribe_view(&self) -> watch::Receiver<Arc<ModelView>> {
        self.view.clone()
    }

    /// Wait until a published view satisfies `predicate`.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&ModelView) -> bool,
    ) -> Result<Arc<ModelView>, SyncError> {
        let mut rx = self.view.clone();
        let view = rx
            .wait_for(|view| predicate(view.as_ref()))
            .await
            .map_err(|_| SyncError::EngineStopped)?;
        Ok(view.clone())
    }

    /// Wait for the initial load to finish.
    pub async fn wait_until_ready(&self) -> Result<Arc<ModelView>, SyncError> {
        self.wait_for(|view| view.status.state.is_ready()).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SyncError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| SyncError::EngineStopped)?;
        rx.await.map_err(|_| SyncError::EngineStopped)
    }

    /// Assign `date` to (`route_index`, `user`). Returns once persisted locally.
    pub async fn assign(&self, route_index: usize, user: &str, date: &str) -> Result<(), SyncError> {
        self.request(|reply| Command::Assign {
            route_index,
            user: user.to_string(),
            date: date.to_string(),
            reply,
        })
        .await?
    }

    pub async fn unassign(&self, route_index: usize, user: &str) -> Result<(), SyncError> {
        self.request(|reply| Command::Unassign {
            route_index,
            user: user.to_string(),
            reply,
        })
        .await?
    }

    /// Clear the model, the local slot and the remote record.
    pub async fn wipe(&self) -> Result<WipeReport, SyncError> {
        self.request(|reply| Command::Wipe { reply }).await
    }

    /// Re-push the local snapshot over the remote record.
    pub async fn repair_remote(&self) -> Result<RepairReport, SyncError> {
        self.request(|reply| Command::Repair { reply }).await?
    }

    /// Describe the remote record without applying it.
    pub async fn inspect_remote(&self) -> Result<RecordShape, SyncError> {
        let remote = self.remote.as_ref().ok_or(SyncError::RemoteNotConfigured)?;
        let value = remote.fetch().await?;
        Ok(inspect_record(value.as_ref()))
    }

    /// Stop the engine and wait for it to exit.
    pub async fn shutdown(&self) {
        if self.commands.send(Command::Shutdown).await.is_ok() {
            self.commands.closed().await;
        }
    }
}
