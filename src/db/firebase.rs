// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Realtime Database client (REST + event stream).
//!
//! Handles:
//! - One-shot read, full-value write and delete of a single record
//! - Change subscription over `text/event-stream`
//!
//! The event stream opens with a `put` carrying the current value. That first
//! event is skipped since the engine reads the record separately. A later root
//! `put` carries the whole new value; any other `put` or `patch` touches part
//! of the record, so the full record is re-read.

use crate::db::remote::{Change, ChangeStream, RemoteTransportError};
use futures_util::stream::{self, BoxStream, StreamExt};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;

/// Firebase Realtime Database client bound to one record.
#[derive(Clone)]
pub struct FirebaseClient {
    http: reqwest::Client,
    database_url: String,
    record: String,
    auth_token: Option<String>,
}

impl FirebaseClient {
    /// Create a client for `record` under `database_url`.
    pub fn new(database_url: &str, record: &str, auth_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            database_url: database_url.trim_end_matches('/').to_string(),
            record: record.to_string(),
            auth_token,
        }
    }

    /// REST URL of the record.
    pub fn record_url(&self) -> String {
        format!(
            "{}/{}.json",
            self.database_url,
            urlencoding::encode(&self.record)
        )
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, self.record_url());
        match &self.auth_token {
            Some(token) => builder.query(&[("auth", token.as_str())]),
            None => builder,
        }
    }

    /// Read the record. JSON `null` means the record does not exist.
    pub async fn fetch(&self) -> Result<Option<Value>, RemoteTransportError> {
        let response = self
            .request(reqwest::Method::GET)
            .send()
            .await
            .map_err(|e| RemoteTransportError::Request(e.to_string()))?;
        let response = check_response(response).await?;

        let value: Value = response
            .json()
            .await
            .map_err(|e| RemoteTransportError::Decode(e.to_string()))?;
        Ok(non_null(value))
    }

    /// Overwrite the record.
    pub async fn put(&self, value: &Value) -> Result<(), RemoteTransportError> {
        let response = self
            .request(reqwest::Method::PUT)
            .json(value)
            .send()
            .await
            .map_err(|e| RemoteTransportError::Request(e.to_string()))?;
        check_response(response).await?;
        Ok(())
    }

    /// Delete the record.
    pub async fn remove(&self) -> Result<(), RemoteTransportError> {
        let response = self
            .request(reqwest::Method::DELETE)
            .send()
            .await
            .map_err(|e| RemoteTransportError::Request(e.to_string()))?;
        check_response(response).await?;
        Ok(())
    }

    /// Open the event stream for the record.
    pub async fn subscribe(&self) -> Result<ChangeStream, RemoteTransportError> {
        let response = self
            .request(reqwest::Method::GET)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| RemoteTransportError::Request(e.to_string()))?;
        let response = check_response(response).await?;

        tracing::info!(record = %self.record, "Opened Firebase event stream");

        let subscription = Subscription {
            client: self.clone(),
            bytes: response
                .bytes_stream()
                .map(|chunk| chunk.map(|b| b.to_vec()).map_err(|e| e.to_string()))
                .boxed(),
            parser: SseParser::default(),
            pending: VecDeque::new(),
            seen_initial: false,
            finished: false,
        };

        Ok(stream::unfold(subscription, |mut sub| async move {
            let change = sub.next_change().await?;
            Some((change, sub))
        })
        .boxed())
    }
}

/// Map a non-2xx response to [`RemoteTransportError::Status`].
async fn check_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, RemoteTransportError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status, body = %body, "Firebase request failed");
    Err(RemoteTransportError::Status { status, body })
}

fn non_null(value: Value) -> Option<Value> {
    (!value.is_null()).then_some(value)
}

// ─── Event Stream ────────────────────────────────────────────

struct Subscription {
    client: FirebaseClient,
    bytes: BoxStream<'static, Result<Vec<u8>, String>>,
    parser: SseParser,
    pending: VecDeque<SseEvent>,
    seen_initial: bool,
    finished: bool,
}

impl Subscription {
    async fn next_change(&mut self) -> Option<Change> {
        loop {
            if self.finished {
                return None;
            }

            while let Some(event) = self.pending.pop_front() {
                match classify(&event) {
                    Ok(StreamEvent::Put { root: true, data }) if !self.seen_initial => {
                        self.seen_initial = true;
                        tracing::debug!(present = data.is_some(), "Skipping initial event");
                    }
                    Ok(StreamEvent::Put { root: true, data }) => return Some(Ok(data)),
                    Ok(StreamEvent::Put { root: false, .. }) | Ok(StreamEvent::Patch) => {
                        self.seen_initial = true;
                        return Some(self.client.fetch().await);
                    }
                    Ok(StreamEvent::KeepAlive) => {}
                    Ok(StreamEvent::Closed(reason)) => {
                        self.finished = true;
                        return Some(Err(RemoteTransportError::SubscriptionClosed(reason)));
                    }
                    Ok(StreamEvent::Unknown(name)) => {
                        tracing::debug!(event = %name, "Ignoring unknown stream event");
                    }
                    Err(e) => return Some(Err(e)),
                }
            }

            match self.bytes.next().await {
                Some(Ok(chunk)) => self.pending.extend(self.parser.push(&chunk)),
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(RemoteTransportError::Request(e)));
                }
                None => {
                    tracing::info!("Firebase event stream closed by server");
                    return None;
                }
            }
        }
    }
}

/// One server-sent event.
#[derive(Debug, Clone, PartialEq)]
struct SseEvent {
    event: String,
    data: String,
}

/// Incremental `text/event-stream` parser.
#[derive(Default)]
struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    /// Feed a chunk, returning every event it completes.
    fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer
            .extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(event) = parse_block(&String::from_utf8_lossy(&block)) {
                events.push(event);
            }
        }
        events
    }
}

fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event = String::new();
    let mut data: Vec<&str> = Vec::new();

    for line in block.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => event = value.to_string(),
            "data" => data.push(value),
            _ => {}
        }
    }

    if event.is_empty() && data.is_empty() {
        return None;
    }
    Some(SseEvent {
        event,
        data: data.join("\n"),
    })
}

/// Payload of `put` and `patch` events.
#[derive(Deserialize)]
struct PathData {
    path: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, PartialEq)]
enum StreamEvent {
    Put { root: bool, data: Option<Value> },
    Patch,
    KeepAlive,
    Closed(String),
    Unknown(String),
}

fn classify(event: &SseEvent) -> Result<StreamEvent, RemoteTransportError> {
    match event.event.as_str() {
        "put" => {
            let payload: PathData = serde_json::from_str(&event.data)
                .map_err(|e| RemoteTransportError::Decode(e.to_string()))?;
            Ok(StreamEvent::Put {
                root: payload.path == "/",
                data: non_null(payload.data),
            })
        }
        "patch" => Ok(StreamEvent::Patch),
        "keep-alive" => Ok(StreamEvent::KeepAlive),
        "cancel" => Ok(StreamEvent::Closed(format!("cancelled: {}", event.data))),
        "auth_revoked" => Ok(StreamEvent::Closed("auth revoked".to_string())),
        other => Ok(StreamEvent::Unknown(other.to_string())),
    }
}
