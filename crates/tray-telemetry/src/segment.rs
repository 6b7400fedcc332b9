//! Segment HTTP backend
//!
//! Every call is its own request (no batching, no queue, no retry), which is
//! the flush-at-one behaviour the tray has always used. Requests run on a
//! detached tokio task: callers only wait for the message to be handed off,
//! and delivery failures go to the [`ErrorSink`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::debug;
use uuid::Uuid;

use crate::backend::AnalyticsBackend;
use crate::error::{Result, TelemetryError};
use crate::sink::ErrorSink;
use crate::types::{IdentifyMessage, TrackMessage};

/// HTTP request timeout in seconds
const HTTP_TIMEOUT_SECS: u64 = 10;

/// Message plus the fields the Segment API expects from a library
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T> {
    #[serde(flatten)]
    message: &'a T,
    message_id: String,
    timestamp: DateTime<Utc>,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    fn new(message: &'a T) -> Self {
        Self {
            message,
            message_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Sends identify/track calls to the Segment HTTP tracking API
#[derive(Clone)]
pub struct SegmentBackend {
    client: reqwest::Client,
    write_key: String,
    host: String,
    sink: Arc<dyn ErrorSink>,
}

impl SegmentBackend {
    /// Create a backend for `write_key` against `host`
    pub fn new(
        write_key: impl Into<String>,
        host: impl Into<String>,
        sink: Arc<dyn ErrorSink>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self::with_client(client, write_key, host, sink))
    }

    /// Create a backend on top of an existing HTTP client
    pub fn with_client(
        client: reqwest::Client,
        write_key: impl Into<String>,
        host: impl Into<String>,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            client,
            write_key: write_key.into(),
            host: host.into().trim_end_matches('/').to_string(),
            sink,
        }
    }

    fn url(&self, call: &str) -> String {
        format!("{}/v1/{}", self.host, call)
    }

    /// Serialize now, deliver in the background.
    fn dispatch<T: Serialize>(&self, call: &'static str, message: &T) -> Result<()> {
        let body = serde_json::to_value(Envelope::new(message))?;
        let handle = Handle::try_current()
            .map_err(|e| TelemetryError::Backend(format!("cannot send {}: {}", call, e)))?;

        let backend = self.clone();
        handle.spawn(async move {
            if let Err(e) = backend.send(call, &body).await {
                backend.sink.report(&e);
            }
        });
        Ok(())
    }

    async fn send(&self, call: &str, body: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(self.url(call))
            .basic_auth(&self.write_key, Some(""))
            .json(body)
            .send()
            .await?;

        if response.status().is_success() {
            debug!("Telemetry: sent {}", call);
            Ok(())
        } else {
            Err(TelemetryError::Backend(format!(
                "{} returned HTTP {}",
                call,
                response.status()
            )))
        }
    }
}

impl std::fmt::Debug for SegmentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentBackend")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AnalyticsBackend for SegmentBackend {
    async fn identify(&self, message: &IdentifyMessage) -> Result<()> {
        self.dispatch("identify", message)
    }

    async fn track(&self, message: &TrackMessage) -> Result<()> {
        self.dispatch("track", message)
    }
}
