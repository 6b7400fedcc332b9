//! Analytics backend abstraction
//!
//! [`Telemetry`](crate::Telemetry) only needs two calls from the analytics
//! service. Delivery is best effort: an `Err` is reported and forgotten.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{IdentifyMessage, TrackMessage};

/// Event ingestion service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsBackend: Send + Sync {
    /// Associate traits with an anonymous user id
    async fn identify(&self, message: &IdentifyMessage) -> Result<()>;

    /// Record a single event
    async fn track(&self, message: &TrackMessage) -> Result<()>;
}

/// Backend that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBackend;

#[async_trait]
impl AnalyticsBackend for NoopBackend {
    async fn identify(&self, _message: &IdentifyMessage) -> Result<()> {
        Ok(())
    }

    async fn track(&self, _message: &TrackMessage) -> Result<()> {
        Ok(())
    }
}
