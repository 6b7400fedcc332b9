//! Error sinks
//!
//! Telemetry never fails its caller. Anything that goes wrong is reported to
//! an [`ErrorSink`] and then dropped.

use tracing::warn;

use crate::error::TelemetryError;

/// Receives errors swallowed by [`Telemetry`](crate::Telemetry)
pub trait ErrorSink: Send + Sync {
    /// Report a non-fatal error
    fn report(&self, error: &TelemetryError);
}

/// Logs every error at `warn` level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, error: &TelemetryError) {
        warn!("Telemetry: {}", error);
    }
}

impl<F> ErrorSink for F
where
    F: Fn(&TelemetryError) + Send + Sync,
{
    fn report(&self, error: &TelemetryError) {
        self(error)
    }
}
