//! Tray Telemetry - Anonymous Usage Events
//!
//! This crate reports tray operation outcomes to Segment when the user has
//! opted in. When disabled it does nothing at all: no files are touched and
//! no requests are made.
//!
//! ## What We Send
//!
//! - An anonymous id (shared with other Red Hat tools in `~/.redhat/anonymousId`)
//! - OS platform, release and version, once per change
//! - Success/error events with a caller-supplied message
//!
//! ## What We DON'T Send
//!
//! - The real IP address (`context.ip` is always `0.0.0.0`)
//! - Anything identifying the user beyond the anonymous id
//!
//! ## Failure Handling
//!
//! Telemetry is best effort. I/O and delivery failures are handed to an
//! [`ErrorSink`] (by default logged through `tracing`) and never returned to
//! the caller.
//!
//! ```no_run
//! use tray_telemetry::{Telemetry, TelemetryConfig};
//!
//! # async fn run() {
//! let config = TelemetryConfig::new(true, "segment-write-key").with_app_version("1.4.0");
//! let telemetry = Telemetry::segment(config).await;
//!
//! telemetry.track_success("cluster started").await;
//! telemetry.track_error("disk full").await;
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod segment;
pub mod sink;
pub mod types;

pub use backend::{AnalyticsBackend, NoopBackend};
pub use client::Telemetry;
pub use config::TelemetryConfig;
pub use error::{Result, TelemetryError};
pub use identity::{IdentityStore, Traits, UserIdentity};
pub use segment::SegmentBackend;
pub use sink::{ErrorSink, TracingSink};
pub use types::{Context, IdentifyMessage, Properties, TrackEvent, TrackMessage};

#[cfg(test)]
mod tests;
