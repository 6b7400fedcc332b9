//! The [`Telemetry`] component

use std::sync::Arc;
use tracing::{debug, info};

use crate::backend::{AnalyticsBackend, NoopBackend};
use crate::config::TelemetryConfig;
use crate::identity::{identity_hash, IdentityStore, Traits, UserIdentity};
use crate::segment::SegmentBackend;
use crate::sink::{ErrorSink, TracingSink};
use crate::types::{Context, IdentifyMessage, Properties, TrackEvent, TrackMessage};

/// Decided once at construction, never changes afterwards
#[derive(Debug)]
enum State {
    Disabled,
    Identified {
        identity: UserIdentity,
        identity_hash: String,
    },
}

/// Telemetry manager
pub struct Telemetry {
    state: State,
    backend: Arc<dyn AnalyticsBackend>,
    sink: Arc<dyn ErrorSink>,
    source: String,
    app_version: String,
}

impl Telemetry {
    /// Create a telemetry instance for the running machine.
    ///
    /// When enabled this resolves the anonymous id and sends one identify
    /// call if the identity changed since the last run.
    pub async fn new(
        config: TelemetryConfig,
        backend: Arc<dyn AnalyticsBackend>,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        if !config.enabled {
            return Self::disabled_with(config, backend, sink);
        }
        Self::with_traits(config, Traits::current(), backend, sink).await
    }

    /// Same as [`Telemetry::new`] with explicit machine traits
    pub async fn with_traits(
        config: TelemetryConfig,
        traits: Traits,
        backend: Arc<dyn AnalyticsBackend>,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        if !config.enabled {
            return Self::disabled_with(config, backend, sink);
        }

        info!("Telemetry enabled");

        let store = IdentityStore::new(&config.anonymous_id_path, &config.identify_hash_path);
        let identity = UserIdentity {
            user_id: store.load_or_create_user_id(sink.as_ref()),
            traits,
        };

        let stored_hash = store.read_identity_hash(sink.as_ref());
        let current_hash = match identity_hash(&identity) {
            Ok(hash) => Some(hash),
            Err(e) => {
                sink.report(&e);
                None
            }
        };
        let changed = needs_identify(current_hash.as_deref(), &stored_hash);

        let telemetry = Self {
            state: State::Identified {
                identity,
                identity_hash: current_hash.clone().unwrap_or_default(),
            },
            backend,
            sink,
            source: config.source,
            app_version: config.app_version,
        };

        if changed {
            if let Some(hash) = &current_hash {
                store.write_identity_hash(hash, telemetry.sink.as_ref());
            }
            telemetry.identify().await;
        } else {
            debug!("Telemetry: identity unchanged, skipping identify");
        }

        telemetry
    }

    /// Create an instance backed by Segment, logging failures through `tracing`
    pub async fn segment(config: TelemetryConfig) -> Self {
        let sink: Arc<dyn ErrorSink> = Arc::new(TracingSink);

        if !config.enabled {
            return Self::disabled_with(config, Arc::new(NoopBackend), sink);
        }

        let backend: Arc<dyn AnalyticsBackend> =
            match SegmentBackend::new(&config.write_key, &config.endpoint_url, sink.clone()) {
                Ok(backend) => Arc::new(backend),
                Err(e) => {
                    sink.report(&e);
                    Arc::new(NoopBackend)
                }
            };

        Self::new(config, backend, sink).await
    }

    /// An instance that never does anything
    pub fn disabled() -> Self {
        Self::disabled_with(
            TelemetryConfig::default(),
            Arc::new(NoopBackend),
            Arc::new(TracingSink),
        )
    }

    fn disabled_with(
        config: TelemetryConfig,
        backend: Arc<dyn AnalyticsBackend>,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        info!("Telemetry disabled");

        Self {
            state: State::Disabled,
            backend,
            sink,
            source: config.source,
            app_version: config.app_version,
        }
    }

    /// Check if telemetry is enabled
    pub fn is_enabled(&self) -> bool {
        matches!(self.state, State::Identified { .. })
    }

    /// Anonymous user id, if enabled
    pub fn user_id(&self) -> Option<&str> {
        match &self.state {
            State::Identified { identity, .. } => Some(&identity.user_id),
            State::Disabled => None,
        }
    }

    /// Hash of the current identity, if enabled
    pub fn identity_hash(&self) -> Option<&str> {
        match &self.state {
            State::Identified { identity_hash, .. } => Some(identity_hash),
            State::Disabled => None,
        }
    }

    /// Record a failed tray operation
    pub async fn track_error(&self, message: &str) {
        self.track(TrackEvent::Error, message).await;
    }

    /// Record a successful tray operation
    pub async fn track_success(&self, message: &str) {
        self.track(TrackEvent::Success, message).await;
    }

    async fn identify(&self) {
        let State::Identified { identity, .. } = &self.state else {
            return;
        };

        let message = IdentifyMessage {
            user_id: identity.user_id.clone(),
            traits: identity.traits.clone(),
            context: Context::default(),
        };

        if let Err(e) = self.backend.identify(&message).await {
            self.sink.report(&e);
        }
    }

    async fn track(&self, event: TrackEvent, message: &str) {
        let State::Identified { identity, .. } = &self.state else {
            return;
        };

        let message = TrackMessage {
            user_id: identity.user_id.clone(),
            event,
            context: Context::default(),
            properties: Properties::new(&self.source, &self.app_version, message),
        };

        debug!("Telemetry: {}", event);
        if let Err(e) = self.backend.track(&message).await {
            self.sink.report(&e);
        }
    }
}

/// An identity whose hash could not be computed is always re-sent.
pub(crate) fn needs_identify(current: Option<&str>, stored: &str) -> bool {
    match current {
        Some(hash) => hash != stored,
        None => true,
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("state", &self.state)
            .field("source", &self.source)
            .field("app_version", &self.app_version)
            .finish_non_exhaustive()
    }
}
