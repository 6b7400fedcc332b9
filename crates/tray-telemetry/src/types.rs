//! Wire messages handed to the analytics backend

use serde::{Deserialize, Serialize};

use crate::identity::Traits;

/// Placeholder IP sent instead of the real address
pub const ANONYMOUS_IP: &str = "0.0.0.0";

/// Track event names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackEvent {
    /// A tray operation failed
    #[serde(rename = "tray error occured")]
    Error,
    /// A tray operation succeeded
    #[serde(rename = "tray operation successful")]
    Success,
}

impl TrackEvent {
    /// Event name as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            // Misspelling is what existing dashboards key on.
            Self::Error => "tray error occured",
            Self::Success => "tray operation successful",
        }
    }
}

impl std::fmt::Display for TrackEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Always [`ANONYMOUS_IP`]
    pub ip: String,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            ip: ANONYMOUS_IP.to_string(),
        }
    }
}

/// Properties attached to every track event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    /// Emitting application
    pub source: String,
    /// Host application version
    pub tray_version: String,
    /// CRC build; never populated
    pub crc_version: String,
    /// Free-form message from the caller
    pub message: String,
}

impl Properties {
    /// Build properties for a message
    pub fn new(source: &str, tray_version: &str, message: impl Into<String>) -> Self {
        Self {
            source: source.to_string(),
            tray_version: tray_version.to_string(),
            crc_version: String::new(),
            message: message.into(),
        }
    }
}

/// Identify call payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyMessage {
    /// Anonymous user id
    pub user_id: String,
    /// Machine traits
    pub traits: Traits,
    /// Message context
    pub context: Context,
}

/// Track call payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMessage {
    /// Anonymous user id
    pub user_id: String,
    /// Event name
    pub event: TrackEvent,
    /// Message context
    pub context: Context,
    /// Event properties
    pub properties: Properties,
}
