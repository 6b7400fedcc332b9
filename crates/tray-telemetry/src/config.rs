//! Telemetry configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, TelemetryError};

// ============================================================================
// Constants
// ============================================================================

/// Directory (under home) holding the shared anonymous id
pub const REDHAT_DIR_NAME: &str = ".redhat";

/// Anonymous id file name
pub const ANONYMOUS_ID_FILE_NAME: &str = "anonymousId";

/// Directory (under home) holding CRC state
pub const CRC_DIR_NAME: &str = ".crc";

/// Identify hash file name
pub const IDENTIFY_HASH_FILE_NAME: &str = "segmentIdentifyHashForExtension";

/// Default Segment ingestion host
pub const DEFAULT_ENDPOINT_URL: &str = "https://api.segment.io";

/// Default `source` property attached to every track event
pub const DEFAULT_SOURCE: &str = "tray-electron";

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Whether telemetry is enabled (default: false, the host opts in)
    #[serde(default)]
    pub enabled: bool,

    /// Segment write key
    #[serde(default)]
    pub write_key: String,

    /// Host application version, sent as `tray_version`
    #[serde(default = "default_app_version")]
    pub app_version: String,

    /// Value of the `source` property
    #[serde(default = "default_source")]
    pub source: String,

    /// Where the anonymous user id lives
    #[serde(default = "default_anonymous_id_path")]
    pub anonymous_id_path: PathBuf,

    /// Where the hash of the last identify payload lives
    #[serde(default = "default_identify_hash_path")]
    pub identify_hash_path: PathBuf,

    /// Segment ingestion host
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Returns an empty version; the host must supply its own.
pub fn default_app_version() -> String {
    String::new()
}

/// Returns the default `source` property.
pub fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

/// Returns `~/.redhat/anonymousId`.
pub fn default_anonymous_id_path() -> PathBuf {
    anonymous_id_path_in(&home_dir())
}

/// Returns `~/.crc/segmentIdentifyHashForExtension`.
pub fn default_identify_hash_path() -> PathBuf {
    identify_hash_path_in(&home_dir())
}

/// Returns the default Segment host.
pub fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

fn anonymous_id_path_in(home: &Path) -> PathBuf {
    home.join(REDHAT_DIR_NAME).join(ANONYMOUS_ID_FILE_NAME)
}

fn identify_hash_path_in(home: &Path) -> PathBuf {
    home.join(CRC_DIR_NAME).join(IDENTIFY_HASH_FILE_NAME)
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            write_key: String::new(),
            app_version: default_app_version(),
            source: default_source(),
            anonymous_id_path: default_anonymous_id_path(),
            identify_hash_path: default_identify_hash_path(),
            endpoint_url: default_endpoint_url(),
        }
    }
}

impl TelemetryConfig {
    /// Create a config rooted at the user's home directory
    pub fn new(enabled: bool, write_key: impl Into<String>) -> Self {
        Self {
            enabled,
            write_key: write_key.into(),
            ..Default::default()
        }
    }

    /// Relocate both identity files under `home`
    pub fn with_home_dir(mut self, home: impl AsRef<Path>) -> Self {
        let home = home.as_ref();
        self.anonymous_id_path = anonymous_id_path_in(home);
        self.identify_hash_path = identify_hash_path_in(home);
        self
    }

    /// Set the host application version
    pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = version.into();
        self
    }

    /// Set the Segment host (self-hosted proxies, tests)
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = url.into();
        self
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| TelemetryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            warn!("Failed to read telemetry config: {}", source);
            TelemetryError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_toml_str(&content)
    }

    /// An enabled config needs somewhere to send events
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.write_key.trim().is_empty() {
            return Err(TelemetryError::Config(
                "write_key is required when telemetry is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();

        assert!(!config.enabled);
        assert_eq!(config.app_version, "");
        assert_eq!(config.source, "tray-electron");
        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert!(config.anonymous_id_path.ends_with(".redhat/anonymousId"));
        assert!(config
            .identify_hash_path
            .ends_with(".crc/segmentIdentifyHashForExtension"));
    }

    #[test]
    fn test_with_home_dir() {
        let config = TelemetryConfig::new(true, "key").with_home_dir("/tmp/home");

        assert_eq!(
            config.anonymous_id_path,
            PathBuf::from("/tmp/home/.redhat/anonymousId")
        );
        assert_eq!(
            config.identify_hash_path,
            PathBuf::from("/tmp/home/.crc/segmentIdentifyHashForExtension")
        );
    }

    #[test]
    fn test_from_toml() {
        let config = TelemetryConfig::from_toml_str(
            r#"
            enabled = true
            write_key = "abc"
            app_version = "2.1.0"
            "#,
        )
        .unwrap();

        assert!(config.enabled);
        assert_eq!(config.write_key, "abc");
        assert_eq!(config.app_version, "2.1.0");
        assert_eq!(config.source, DEFAULT_SOURCE);
    }

    #[test]
    fn test_enabled_requires_write_key() {
        let err = TelemetryConfig::from_toml_str("enabled = true").unwrap_err();
        assert!(matches!(err, TelemetryError::Config(_)));

        assert!(TelemetryConfig::from_toml_str("enabled = false").is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TelemetryConfig::load(dir.path().join("telemetry.toml")).unwrap_err();
        assert!(err.is_io());
    }
}
