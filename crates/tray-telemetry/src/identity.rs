//! Anonymous identity
//!
//! The anonymous id is shared with other Red Hat tooling through
//! `~/.redhat/anonymousId` and is never regenerated while that file is
//! readable. The hash of the last identify payload lives next to the CRC
//! state so an unchanged machine does not re-identify on every launch.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use sysinfo::System;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, TelemetryError};
use crate::sink::ErrorSink;

/// Static machine descriptors attached to the identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Traits {
    /// Long OS version string
    pub tray_os_version: String,
    /// Kernel release
    pub tray_os_release: String,
    /// Platform (linux, darwin, win32)
    pub tray_os: String,
}

impl Traits {
    /// Describe the running machine
    pub fn current() -> Self {
        Self {
            tray_os_version: System::long_os_version().unwrap_or_default(),
            tray_os_release: System::kernel_version().unwrap_or_default(),
            tray_os: platform().to_string(),
        }
    }
}

/// Platform name in the form the analytics dashboards already use
pub fn platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

/// Anonymous user id plus traits; the unit that gets identified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Anonymous user id
    pub user_id: String,
    /// Machine traits
    pub traits: Traits,
}

/// SHA-1 (lowercase hex) over the JSON form of `identity`
pub fn identity_hash(identity: &UserIdentity) -> Result<String> {
    let canonical = serde_json::to_vec(identity)?;
    Ok(format!("{:x}", Sha1::digest(&canonical)))
}

/// Generate a fresh anonymous id
pub fn generate_user_id() -> String {
    Uuid::new_v4().to_string()
}

/// The two identity files on disk
#[derive(Debug, Clone)]
pub struct IdentityStore {
    anonymous_id_path: PathBuf,
    identify_hash_path: PathBuf,
}

impl IdentityStore {
    /// Create a store over explicit paths
    pub fn new(anonymous_id_path: impl Into<PathBuf>, identify_hash_path: impl Into<PathBuf>) -> Self {
        Self {
            anonymous_id_path: anonymous_id_path.into(),
            identify_hash_path: identify_hash_path.into(),
        }
    }

    /// Anonymous id file
    pub fn anonymous_id_path(&self) -> &Path {
        &self.anonymous_id_path
    }

    /// Identify hash file
    pub fn identify_hash_path(&self) -> &Path {
        &self.identify_hash_path
    }

    /// Read the anonymous id, or create and persist a new one.
    ///
    /// File content is taken verbatim. If persisting the new id fails the
    /// freshly generated value is still returned.
    pub fn load_or_create_user_id(&self, sink: &dyn ErrorSink) -> String {
        if let Some(user_id) = read_optional(&self.anonymous_id_path, sink) {
            return user_id;
        }

        let user_id = generate_user_id();
        match write_file(&self.anonymous_id_path, &user_id) {
            Ok(()) => info!(
                "Generated anonymous id at {}",
                self.anonymous_id_path.display()
            ),
            Err(e) => sink.report(&e),
        }
        user_id
    }

    /// Stored identify hash, empty if there is none
    pub fn read_identity_hash(&self, sink: &dyn ErrorSink) -> String {
        read_optional(&self.identify_hash_path, sink).unwrap_or_default()
    }

    /// Persist the identify hash
    pub fn write_identity_hash(&self, hash: &str, sink: &dyn ErrorSink) {
        match write_file(&self.identify_hash_path, hash) {
            Ok(()) => info!(
                "Wrote new identity hash to {}",
                self.identify_hash_path.display()
            ),
            Err(e) => sink.report(&e),
        }
    }
}

/// A missing file is the normal first-run state and only logged at debug.
fn read_optional(path: &Path, sink: &dyn ErrorSink) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} does not exist yet", path.display());
            None
        }
        Err(source) => {
            sink.report(&TelemetryError::FileRead {
                path: path.to_path_buf(),
                source,
            });
            None
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| TelemetryError::FileWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(path, content).map_err(|source| TelemetryError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}
