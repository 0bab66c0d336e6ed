//! Error taxonomy for a bootstrap run.

use std::path::PathBuf;

use thiserror::Error;
use ws_cloud::{ControlPlaneError, ResourceId};

/// Errors that abort a bootstrap run.
///
/// Configuration errors are raised before any remote call is made. A remote
/// failure stops the run at the resource that caused it.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The configuration file is absent or unreadable.
    #[error("Configuration file {} could not be read", path.display())]
    ConfigMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration key is missing or has an unusable value.
    #[error("Invalid configuration for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    /// A describe or create call failed for a reason other than "not found".
    #[error("Failed to reconcile {resource}")]
    RemoteCallFailed {
        resource: ResourceId,
        #[source]
        source: ControlPlaneError,
    },
}

impl ProvisionError {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised before touching the control plane.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigMissing { .. } | Self::ConfigInvalid { .. })
    }
}
