//! Control-plane trait and common types.

use async_trait::async_trait;
use thiserror::Error;

use crate::resource::ResourceSpec;

/// Errors that can occur while talking to a control plane.
///
/// A resource that simply does not exist is not an error; it is reported as
/// [`Presence::Absent`] by [`ControlPlane::describe`].
#[derive(Error, Debug)]
pub enum ControlPlaneError {
    /// The command-line tool could not be located.
    #[error("{0} not found on PATH")]
    ToolNotFound(String),

    /// The command could not be started at all.
    #[error("Failed to launch `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and reported a failure.
    #[error("`{command}` failed with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The command succeeded but its output could not be understood.
    #[error("Unexpected output from `{command}`")]
    Parse {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    /// The resource spec lacks something the provider needs to address it.
    #[error("Invalid resource spec: {0}")]
    InvalidResource(String),
}

/// Observed remote state of a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// A resource with the requested identity exists.
    Present,
    /// The provider reported a clean "not found".
    Absent,
}

/// Trait for control planes.
///
/// Implementations must treat every call as a single blocking round trip:
/// no retries, no polling, no caching.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Look up a resource by identity.
    async fn describe(&self, spec: &ResourceSpec) -> Result<Presence, ControlPlaneError>;

    /// Create a resource with exactly the declared parameters.
    async fn create(&self, spec: &ResourceSpec) -> Result<(), ControlPlaneError>;
}

#[async_trait]
impl<T: ControlPlane + ?Sized> ControlPlane for &T {
    async fn describe(&self, spec: &ResourceSpec) -> Result<Presence, ControlPlaneError> {
        (**self).describe(spec).await
    }

    async fn create(&self, spec: &ResourceSpec) -> Result<(), ControlPlaneError> {
        (**self).create(spec).await
    }
}
