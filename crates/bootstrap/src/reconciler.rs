//! Create-if-absent reconciliation of a single resource.

use std::fmt;

use tracing::info;
use ws_cloud::{ControlPlane, ControlPlaneError, Presence, ResourceId, ResourceSpec};

use crate::error::ProvisionError;

/// Outcome of reconciling one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The resource was absent and has been created.
    Created,
    /// The resource already existed; nothing was done.
    AlreadyExists,
    /// Reconciliation failed and the run was aborted here.
    Failed { reason: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::AlreadyExists => write!(f, "already exists"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Per-resource entry of a run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    /// Resource identity.
    pub resource: ResourceId,
    /// What happened to it.
    pub outcome: Outcome,
}

/// Ensures single resources exist on a control plane.
///
/// Existing resources are never compared against the desired parameters:
/// drift is neither detected nor corrected.
pub struct Reconciler<'a> {
    plane: &'a dyn ControlPlane,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub fn new(plane: &'a dyn ControlPlane) -> Self {
        Self { plane }
    }

    /// Make sure `spec` exists, creating it if the control plane reports it
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::RemoteCallFailed`] if the existence check
    /// fails for any reason other than "not found", or if the create call
    /// fails.
    pub async fn ensure(&self, spec: &ResourceSpec) -> Result<Outcome, ProvisionError> {
        let remote = |source: ControlPlaneError| ProvisionError::RemoteCallFailed {
            resource: spec.id().clone(),
            source,
        };

        match self.plane.describe(spec).await.map_err(remote)? {
            Presence::Present => {
                info!(resource = %spec.id(), "Already exists, skipping");
                Ok(Outcome::AlreadyExists)
            }
            Presence::Absent => {
                info!(resource = %spec.id(), "Not found, creating");
                self.plane.create(spec).await.map_err(remote)?;
                Ok(Outcome::Created)
            }
        }
    }
}
