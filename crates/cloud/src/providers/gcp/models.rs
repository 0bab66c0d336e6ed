//! gcloud JSON output models.

use serde::Deserialize;

// ============================================================================
// Service Usage types
// ============================================================================

/// One entry of `gcloud services list --format=json`.
#[derive(Debug, Clone, Deserialize)]
pub struct EnabledService {
    /// Service configuration.
    pub config: ServiceConfig,
}

/// Service configuration block.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name (e.g. "compute.googleapis.com").
    pub name: String,
}

// ============================================================================
// IAM types
// ============================================================================

/// Project IAM policy as printed by `gcloud projects get-iam-policy`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IamPolicy {
    /// Role bindings.
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// A single role binding.
#[derive(Debug, Clone, Deserialize)]
pub struct Binding {
    /// Role (e.g. "roles/logging.logWriter").
    pub role: String,
    /// Members holding the role.
    #[serde(default)]
    pub members: Vec<String>,
    /// IAM condition, if the binding is conditional.
    #[serde(default)]
    pub condition: Option<serde_json::Value>,
}

impl IamPolicy {
    /// Whether `member` holds `role` unconditionally.
    #[must_use]
    pub fn has_binding(&self, role: &str, member: &str) -> bool {
        self.bindings.iter().any(|b| {
            b.role == role && b.condition.is_none() && b.members.iter().any(|m| m == member)
        })
    }
}
