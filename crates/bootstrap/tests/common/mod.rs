//! Shared fixtures for bootstrap integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ws_cloud::{ControlPlane, ControlPlaneError, Presence, ResourceId, ResourceKind, ResourceSpec};

// =============================================================================
// In-memory control plane
// =============================================================================

/// A control plane call, as seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Describe(ResourceId),
    Create(ResourceId),
}

/// Control plane that keeps resources in memory.
///
/// Created resources become visible to later describes, so repeated runs
/// against the same instance behave like repeated runs against a real
/// project.
#[derive(Default)]
pub struct FakeControlPlane {
    existing: Mutex<HashSet<ResourceId>>,
    calls: Mutex<Vec<Call>>,
    /// Resource name whose describe fails with a non-"not found" error.
    fail_describe: Option<String>,
    /// Resource name whose create fails.
    fail_create: Option<String>,
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_describe(name: &str) -> Self {
        Self {
            fail_describe: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_create(name: &str) -> Self {
        Self {
            fail_create: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Pre-populate a resource as if created out of band.
    pub fn insert(&self, id: ResourceId) {
        self.existing.lock().unwrap().insert(id);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Ids passed to `create`, in call order.
    pub fn created(&self) -> Vec<ResourceId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(id) => Some(id),
                Call::Describe(_) => None,
            })
            .collect()
    }

    /// Names passed to `create` for one kind, in call order.
    pub fn created_names(&self, kind: ResourceKind) -> Vec<String> {
        self.created()
            .into_iter()
            .filter(|id| id.kind == kind)
            .map(|id| id.name)
            .collect()
    }

    /// Position of the create call for `name`.
    pub fn create_position(&self, name: &str) -> usize {
        self.created()
            .iter()
            .position(|id| id.name == name)
            .unwrap_or_else(|| panic!("{name} was never created"))
    }

    fn failure(name: &str, verb: &str) -> ControlPlaneError {
        ControlPlaneError::CommandFailed {
            command: format!("gcloud {verb} {name}"),
            status: "exit code 1".into(),
            stderr: "ERROR: (gcloud) PERMISSION_DENIED: caller lacks permission".into(),
        }
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn describe(&self, spec: &ResourceSpec) -> Result<Presence, ControlPlaneError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Describe(spec.id().clone()));

        if self.fail_describe.as_deref() == Some(spec.name()) {
            return Err(Self::failure(spec.name(), "describe"));
        }

        if self.existing.lock().unwrap().contains(spec.id()) {
            Ok(Presence::Present)
        } else {
            Ok(Presence::Absent)
        }
    }

    async fn create(&self, spec: &ResourceSpec) -> Result<(), ControlPlaneError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Create(spec.id().clone()));

        if self.fail_create.as_deref() == Some(spec.name()) {
            return Err(Self::failure(spec.name(), "create"));
        }

        self.existing.lock().unwrap().insert(spec.id().clone());
        Ok(())
    }
}

// =============================================================================
// Configuration files
// =============================================================================

/// Write a configuration file into `dir` and return its path.
pub fn write_config(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("workstation.env");
    std::fs::write(&path, contents).unwrap();
    path
}
