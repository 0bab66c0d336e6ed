//! Bootstrap orchestration.
//!
//! Walks the desired resource list in order and reconciles each entry:
//! - One resource at a time, never overlapping
//! - Existing resources are skipped
//! - The first failure stops the run; nothing after it is touched

use std::path::Path;

use tracing::{error, info};
use ws_cloud::{ControlPlane, ResourceId, ResourceSpec};

use crate::config::BootstrapConfig;
use crate::error::ProvisionError;
use crate::plan;
use crate::reconciler::{Outcome, Reconciler};
use crate::report::RunReport;
use crate::ui;
use crate::validator::PrerequisitesValidator;

/// Drives a full bootstrap run against a control plane.
pub struct Provisioner<P> {
    /// Resources in reconciliation order.
    plan: Vec<ResourceSpec>,
    /// Remote control plane.
    plane: P,
}

impl<P: ControlPlane> Provisioner<P> {
    /// Create a provisioner for the resources declared by `config`.
    #[must_use]
    pub fn new(config: &BootstrapConfig, plane: P) -> Self {
        Self::with_plan(plan::desired_resources(config), plane)
    }

    /// Create a provisioner for an explicit resource list.
    #[must_use]
    pub fn with_plan(plan: Vec<ResourceSpec>, plane: P) -> Self {
        Self { plan, plane }
    }

    /// Resources this provisioner will reconcile, in order.
    #[must_use]
    pub fn plan(&self) -> &[ResourceSpec] {
        &self.plan
    }

    /// The control plane in use.
    #[must_use]
    pub fn plane(&self) -> &P {
        &self.plane
    }

    /// Reconcile every resource and return the run report.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProvisionError::RemoteCallFailed`]; resources after
    /// the failing one are not described or created.
    pub async fn run(&self) -> Result<RunReport, ProvisionError> {
        let mut report = RunReport::new();
        self.run_into(&mut report).await?;
        Ok(report)
    }

    /// Reconcile every resource, recording outcomes into `report`.
    ///
    /// On failure the failing resource is recorded as [`Outcome::Failed`]
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProvisionError::RemoteCallFailed`].
    pub async fn run_into(&self, report: &mut RunReport) -> Result<(), ProvisionError> {
        let reconciler = Reconciler::new(&self.plane);
        let total = self.plan.len();

        ui::print_section("Reconciling resources");

        for (index, spec) in self.plan.iter().enumerate() {
            ui::print_progress_step(index + 1, total, &spec.id().to_string());

            let result = reconciler.ensure(spec).await;
            let outcome = match &result {
                Ok(outcome) => outcome.clone(),
                Err(e) => {
                    error!(resource = %spec.id(), error = %e, "Reconciliation failed");
                    Outcome::Failed {
                        reason: error_chain(e),
                    }
                }
            };

            announce(spec.id(), &outcome);
            report.record(spec.id().clone(), outcome);

            if let Err(e) = result {
                report.finish();
                return Err(e);
            }
        }

        report.finish();
        info!(
            created = report.created().count(),
            existing = report.already_existing().count(),
            "Bootstrap complete"
        );
        Ok(())
    }
}

/// Load configuration from `config_path`, check prerequisites, then reconcile
/// every resource on the control plane returned by `connect`.
///
/// `connect` is only called once the configuration and prerequisites are
/// known to be good, so a bad configuration never reaches the control plane.
///
/// # Errors
///
/// Returns [`ProvisionError::ConfigMissing`] or
/// [`ProvisionError::ConfigInvalid`] before any remote call, or the first
/// [`ProvisionError::RemoteCallFailed`] of the run.
pub async fn bootstrap<P, F>(
    config_path: &Path,
    connect: F,
    report: &mut RunReport,
) -> Result<BootstrapConfig, ProvisionError>
where
    P: ControlPlane,
    F: FnOnce(&BootstrapConfig) -> Result<P, ProvisionError>,
{
    let config = BootstrapConfig::load(config_path)?;
    ui::print_kv("Project", &config.project_id);
    ui::print_kv("Region", &config.region);
    ui::print_kv("Image", &config.image_path());
    ui::print_kv("Workstation", &config.workstation_name);
    println!();

    PrerequisitesValidator::for_config(&config).validate()?;

    let plane = connect(&config)?;
    Provisioner::new(&config, plane).run_into(report).await?;
    Ok(config)
}

fn announce(id: &ResourceId, outcome: &Outcome) {
    match outcome {
        Outcome::Created => ui::print_success(&format!("Created {id}")),
        Outcome::AlreadyExists => ui::print_skip(&format!("{id} already exists, skipping")),
        Outcome::Failed { reason } => ui::print_error(&format!("{id}: {reason}")),
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
