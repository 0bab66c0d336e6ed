//! gcloud CLI driver implementation.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::commands::{self, is_not_found, Probe};
use super::models::{EnabledService, IamPolicy};
use super::runner::{CommandOutput, CommandRunner};
use crate::providers::traits::{ControlPlane, ControlPlaneError, Presence};
use crate::resource::ResourceSpec;

/// GCP control plane backed by the `gcloud` CLI.
pub struct Gcloud {
    /// Resolved path to the gcloud binary.
    program: PathBuf,
    /// Project every call is scoped to.
    project_id: String,
    /// Process runner.
    runner: Box<dyn CommandRunner>,
}

impl Gcloud {
    /// Create a driver with an explicit binary and process runner.
    pub fn with_runner(
        program: impl Into<PathBuf>,
        project_id: impl Into<String>,
        runner: impl CommandRunner + 'static,
    ) -> Self {
        Self {
            program: program.into(),
            project_id: project_id.into(),
            runner: Box::new(runner),
        }
    }

    /// Resolve a program name (or path) to an executable.
    ///
    /// # Errors
    /// Returns [`ControlPlaneError::ToolNotFound`] if nothing executable matches.
    pub fn locate(program: &str) -> Result<PathBuf, ControlPlaneError> {
        which::which(program).map_err(|_| ControlPlaneError::ToolNotFound(program.to_string()))
    }

    /// Run gcloud with `args` and capture the result.
    async fn exec(&self, args: &[String]) -> Result<CommandOutput, ControlPlaneError> {
        let command = commands::render(args);
        debug!(command = %command, "Running gcloud");

        let output = self
            .runner
            .run(&self.program, args)
            .await
            .map_err(|source| ControlPlaneError::Spawn {
                command: command.clone(),
                source,
            })?;

        debug!(
            command = %command,
            code = ?output.code,
            stdout = %output.stdout.trim(),
            "gcloud finished"
        );

        Ok(output)
    }

    /// Run gcloud and require a zero exit status.
    async fn exec_checked(&self, args: &[String]) -> Result<CommandOutput, ControlPlaneError> {
        let output = self.exec(args).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(Self::failure(args, &output))
        }
    }

    /// Run gcloud and parse its JSON output.
    async fn exec_json<T: serde::de::DeserializeOwned>(
        &self,
        args: &[String],
    ) -> Result<T, ControlPlaneError> {
        let output = self.exec_checked(args).await?;
        serde_json::from_str(&output.stdout).map_err(|source| {
            warn!(error = %source, body = %output.stdout, "Failed to parse gcloud output");
            ControlPlaneError::Parse {
                command: commands::render(args),
                source,
            }
        })
    }

    fn failure(args: &[String], output: &CommandOutput) -> ControlPlaneError {
        ControlPlaneError::CommandFailed {
            command: commands::render(args),
            status: output.status_text(),
            stderr: output.stderr.trim().to_string(),
        }
    }
}

#[async_trait]
impl ControlPlane for Gcloud {
    async fn describe(&self, spec: &ResourceSpec) -> Result<Presence, ControlPlaneError> {
        let presence = match commands::probe(spec, &self.project_id)? {
            Probe::Describe(args) => {
                let output = self.exec(&args).await?;
                if output.success() {
                    Presence::Present
                } else if is_not_found(&output.stderr) {
                    Presence::Absent
                } else {
                    return Err(Self::failure(&args, &output));
                }
            }
            Probe::EnabledServices(args) => {
                // An empty filtered list prints nothing rather than `[]`.
                let output = self.exec_checked(&args).await?;
                let body = output.stdout.trim();
                let services: Vec<EnabledService> = if body.is_empty() {
                    Vec::new()
                } else {
                    serde_json::from_str(body).map_err(|source| ControlPlaneError::Parse {
                        command: commands::render(&args),
                        source,
                    })?
                };
                if services.iter().any(|s| s.config.name == spec.name()) {
                    Presence::Present
                } else {
                    Presence::Absent
                }
            }
            Probe::IamPolicy(args) => {
                let policy: IamPolicy = self.exec_json(&args).await?;
                let member = spec.parent("member").unwrap_or_default();
                if policy.has_binding(spec.name(), member) {
                    Presence::Present
                } else {
                    Presence::Absent
                }
            }
        };

        debug!(resource = %spec.id(), ?presence, "Described resource");
        Ok(presence)
    }

    async fn create(&self, spec: &ResourceSpec) -> Result<(), ControlPlaneError> {
        let args = commands::create(spec, &self.project_id)?;
        info!(resource = %spec.id(), "Creating resource");

        self.exec_checked(&args).await?;

        info!(resource = %spec.id(), "Resource created");
        Ok(())
    }
}
