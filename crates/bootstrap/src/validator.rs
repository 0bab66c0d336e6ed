use colored::Colorize;
use ws_cloud::gcp::Gcloud;

use crate::config::{BootstrapConfig, KEY_BUILD_CONTEXT, KEY_GCLOUD};
use crate::error::ProvisionError;
use crate::ui;

/// Validates local prerequisites before any remote call is made.
pub struct PrerequisitesValidator {
    requirements: Vec<Requirement>,
}

struct Requirement {
    name: String,
    /// Configuration key that controls this requirement.
    key: &'static str,
    check: Box<dyn Fn() -> bool>,
    install_instructions: String,
}

impl PrerequisitesValidator {
    #[must_use]
    pub fn for_config(config: &BootstrapConfig) -> Self {
        let mut requirements = Vec::new();

        // gcloud CLI
        let gcloud = config.gcloud.clone();
        requirements.push(Requirement {
            name: format!("gcloud CLI ({gcloud})"),
            key: KEY_GCLOUD,
            check: Box::new(move || Gcloud::locate(&gcloud).is_ok()),
            install_instructions:
                "Install the Google Cloud CLI from https://cloud.google.com/sdk/docs/install"
                    .to_string(),
        });

        // Container build context
        let dockerfile = config.build_context.join("Dockerfile");
        requirements.push(Requirement {
            name: format!("Build context ({})", config.build_context.display()),
            key: KEY_BUILD_CONTEXT,
            check: Box::new(move || dockerfile.is_file()),
            install_instructions: format!(
                "Point {KEY_BUILD_CONTEXT} at a directory containing a Dockerfile"
            ),
        });

        Self { requirements }
    }

    /// Run every check and report the results.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::ConfigInvalid`] for the first unmet
    /// requirement, after printing all of them.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        let mut failures = Vec::new();

        for requirement in &self.requirements {
            let passed = (requirement.check)();
            ui::print_check_result(&requirement.name, passed, None);
            if !passed {
                failures.push(requirement);
            }
        }

        println!();

        let Some(first) = failures.first() else {
            ui::print_success("All prerequisites met");
            return Ok(());
        };

        for failure in &failures {
            eprintln!(
                "  {} {} - {}",
                "✗".red(),
                failure.name.red(),
                failure.install_instructions.bright_black()
            );
        }

        Err(ProvisionError::invalid(
            first.key,
            format!("{} is not available", first.name),
        ))
    }
}
