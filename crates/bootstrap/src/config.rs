//! Bootstrap configuration.
//!
//! Configuration comes from a key-value file (`KEY=value` lines, `#`
//! comments, optional quoting), the same format a shell would `source`.
//! Only `PROJECT_ID` is required; everything else has a default.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::ProvisionError;
use crate::naming;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "workstation.env";

pub const KEY_PROJECT_ID: &str = "PROJECT_ID";
pub const KEY_REGION: &str = "REGION";
pub const KEY_REGISTRY_REPO: &str = "REGISTRY_REPO";
pub const KEY_IMAGE_NAME: &str = "IMAGE_NAME";
pub const KEY_IMAGE_TAG: &str = "IMAGE_TAG";
pub const KEY_BUILD_CONTEXT: &str = "BUILD_CONTEXT";
pub const KEY_CLUSTER_NAME: &str = "CLUSTER_NAME";
pub const KEY_CONFIG_NAME: &str = "CONFIG_NAME";
pub const KEY_WORKSTATION_NAME: &str = "WORKSTATION_NAME";
pub const KEY_MACHINE_TYPE: &str = "MACHINE_TYPE";
pub const KEY_BOOT_DISK_SIZE_GB: &str = "BOOT_DISK_SIZE_GB";
pub const KEY_PERSISTENT_DISK_SIZE_GB: &str = "PERSISTENT_DISK_SIZE_GB";
pub const KEY_IDLE_TIMEOUT_SECONDS: &str = "IDLE_TIMEOUT_SECONDS";
pub const KEY_RUNNING_TIMEOUT_SECONDS: &str = "RUNNING_TIMEOUT_SECONDS";
pub const KEY_GCLOUD: &str = "GCLOUD";

static PROJECT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]([a-z0-9-]{0,28}[a-z0-9])?$").expect("valid regex"));
static REGION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+(-[a-z]+)+[0-9]+$").expect("valid regex"));
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]([-a-z0-9]{0,61}[a-z0-9])?$").expect("valid regex"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").expect("valid regex"));

/// Full bootstrap configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    // Project
    /// Project every resource is created in.
    pub project_id: String,
    /// Region for all regional resources (e.g., "europe-north1").
    pub region: String,

    // Image
    /// Artifact Registry repository holding the workstation image.
    pub registry_repo: String,
    /// Image name within the repository.
    pub image_name: String,
    /// Image tag.
    pub image_tag: String,
    /// Directory uploaded to Cloud Build. Relative paths are resolved against
    /// the directory containing the configuration file.
    pub build_context: PathBuf,

    // Workstations
    /// Workstation cluster name.
    pub cluster_name: String,
    /// Workstation configuration name.
    pub config_name: String,
    /// Workstation instance name.
    pub workstation_name: String,
    /// Machine type for workstation VMs.
    pub machine_type: String,
    /// Boot disk size in GB.
    pub boot_disk_size_gb: u32,
    /// Persistent home disk size in GB.
    pub persistent_disk_size_gb: u32,
    /// Idle shutdown timeout in seconds.
    pub idle_timeout_secs: u32,
    /// Maximum running time in seconds.
    pub running_timeout_secs: u32,

    // Tooling
    /// gcloud binary name or path.
    pub gcloud: String,
}

impl BootstrapConfig {
    /// Create config with defaults for a given project.
    #[must_use]
    pub fn with_defaults(project_id: impl Into<String>) -> Self {
        let region = "europe-north1".to_string();
        Self {
            project_id: project_id.into(),
            cluster_name: naming::cluster_name(&region),
            region,
            registry_repo: "workstation-image".into(),
            image_name: "workstation-image".into(),
            image_tag: "latest".into(),
            build_context: PathBuf::from("container"),
            config_name: "ws-config".into(),
            workstation_name: "ws-dev".into(),
            machine_type: "e2-standard-4".into(),
            boot_disk_size_gb: 50,
            persistent_disk_size_gb: 200,
            idle_timeout_secs: 7200,
            running_timeout_secs: 43200,
            gcloud: "gcloud".into(),
        }
    }

    /// Load and validate configuration from a key-value file.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::ConfigMissing`] if the file cannot be read and
    /// [`ProvisionError::ConfigInvalid`] if it is malformed or a required key
    /// is missing.
    pub fn load(path: &Path) -> Result<Self, ProvisionError> {
        let iter = dotenvy::from_path_iter(path).map_err(|e| map_dotenv_error(path, e))?;

        let mut pairs = Vec::new();
        for item in iter {
            pairs.push(item.map_err(|e| map_dotenv_error(path, e))?);
        }
        debug!(path = %path.display(), keys = pairs.len(), "Loaded configuration file");

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_pairs(pairs, base_dir)
    }

    /// Build configuration from key-value pairs.
    ///
    /// Later pairs override earlier ones; unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::ConfigInvalid`] if a required key is missing
    /// or any value fails validation.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (String, String)>,
        base_dir: &Path,
    ) -> Result<Self, ProvisionError> {
        let values: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k, v.trim().to_string()))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        let project_id = values.get(KEY_PROJECT_ID).cloned().ok_or_else(|| {
            ProvisionError::invalid(KEY_PROJECT_ID, "required key is missing or empty")
        })?;

        let mut config = Self::with_defaults(project_id);

        if let Some(region) = values.get(KEY_REGION) {
            config.region.clone_from(region);
            config.cluster_name = naming::cluster_name(region);
        }

        let strings = [
            (KEY_REGISTRY_REPO, &mut config.registry_repo),
            (KEY_IMAGE_NAME, &mut config.image_name),
            (KEY_IMAGE_TAG, &mut config.image_tag),
            (KEY_CLUSTER_NAME, &mut config.cluster_name),
            (KEY_CONFIG_NAME, &mut config.config_name),
            (KEY_WORKSTATION_NAME, &mut config.workstation_name),
            (KEY_MACHINE_TYPE, &mut config.machine_type),
            (KEY_GCLOUD, &mut config.gcloud),
        ];
        for (key, field) in strings {
            if let Some(value) = values.get(key) {
                field.clone_from(value);
            }
        }

        let numbers = [
            (KEY_BOOT_DISK_SIZE_GB, &mut config.boot_disk_size_gb),
            (KEY_PERSISTENT_DISK_SIZE_GB, &mut config.persistent_disk_size_gb),
            (KEY_IDLE_TIMEOUT_SECONDS, &mut config.idle_timeout_secs),
            (KEY_RUNNING_TIMEOUT_SECONDS, &mut config.running_timeout_secs),
        ];
        for (key, field) in numbers {
            if let Some(value) = values.get(key) {
                *field = parse_positive(key, value)?;
            }
        }

        let build_context = values
            .get(KEY_BUILD_CONTEXT)
            .map_or_else(|| config.build_context.clone(), PathBuf::from);
        config.build_context = if build_context.is_absolute() {
            build_context
        } else {
            base_dir.join(build_context)
        };

        config.validate()?;
        Ok(config)
    }

    /// Check identifiers against the provider's naming rules.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::ConfigInvalid`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        check(
            KEY_PROJECT_ID,
            &self.project_id,
            &PROJECT_ID_RE,
            "must start with a lowercase letter and contain only lowercase letters, digits and hyphens",
        )?;
        check(
            KEY_REGION,
            &self.region,
            &REGION_RE,
            "must look like a region name such as europe-north1",
        )?;

        let names = [
            (KEY_REGISTRY_REPO, &self.registry_repo),
            (KEY_IMAGE_NAME, &self.image_name),
            (KEY_CLUSTER_NAME, &self.cluster_name),
            (KEY_CONFIG_NAME, &self.config_name),
            (KEY_WORKSTATION_NAME, &self.workstation_name),
        ];
        for (key, value) in names {
            check(
                key,
                value,
                &NAME_RE,
                "must be 1-63 lowercase letters, digits or hyphens, starting with a letter",
            )?;
        }

        check(
            KEY_IMAGE_TAG,
            &self.image_tag,
            &TAG_RE,
            "is not a valid image tag",
        )?;

        if self.machine_type.is_empty() {
            return Err(ProvisionError::invalid(KEY_MACHINE_TYPE, "must not be empty"));
        }

        Ok(())
    }

    /// Artifact Registry path of the workstation image.
    #[must_use]
    pub fn image_path(&self) -> String {
        naming::image_path(
            &self.region,
            &self.project_id,
            &self.registry_repo,
            &self.image_name,
            &self.image_tag,
        )
    }

    /// Email of the workstation runtime service account.
    #[must_use]
    pub fn workstation_sa_email(&self) -> String {
        naming::service_account_email(naming::WORKSTATION_SA, &self.project_id)
    }

    #[must_use]
    pub fn network_name(&self) -> String {
        naming::network_name(&self.region)
    }
}

fn check(key: &str, value: &str, re: &Regex, reason: &str) -> Result<(), ProvisionError> {
    if re.is_match(value) {
        Ok(())
    } else {
        Err(ProvisionError::invalid(key, format!("'{value}' {reason}")))
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u32, ProvisionError> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ProvisionError::invalid(
            key,
            format!("'{value}' is not a positive integer"),
        )),
    }
}

fn map_dotenv_error(path: &Path, err: dotenvy::Error) -> ProvisionError {
    match err {
        dotenvy::Error::Io(source) => ProvisionError::ConfigMissing {
            path: path.to_path_buf(),
            source,
        },
        dotenvy::Error::LineParse(line, index) => ProvisionError::invalid(
            path.display().to_string(),
            format!("cannot parse '{line}' at position {index}"),
        ),
        other => ProvisionError::invalid(path.display().to_string(), other.to_string()),
    }
}
