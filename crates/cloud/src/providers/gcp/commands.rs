//! Mapping from resource specs to `gcloud` argument vectors.
//!
//! Everything here is pure: no processes are spawned.

use crate::providers::ControlPlaneError;
use crate::resource::{Param, ResourceKind, ResourceSpec};

/// How existence of a resource is determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Probe {
    /// A `describe` call; exit status (and stderr) decides.
    Describe(Vec<String>),
    /// A filtered `services list`; a matching entry means enabled.
    EnabledServices(Vec<String>),
    /// A `get-iam-policy` call; the binding must appear in the policy.
    IamPolicy(Vec<String>),
}

/// Email address of a user-managed service account.
#[must_use]
pub fn service_account_email(account_id: &str, project: &str) -> String {
    format!("{account_id}@{project}.iam.gserviceaccount.com")
}

/// Whether gcloud stderr describes a missing resource rather than a failure.
///
/// Only gcloud's own not-found markers count; a bare "404" inside a project
/// id or quota figure does not.
#[must_use]
pub fn is_not_found(stderr: &str) -> bool {
    if stderr.contains("NOT_FOUND") {
        return true;
    }

    let lower = stderr.to_lowercase();
    lower.contains("was not found")
        || lower.contains("not found: 404")
        || lower.contains("httperror 404")
        || lower.contains("does not exist")
}

/// Build the existence probe for a spec.
pub(crate) fn probe(spec: &ResourceSpec, project: &str) -> Result<Probe, ControlPlaneError> {
    validate(spec)?;

    let probe = match spec.kind() {
        ResourceKind::Api => Probe::EnabledServices(with_globals(
            vec![
                "services".into(),
                "list".into(),
                "--enabled".into(),
                format!("--filter=config.name={}", spec.name()),
                "--format=json".into(),
            ],
            project,
        )),
        ResourceKind::IamBinding => Probe::IamPolicy(with_globals(
            vec![
                "projects".into(),
                "get-iam-policy".into(),
                project.to_string(),
                "--format=json".into(),
            ],
            project,
        )),
        _ => {
            let mut args = command_group(spec.kind());
            args.push("describe".into());
            args.push(describe_target(spec, project));
            // Buckets and images are addressed by URL alone.
            if !matches!(
                spec.kind(),
                ResourceKind::Bucket | ResourceKind::ContainerImage
            ) {
                args.extend(identity_flags(spec));
            }
            Probe::Describe(with_globals(args, project))
        }
    };

    Ok(probe)
}

/// Build the create command for a spec.
pub(crate) fn create(spec: &ResourceSpec, project: &str) -> Result<Vec<String>, ControlPlaneError> {
    validate(spec)?;

    let mut args: Vec<String> = match spec.kind() {
        ResourceKind::Api => vec!["services".into(), "enable".into(), spec.name().into()],
        ResourceKind::IamBinding => vec![
            "projects".into(),
            "add-iam-policy-binding".into(),
            project.to_string(),
        ],
        ResourceKind::ContainerImage => vec!["builds".into(), "submit".into()],
        _ => {
            let mut base = command_group(spec.kind());
            base.push("create".into());
            base.push(create_target(spec));
            base
        }
    };

    args.extend(spec.args().iter().cloned());

    match spec.kind() {
        ResourceKind::IamBinding => {
            args.extend(parent_flags(spec));
            args.push(format!("--role={}", spec.name()));
        }
        ResourceKind::ContainerImage => {
            args.push(format!("--tag={}", spec.name()));
            args.extend(location_flag(spec, "region"));
        }
        ResourceKind::Bucket => args.extend(location_flag(spec, "location")),
        _ => args.extend(identity_flags(spec)),
    }

    args.extend(spec.params().iter().map(Param::to_arg));

    Ok(with_globals(args, project))
}

/// Render an argument vector for logs and error messages.
pub(crate) fn render(args: &[String]) -> String {
    let mut rendered = String::from("gcloud");
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

fn validate(spec: &ResourceSpec) -> Result<(), ControlPlaneError> {
    let kind = spec.kind();

    if spec.name().is_empty() {
        return Err(ControlPlaneError::InvalidResource(format!(
            "{kind} has an empty name"
        )));
    }

    if kind.requires_location() && spec.location().is_none() {
        return Err(ControlPlaneError::InvalidResource(format!(
            "{} requires a location",
            spec.id()
        )));
    }

    for key in kind.required_parents() {
        if spec.parent(key).is_none() {
            return Err(ControlPlaneError::InvalidResource(format!(
                "{} requires parent '{key}'",
                spec.id()
            )));
        }
    }

    Ok(())
}

fn command_group(kind: ResourceKind) -> Vec<String> {
    let group: &[&str] = match kind {
        ResourceKind::Api => &["services"],
        ResourceKind::ServiceAccount => &["iam", "service-accounts"],
        ResourceKind::Bucket => &["storage", "buckets"],
        ResourceKind::ArtifactRepository => &["artifacts", "repositories"],
        ResourceKind::IamBinding => &["projects"],
        ResourceKind::Network => &["compute", "networks"],
        ResourceKind::Firewall => &["compute", "firewall-rules"],
        ResourceKind::Router => &["compute", "routers"],
        ResourceKind::Nat => &["compute", "routers", "nats"],
        ResourceKind::ContainerImage => &["artifacts", "docker", "images"],
        ResourceKind::WorkstationCluster => &["workstations", "clusters"],
        ResourceKind::WorkstationConfig => &["workstations", "configs"],
        ResourceKind::Workstation => &["workstations"],
    };
    group.iter().map(ToString::to_string).collect()
}

/// The positional argument that names the resource on describe.
fn describe_target(spec: &ResourceSpec, project: &str) -> String {
    match spec.kind() {
        // Describe takes the email; create takes the bare account id.
        ResourceKind::ServiceAccount => service_account_email(spec.name(), project),
        _ => create_target(spec),
    }
}

/// The positional argument that names the resource on create.
fn create_target(spec: &ResourceSpec) -> String {
    match spec.kind() {
        ResourceKind::Bucket => format!("gs://{}", spec.name()),
        _ => spec.name().to_string(),
    }
}

fn identity_flags(spec: &ResourceSpec) -> Vec<String> {
    let mut flags = parent_flags(spec);
    match spec.kind() {
        ResourceKind::ArtifactRepository => flags.extend(location_flag(spec, "location")),
        ResourceKind::Router
        | ResourceKind::Nat
        | ResourceKind::WorkstationCluster
        | ResourceKind::WorkstationConfig
        | ResourceKind::Workstation => flags.extend(location_flag(spec, "region")),
        _ => {}
    }
    flags
}

fn parent_flags(spec: &ResourceSpec) -> Vec<String> {
    spec.id()
        .parents
        .iter()
        .map(|(key, value)| format!("--{key}={value}"))
        .collect()
}

fn location_flag(spec: &ResourceSpec, flag: &str) -> Option<String> {
    spec.location().map(|location| format!("--{flag}={location}"))
}

fn with_globals(mut args: Vec<String>, project: &str) -> Vec<String> {
    args.push(format!("--project={project}"));
    args.push("--quiet".into());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(args: &[String]) -> Vec<&str> {
        args.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_service_account_email() {
        assert_eq!(
            service_account_email("workstation-sa", "p"),
            "workstation-sa@p.iam.gserviceaccount.com"
        );
    }

    #[test]
    fn test_not_found_classification() {
        assert!(is_not_found(
            "ERROR: (gcloud.compute.networks.describe) Could not fetch resource:\n - The resource 'projects/demo/global/networks/ws-net' was not found"
        ));
        assert!(is_not_found(
            "ERROR: (gcloud.artifacts.repositories.describe) NOT_FOUND: Requested entity was not found."
        ));
        assert!(is_not_found(
            "ERROR: (gcloud.storage.buckets.describe) gs://demo-ws-data not found: 404."
        ));
        assert!(!is_not_found(
            "ERROR: (gcloud.compute.networks.describe) PERMISSION_DENIED: Required 'compute.networks.get' permission"
        ));
        assert!(is_not_found(
            "ERROR: (gcloud.workstations.configs.describe) HTTPError 404: Resource not found"
        ));
        assert!(!is_not_found(""));
    }

    #[test]
    fn test_unrelated_404_is_not_a_miss() {
        assert!(!is_not_found(
            "ERROR: (gcloud.compute.routers.describe) Could not fetch resource:\n - Required 'compute.routers.get' permission for 'projects/shop-404/regions/europe-north1/routers/ws-router-europe-north1'"
        ));
        assert!(!is_not_found(
            "ERROR: (gcloud.compute.networks.describe) RESOURCE_EXHAUSTED: quota metric 404 exceeded"
        ));
    }

    #[test]
    fn test_network_commands() {
        let spec = ResourceSpec::new(ResourceKind::Network, "ws-net-europe-north1")
            .with_param("subnet-mode", "auto");

        let Probe::Describe(describe) = probe(&spec, "demo").unwrap() else {
            panic!("expected describe probe");
        };
        assert_eq!(
            strs(&describe),
            vec![
                "compute",
                "networks",
                "describe",
                "ws-net-europe-north1",
                "--project=demo",
                "--quiet"
            ]
        );

        let create = create(&spec, "demo").unwrap();
        assert_eq!(
            strs(&create),
            vec![
                "compute",
                "networks",
                "create",
                "ws-net-europe-north1",
                "--subnet-mode=auto",
                "--project=demo",
                "--quiet"
            ]
        );
    }

    #[test]
    fn test_nat_carries_router_and_region() {
        let spec = ResourceSpec::new(ResourceKind::Nat, "ws-nat-europe-north1")
            .in_location("europe-north1")
            .with_parent("router", "ws-router-europe-north1")
            .with_flag("auto-allocate-nat-external-ips");

        let Probe::Describe(describe) = probe(&spec, "demo").unwrap() else {
            panic!("expected describe probe");
        };
        assert_eq!(
            strs(&describe),
            vec![
                "compute",
                "routers",
                "nats",
                "describe",
                "ws-nat-europe-north1",
                "--router=ws-router-europe-north1",
                "--region=europe-north1",
                "--project=demo",
                "--quiet"
            ]
        );

        let create = create(&spec, "demo").unwrap();
        assert!(create.contains(&"--router=ws-router-europe-north1".to_string()));
        assert!(create.contains(&"--auto-allocate-nat-external-ips".to_string()));
    }

    #[test]
    fn test_bucket_location_only_on_create() {
        let spec = ResourceSpec::new(ResourceKind::Bucket, "demo-ws-data")
            .in_location("europe-north1")
            .with_flag("uniform-bucket-level-access");

        let Probe::Describe(describe) = probe(&spec, "demo").unwrap() else {
            panic!("expected describe probe");
        };
        assert_eq!(
            strs(&describe),
            vec!["storage", "buckets", "describe", "gs://demo-ws-data", "--project=demo", "--quiet"]
        );

        let create = create(&spec, "demo").unwrap();
        assert_eq!(
            strs(&create),
            vec![
                "storage",
                "buckets",
                "create",
                "gs://demo-ws-data",
                "--location=europe-north1",
                "--uniform-bucket-level-access",
                "--project=demo",
                "--quiet"
            ]
        );
    }

    #[test]
    fn test_service_account_describe_uses_email() {
        let spec = ResourceSpec::new(ResourceKind::ServiceAccount, "workstation-sa")
            .with_param("display-name", "Workstation runtime");

        let Probe::Describe(describe) = probe(&spec, "demo").unwrap() else {
            panic!("expected describe probe");
        };
        assert_eq!(describe[3], "workstation-sa@demo.iam.gserviceaccount.com");

        let create = create(&spec, "demo").unwrap();
        assert_eq!(
            strs(&create)[..5],
            [
                "iam",
                "service-accounts",
                "create",
                "workstation-sa",
                "--display-name=Workstation runtime"
            ]
        );
    }

    #[test]
    fn test_image_build_command() {
        let image = "europe-north1-docker.pkg.dev/demo/workstation-image/workstation-image:latest";
        let spec = ResourceSpec::new(ResourceKind::ContainerImage, image)
            .in_location("europe-north1")
            .with_arg("container");

        let Probe::Describe(describe) = probe(&spec, "demo").unwrap() else {
            panic!("expected describe probe");
        };
        assert_eq!(
            strs(&describe),
            vec!["artifacts", "docker", "images", "describe", image, "--project=demo", "--quiet"]
        );

        let tag = format!("--tag={image}");
        let create = create(&spec, "demo").unwrap();
        assert_eq!(
            strs(&create)[..5],
            ["builds", "submit", "container", tag.as_str(), "--region=europe-north1"]
        );
    }

    #[test]
    fn test_iam_binding_commands() {
        let spec = ResourceSpec::new(ResourceKind::IamBinding, "roles/logging.logWriter")
            .with_parent("member", "serviceAccount:workstation-sa@demo.iam.gserviceaccount.com")
            .with_param("condition", "None");

        assert_eq!(
            probe(&spec, "demo").unwrap(),
            Probe::IamPolicy(
                ["projects", "get-iam-policy", "demo", "--format=json", "--project=demo", "--quiet"]
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            )
        );

        let create = create(&spec, "demo").unwrap();
        assert_eq!(
            strs(&create),
            vec![
                "projects",
                "add-iam-policy-binding",
                "demo",
                "--member=serviceAccount:workstation-sa@demo.iam.gserviceaccount.com",
                "--role=roles/logging.logWriter",
                "--condition=None",
                "--project=demo",
                "--quiet"
            ]
        );
    }

    #[test]
    fn test_api_probe_filters_by_name() {
        let spec = ResourceSpec::new(ResourceKind::Api, "workstations.googleapis.com");
        let Probe::EnabledServices(args) = probe(&spec, "demo").unwrap() else {
            panic!("expected services probe");
        };
        assert!(args.contains(&"--filter=config.name=workstations.googleapis.com".to_string()));
        assert_eq!(
            strs(&create(&spec, "demo").unwrap())[..3],
            ["services", "enable", "workstations.googleapis.com"]
        );
    }

    #[test]
    fn test_missing_parent_is_rejected() {
        let spec = ResourceSpec::new(ResourceKind::Workstation, "ws-dev")
            .in_location("europe-north1")
            .with_parent("cluster", "ws-cluster");

        let err = probe(&spec, "demo").unwrap_err();
        assert!(err.to_string().contains("requires parent 'config'"));
    }

    #[test]
    fn test_missing_location_is_rejected() {
        let spec = ResourceSpec::new(ResourceKind::Router, "ws-router");
        assert!(matches!(
            create(&spec, "demo"),
            Err(ControlPlaneError::InvalidResource(_))
        ));
    }

    #[test]
    fn test_render() {
        let args = vec!["compute".to_string(), "networks".to_string(), "list".to_string()];
        assert_eq!(render(&args), "gcloud compute networks list");
    }
}
