//! Desired state of the workstation environment.
//!
//! [`desired_resources`] returns every resource in the order it must be
//! reconciled. Dependencies are encoded by position: a resource only ever
//! refers to resources that appear earlier in the list.

use ws_cloud::{ResourceKind, ResourceSpec};

use crate::config::BootstrapConfig;
use crate::naming::{self, BUILDER_SA, WORKSTATION_SA};

/// Platform APIs enabled on the project.
pub const APIS: [&str; 6] = [
    "compute.googleapis.com",
    "storage.googleapis.com",
    "artifactregistry.googleapis.com",
    "iam.googleapis.com",
    "workstations.googleapis.com",
    "cloudbuild.googleapis.com",
];

/// Roles granted to the workstation runtime account.
pub const WORKSTATION_ROLES: [&str; 3] = [
    "roles/artifactregistry.reader",
    "roles/logging.logWriter",
    "roles/storage.objectUser",
];

/// Roles granted to the image builder account.
pub const BUILDER_ROLES: [&str; 3] = [
    "roles/artifactregistry.writer",
    "roles/logging.logWriter",
    "roles/storage.objectAdmin",
];

/// Internal ranges of auto-mode VPC subnetworks.
const INTERNAL_SOURCE_RANGE: &str = "10.128.0.0/9";

/// Build the full ordered resource list for `config`.
#[must_use]
pub fn desired_resources(config: &BootstrapConfig) -> Vec<ResourceSpec> {
    let project = config.project_id.as_str();
    let region = config.region.as_str();
    let network = naming::network_name(region);
    let router = naming::router_name(region);
    let image = config.image_path();

    let mut plan = Vec::new();

    // APIs
    plan.extend(
        APIS.iter()
            .map(|api| ResourceSpec::new(ResourceKind::Api, *api)),
    );

    // Service accounts
    plan.push(
        ResourceSpec::new(ResourceKind::ServiceAccount, WORKSTATION_SA)
            .with_param("display-name", "Cloud Workstations runtime"),
    );
    plan.push(
        ResourceSpec::new(ResourceKind::ServiceAccount, BUILDER_SA)
            .with_param("display-name", "Workstation image builder"),
    );

    // Buckets
    for bucket in [
        naming::data_bucket(project),
        naming::build_logs_bucket(project),
    ] {
        plan.push(
            ResourceSpec::new(ResourceKind::Bucket, bucket)
                .in_location(region)
                .with_flag("uniform-bucket-level-access"),
        );
    }

    // Registry
    plan.push(
        ResourceSpec::new(ResourceKind::ArtifactRepository, &config.registry_repo)
            .in_location(region)
            .with_param("repository-format", "docker")
            .with_param("description", "Cloud Workstations images"),
    );

    // IAM bindings
    let grants = WORKSTATION_ROLES
        .iter()
        .map(|role| (WORKSTATION_SA, *role))
        .chain(BUILDER_ROLES.iter().map(|role| (BUILDER_SA, *role)));
    for (account, role) in grants {
        plan.push(
            ResourceSpec::new(ResourceKind::IamBinding, role)
                .with_parent("member", naming::service_account_member(account, project))
                .with_param("condition", "None"),
        );
    }

    // Network
    plan.push(
        ResourceSpec::new(ResourceKind::Network, &network).with_param("subnet-mode", "auto"),
    );
    plan.push(
        ResourceSpec::new(ResourceKind::Firewall, naming::firewall_name(region))
            .with_param("network", &network)
            .with_param("direction", "INGRESS")
            // Workstation agent traffic and SSH from inside the VPC
            .with_param("allow", "tcp:22,tcp:443,tcp:980")
            .with_param("source-ranges", INTERNAL_SOURCE_RANGE),
    );
    plan.push(
        ResourceSpec::new(ResourceKind::Router, &router)
            .in_location(region)
            .with_param("network", &network),
    );
    plan.push(
        ResourceSpec::new(ResourceKind::Nat, naming::nat_name(region))
            .in_location(region)
            .with_parent("router", &router)
            .with_flag("auto-allocate-nat-external-ips")
            .with_flag("nat-all-subnet-ip-ranges"),
    );

    // Container build
    plan.push(
        ResourceSpec::new(ResourceKind::ContainerImage, &image)
            .in_location(region)
            .with_arg(config.build_context.display().to_string())
            .with_param(
                "service-account",
                naming::service_account_resource(BUILDER_SA, project),
            )
            .with_param(
                "gcs-log-dir",
                format!("gs://{}/logs", naming::build_logs_bucket(project)),
            ),
    );

    // Workstations
    plan.push(
        ResourceSpec::new(ResourceKind::WorkstationCluster, &config.cluster_name)
            .in_location(region)
            .with_param("network", naming::network_self_link(project, &network))
            .with_param(
                "subnetwork",
                naming::subnetwork_self_link(project, region, &network),
            ),
    );
    plan.push(
        ResourceSpec::new(ResourceKind::WorkstationConfig, &config.config_name)
            .in_location(region)
            .with_parent("cluster", &config.cluster_name)
            .with_param("machine-type", &config.machine_type)
            .with_param("container-custom-image", &image)
            .with_param("service-account", config.workstation_sa_email())
            .with_param("boot-disk-size", config.boot_disk_size_gb.to_string())
            .with_param("pd-disk-size", config.persistent_disk_size_gb.to_string())
            .with_param("idle-timeout", config.idle_timeout_secs.to_string())
            .with_param("running-timeout", config.running_timeout_secs.to_string()),
    );
    plan.push(
        ResourceSpec::new(ResourceKind::Workstation, &config.workstation_name)
            .in_location(region)
            .with_parent("cluster", &config.cluster_name)
            .with_parent("config", &config.config_name),
    );

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(plan: &[ResourceSpec], kind: ResourceKind) -> usize {
        plan.iter()
            .position(|spec| spec.kind() == kind)
            .unwrap_or_else(|| panic!("{kind} missing from plan"))
    }

    #[test]
    fn test_plan_follows_dependency_order() {
        let plan = desired_resources(&BootstrapConfig::with_defaults("demo"));

        let order = [
            ResourceKind::Api,
            ResourceKind::ServiceAccount,
            ResourceKind::Bucket,
            ResourceKind::ArtifactRepository,
            ResourceKind::IamBinding,
            ResourceKind::Network,
            ResourceKind::Firewall,
            ResourceKind::Router,
            ResourceKind::Nat,
            ResourceKind::ContainerImage,
            ResourceKind::WorkstationCluster,
            ResourceKind::WorkstationConfig,
            ResourceKind::Workstation,
        ];

        let kinds: Vec<ResourceKind> = plan.iter().map(ResourceSpec::kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort_by_key(|kind| order.iter().position(|k| k == kind));
        assert_eq!(kinds, sorted, "plan must be grouped in dependency order");

        for pair in order.windows(2) {
            assert!(position(&plan, pair[0]) < position(&plan, pair[1]));
        }
    }

    #[test]
    fn test_plan_counts() {
        let plan = desired_resources(&BootstrapConfig::with_defaults("demo"));
        let count = |kind| plan.iter().filter(|s| s.kind() == kind).count();

        assert_eq!(count(ResourceKind::Api), 6);
        assert_eq!(count(ResourceKind::ServiceAccount), 2);
        assert_eq!(count(ResourceKind::Bucket), 2);
        assert_eq!(count(ResourceKind::IamBinding), 6);
        assert_eq!(count(ResourceKind::Workstation), 1);
        assert_eq!(plan.len(), 6 + 2 + 2 + 1 + 6 + 4 + 1 + 3);
    }

    #[test]
    fn test_identities_are_unique() {
        let plan = desired_resources(&BootstrapConfig::with_defaults("demo"));
        let ids: std::collections::HashSet<_> = plan.iter().map(|s| s.id().clone()).collect();
        assert_eq!(ids.len(), plan.len());
    }

    #[test]
    fn test_dependents_reference_earlier_resources() {
        let config = BootstrapConfig::with_defaults("demo");
        let plan = desired_resources(&config);

        let router = &plan[position(&plan, ResourceKind::Router)];
        assert_eq!(router.param("network"), Some("ws-net-europe-north1"));

        let nat = &plan[position(&plan, ResourceKind::Nat)];
        assert_eq!(nat.parent("router"), Some(router.name()));

        let image = &plan[position(&plan, ResourceKind::ContainerImage)];
        assert_eq!(
            image.name(),
            "europe-north1-docker.pkg.dev/demo/workstation-image/workstation-image:latest"
        );
        assert_eq!(image.args(), ["container"]);

        let ws_config = &plan[position(&plan, ResourceKind::WorkstationConfig)];
        assert_eq!(ws_config.param("container-custom-image"), Some(image.name()));
        assert_eq!(
            ws_config.param("service-account"),
            Some("workstation-sa@demo.iam.gserviceaccount.com")
        );
        assert_eq!(ws_config.parent("cluster"), Some("ws-cluster-europe-north1"));
    }

    #[test]
    fn test_iam_bindings_target_declared_accounts() {
        let plan = desired_resources(&BootstrapConfig::with_defaults("p"));
        let members: Vec<&str> = plan
            .iter()
            .filter(|s| s.kind() == ResourceKind::IamBinding)
            .filter_map(|s| s.parent("member"))
            .collect();

        assert_eq!(members.len(), 6);
        assert!(members.iter().all(|m| {
            *m == "serviceAccount:workstation-sa@p.iam.gserviceaccount.com"
                || *m == "serviceAccount:ws-builder-sa@p.iam.gserviceaccount.com"
        }));
    }
}
