//! Derived resource names.
//!
//! Every name here is a pure function of the project id, the region and the
//! declared identifiers, so re-running against the same configuration always
//! addresses the same remote objects.

use ws_cloud::gcp;

/// Service account that runs workstation VMs.
pub const WORKSTATION_SA: &str = "workstation-sa";

/// Service account that runs Cloud Build.
pub const BUILDER_SA: &str = "ws-builder-sa";

/// Email of a service account in `project`.
#[must_use]
pub fn service_account_email(account_id: &str, project: &str) -> String {
    gcp::service_account_email(account_id, project)
}

/// IAM member string for a service account in `project`.
#[must_use]
pub fn service_account_member(account_id: &str, project: &str) -> String {
    format!(
        "serviceAccount:{}",
        service_account_email(account_id, project)
    )
}

/// Fully-qualified service account resource name (used by Cloud Build).
#[must_use]
pub fn service_account_resource(account_id: &str, project: &str) -> String {
    format!(
        "projects/{project}/serviceAccounts/{}",
        service_account_email(account_id, project)
    )
}

/// Bucket for workstation data.
#[must_use]
pub fn data_bucket(project: &str) -> String {
    format!("{project}-ws-data")
}

/// Bucket receiving Cloud Build logs.
#[must_use]
pub fn build_logs_bucket(project: &str) -> String {
    format!("{project}-ws-build-logs")
}

#[must_use]
pub fn network_name(region: &str) -> String {
    format!("ws-net-{region}")
}

#[must_use]
pub fn firewall_name(region: &str) -> String {
    format!("{}-allow-internal", network_name(region))
}

#[must_use]
pub fn router_name(region: &str) -> String {
    format!("ws-router-{region}")
}

#[must_use]
pub fn nat_name(region: &str) -> String {
    format!("ws-nat-{region}")
}

/// Default workstation cluster name for a region.
#[must_use]
pub fn cluster_name(region: &str) -> String {
    format!("ws-cluster-{region}")
}

/// Artifact Registry path of a Docker image.
#[must_use]
pub fn image_path(region: &str, project: &str, repo: &str, image: &str, tag: &str) -> String {
    format!("{region}-docker.pkg.dev/{project}/{repo}/{image}:{tag}")
}

/// Self link of a global VPC network.
#[must_use]
pub fn network_self_link(project: &str, network: &str) -> String {
    format!("projects/{project}/global/networks/{network}")
}

/// Self link of a regional subnetwork.
///
/// Auto-mode networks create one subnetwork per region named after the
/// network itself.
#[must_use]
pub fn subnetwork_self_link(project: &str, region: &str, network: &str) -> String {
    format!("projects/{project}/regions/{region}/subnetworks/{network}")
}
