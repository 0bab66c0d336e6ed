//! GCP (Google Cloud Platform) control plane.
//!
//! Implements the [`ControlPlane`](super::ControlPlane) trait by driving the
//! `gcloud` CLI, one child process per call.
//!
//! ## Services
//!
//! - **Service Usage** - API enablement
//! - **IAM** - Service accounts and project policy bindings
//! - **Cloud Storage** / **Artifact Registry** / **Cloud Build**
//! - **Compute Engine** - Networks, firewall rules, routers, NAT
//! - **Cloud Workstations** - Clusters, configs, workstations

mod client;
mod commands;
mod models;
mod runner;

pub use client::Gcloud;
pub use commands::{is_not_found, service_account_email};
pub use models::{Binding, EnabledService, IamPolicy, ServiceConfig};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
