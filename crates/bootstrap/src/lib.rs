//! Cloud Workstations bootstrap library.
//!
//! This library provides programmatic access to the workstation bootstrap,
//! so the same create-if-absent run can be driven against any
//! [`ControlPlane`](ws_cloud::ControlPlane) implementation.
//!
//! # Example
//!
//! ```ignore
//! use ws_bootstrap::{bootstrap, RunReport};
//! use ws_cloud::gcp::{Gcloud, ProcessRunner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut report = RunReport::new();
//!     bootstrap("workstation.env".as_ref(), |config| {
//!         let program = Gcloud::locate(&config.gcloud).expect("gcloud on PATH");
//!         Ok(Gcloud::with_runner(program, &config.project_id, ProcessRunner))
//!     }, &mut report)
//!     .await?;
//!     Ok(())
//! }
//! ```

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod error;
pub mod naming;
pub mod orchestrator;
pub mod plan;
pub mod reconciler;
pub mod report;
pub mod ui;
pub mod validator;

// Re-export commonly used types at the crate root
pub use config::BootstrapConfig;
pub use error::ProvisionError;
pub use orchestrator::{bootstrap, Provisioner};
pub use reconciler::{Outcome, ReconciliationResult, Reconciler};
pub use report::RunReport;
