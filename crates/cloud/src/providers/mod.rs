//! Control-plane abstractions.
//!
//! This module defines the common trait and error type for control planes.

pub mod gcp;
mod traits;

pub use traits::{ControlPlane, ControlPlaneError, Presence};

// Re-export provider clients
pub use gcp::Gcloud;
