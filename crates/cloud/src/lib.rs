//! Control-plane integration for the workstation bootstrap.
//!
//! This crate describes infrastructure resources declaratively and talks to
//! the remote control plane that owns them:
//!
//! - [`resource`] - Resource kinds, identities and declarative specs
//! - [`providers`] - The [`ControlPlane`] trait and its Google Cloud driver
//!
//! ## Control plane contract
//!
//! A control plane answers two questions per resource:
//!
//! 1. **describe** - does a resource with this identity exist?
//! 2. **create** - bring it into existence with exactly these parameters
//!
//! Nothing is cached locally; the remote provider's resource graph is the
//! only source of truth.

pub mod providers;
pub mod resource;

pub use providers::{gcp, ControlPlane, ControlPlaneError, Presence};
pub use resource::{Param, ResourceId, ResourceKind, ResourceSpec};
