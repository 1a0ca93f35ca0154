//! # Fabrix Storage
//!
//! Repository interface for saved networks and deployments, an in-memory
//! implementation, and the deployment lifecycle.

pub mod deployment;
pub mod repository;

pub use deployment::{Deployment, DeploymentPatch, PROGRESS_COMPLETE};
pub use repository::{MemoryRepository, NetworkRepository};
