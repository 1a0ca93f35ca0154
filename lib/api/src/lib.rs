//! # Fabrix API
//!
//! actix-web REST surface: network CRUD, artifact export, validation, peer
//! CLI commands, templates and deployments.

pub mod rest;

pub use rest::{configure, RestApi, SharedRepository};
