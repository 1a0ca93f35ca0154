//! # Fabrix
//!
//! Compiles a visual Hyperledger Fabric network topology into the
//! configuration documents the Fabric toolchain consumes.
//!
//! From a canvas graph (organizations, peers, orderers, CAs, channels,
//! chaincodes and the edges between them) or from typed collections, fabrix
//! renders:
//!
//! - `configtx.yaml` - organizations, policies, capabilities and profiles
//! - `crypto-config.yaml` - identity material for `cryptogen`
//! - `docker-compose.yaml` - one service per orderer and two per organization
//!
//! and validates the topology against six structural rules.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! cargo install fabrix
//! fabrix serve --http-port 5000
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use fabrix::prelude::*;
//!
//! let network = NetworkConfig::new("MyNet")
//!     .with_consensus(ConsensusKind::EtcdRaft)
//!     .with_entities(Entities {
//!         organizations: vec![Organization::new("org1", "Org1")],
//!         orderers: vec![Orderer::new("o1", "orderer")],
//!         ..Default::default()
//!     });
//!
//! let artifacts = compile(&network);
//! artifacts.write_to("./artifacts").unwrap();
//!
//! let report = validate_network(Some(&network));
//! println!("{} warnings", report.warning_count());
//! ```
//!
//! ## Crate Structure
//!
//! - [`fabrix-core`](https://docs.rs/fabrix-core) - Model, extractor, document builders, validation
//! - [`fabrix-storage`](https://docs.rs/fabrix-storage) - Repository interface, in-memory store, deployments
//! - [`fabrix-api`](https://docs.rs/fabrix-api) - REST API

// Re-export core types
pub use fabrix_core::{
    build_cert_material_document, build_channel_document, build_orchestration_document, compile,
    extract, peer_command, validate, validate_entities, validate_network, ArtifactKind, Artifacts,
    CertificateAuthority, Chaincode, Channel, Compilation, ConsensusKind, Edge, Entities, Error,
    NetworkConfig, NetworkPatch, NetworkStatus, Node, NodeKind, Orderer, Organization, Peer,
    PeerCommand, Result, Topology, TopologyInput, ValidationIssue, ValidationReport,
};

// Re-export storage
pub use fabrix_storage::{Deployment, DeploymentPatch, MemoryRepository, NetworkRepository};

// Re-export API
pub use fabrix_api::{RestApi, SharedRepository};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        compile, validate_network, ArtifactKind, Artifacts, ConsensusKind, Edge, Entities, Error,
        MemoryRepository, NetworkConfig, NetworkRepository, Node, NodeKind, Orderer, Organization,
        Peer, Result, RestApi, Topology, ValidationReport,
    };
}

/// Hostname, port and crypto-path conventions shared by every document
pub use fabrix_core::naming;

pub use fabrix_core::templates::{find_template, NetworkTemplate, TEMPLATES};
