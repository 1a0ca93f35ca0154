//! # Fabrix Core
//!
//! Compiles a Hyperledger Fabric network topology into the three
//! configuration documents the Fabric toolchain consumes, and validates the
//! topology against a fixed set of structural rules.
//!
//! - [`Topology`] - normalized view of a canvas graph or typed collections
//! - [`build_channel_document`] - `configtx.yaml`
//! - [`build_cert_material_document`] - `crypto-config.yaml`
//! - [`build_orchestration_document`] - `docker-compose.yaml`
//! - [`validate`] - six-rule validation report
//!
//! ## Example
//!
//! ```rust
//! use fabrix_core::{compile, validate_network, Entities, NetworkConfig, Orderer, Organization};
//!
//! let network = NetworkConfig::new("MyNet").with_entities(Entities {
//!     organizations: vec![Organization::new("org1", "Org1")],
//!     orderers: vec![Orderer::new("o1", "orderer")],
//!     ..Default::default()
//! });
//!
//! let artifacts = compile(&network);
//! assert!(artifacts.configtx.contains("OrdererMSP"));
//!
//! let report = validate_network(Some(&network));
//! assert!(!report.has_errors());
//! ```

pub mod error;
pub mod graph;
pub mod model;
pub mod naming;
pub mod extract;
pub mod validation;

/// YAML emitter shared by the document builders
pub mod render;
pub mod configtx;
pub mod crypto;
pub mod compose;
pub mod compile;
pub mod cli;
pub mod templates;

pub use error::{Error, Result};
pub use graph::{Edge, EdgeId, Node, NodeId, NodeKind, Position, TopologyGraph};
pub use model::{
    AnchorPeer, CertificateAuthority, Chaincode, ChaincodeLanguage, Channel, ConsensusKind, Entities,
    NetworkConfig, NetworkPatch, NetworkStatus, Orderer, Organization, Peer,
};
pub use extract::{extract, KindCounts, OrdererProfile, OrgProfile, Topology, TopologyInput};
pub use validation::{
    validate, validate_entities, IssueSeverity, RuleResult, RuleStatus, ValidationIssue, ValidationReport,
};
pub use configtx::build_channel_document;
pub use crypto::build_cert_material_document;
pub use compose::build_orchestration_document;
pub use compile::{
    compile, compile_topology, graph_issues, render_artifact, validate_network, ArtifactKind, Artifacts,
    Compilation,
};
pub use cli::{peer_command, peer_commands, CliContext, CommandEntry, PeerCommand};
pub use templates::{find_template, NetworkTemplate, TEMPLATES};
