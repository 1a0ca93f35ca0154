//! Whole-network compilation: extract once, build all three documents,
//! validate, and optionally write the files to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::compose::build_orchestration_document;
use crate::configtx::build_channel_document;
use crate::crypto::build_cert_material_document;
use crate::error::{Error, Result};
use crate::extract::Topology;
use crate::graph::TopologyGraph;
use crate::model::{Entities, NetworkConfig};
use crate::validation::{validate_entities, ValidationIssue, ValidationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Configtx,
    CryptoConfig,
    DockerCompose,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Configtx,
        ArtifactKind::CryptoConfig,
        ArtifactKind::DockerCompose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Configtx => "configtx",
            ArtifactKind::CryptoConfig => "crypto-config",
            ArtifactKind::DockerCompose => "docker-compose",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Configtx => "configtx.yaml",
            ArtifactKind::CryptoConfig => "crypto-config.yaml",
            ArtifactKind::DockerCompose => "docker-compose.yaml",
        }
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown artifact '{}'", s)))
    }
}

/// The three rendered documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifacts {
    pub configtx: String,
    pub crypto_config: String,
    pub docker_compose: String,
}

impl Artifacts {
    pub fn get(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Configtx => &self.configtx,
            ArtifactKind::CryptoConfig => &self.crypto_config,
            ArtifactKind::DockerCompose => &self.docker_compose,
        }
    }

    /// Write every document into `dir`, creating it if needed.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(ArtifactKind::ALL.len());
        for kind in ArtifactKind::ALL {
            let path = dir.join(kind.file_name());
            fs::write(&path, self.get(kind))?;
            debug!(path = %path.display(), "Wrote artifact");
            written.push(path);
        }
        info!(dir = %dir.display(), files = written.len(), "Artifacts written");
        Ok(written)
    }
}

/// Render one document for `topology`.
pub fn render_artifact(topology: &Topology, kind: ArtifactKind) -> String {
    let orgs = &topology.organizations;
    let orderers = &topology.orderers;
    match kind {
        ArtifactKind::Configtx => build_channel_document(
            &topology.network_name,
            topology.consensus,
            &topology.channel_name,
            orgs,
            orderers,
        ),
        ArtifactKind::CryptoConfig => build_cert_material_document(&topology.network_name, orgs, orderers),
        ArtifactKind::DockerCompose => build_orchestration_document(&topology.network_name, orgs, orderers),
    }
}

pub fn compile_topology(topology: &Topology) -> Artifacts {
    Artifacts {
        configtx: render_artifact(topology, ArtifactKind::Configtx),
        crypto_config: render_artifact(topology, ArtifactKind::CryptoConfig),
        docker_compose: render_artifact(topology, ArtifactKind::DockerCompose),
    }
}

pub fn compile(network: &NetworkConfig) -> Artifacts {
    compile_topology(&Topology::from_network(network))
}

/// Six-rule report for a saved network. A missing network is validated as
/// an empty one, so the two existence rules fail and the rest pass.
pub fn validate_network(network: Option<&NetworkConfig>) -> ValidationReport {
    match network {
        Some(network) => validate_entities(&Topology::from_network(network).entities),
        None => validate_entities(&Entities::default()),
    }
}

/// Everything a stateless compile request returns
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Compilation {
    pub artifacts: Artifacts,
    pub report: ValidationReport,
    pub graph_issues: Vec<ValidationIssue>,
}

impl Compilation {
    pub fn run(network: &NetworkConfig) -> Self {
        let topology = Topology::from_network(network);
        Self {
            artifacts: compile_topology(&topology),
            report: validate_entities(&topology.entities),
            graph_issues: graph_issues(network),
        }
    }
}

/// Integrity lint of the saved canvas graph
pub fn graph_issues(network: &NetworkConfig) -> Vec<ValidationIssue> {
    TopologyGraph::new(&network.nodes, &network.edges).integrity_issues()
}
