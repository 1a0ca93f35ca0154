//! Typed network entities
//!
//! These mirror the records an editing session keeps next to the canvas
//! graph. Every struct serializes with camelCase keys so the JSON exchanged
//! with the browser and stored by the repository keeps one shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::{Edge, Node};
use crate::naming;

/// Ordering algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConsensusKind {
    #[default]
    #[serde(rename = "etcdraft", alias = "raft")]
    EtcdRaft,
    #[serde(rename = "bft")]
    Bft,
    #[serde(rename = "solo")]
    Solo,
}

impl ConsensusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusKind::EtcdRaft => "etcdraft",
            ConsensusKind::Bft => "bft",
            ConsensusKind::Solo => "solo",
        }
    }
}

impl std::fmt::Display for ConsensusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConsensusKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "etcdraft" | "raft" => Ok(ConsensusKind::EtcdRaft),
            "bft" => Ok(ConsensusKind::Bft),
            "solo" => Ok(ConsensusKind::Solo),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown consensus type '{}'",
                other
            ))),
        }
    }
}

/// Lifecycle status shared by saved networks and deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkStatus {
    Active,
    Deploying,
    Stopped,
    Error,
}

impl NetworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkStatus::Active => "active",
            NetworkStatus::Deploying => "deploying",
            NetworkStatus::Stopped => "stopped",
            NetworkStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorPeer {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    /// Empty means "derive from the name"
    #[serde(default)]
    pub msp_id: String,
    /// Empty means "derive from the name"
    #[serde(default)]
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_peers: Option<Vec<AnchorPeer>>,
}

impl Organization {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_msp_id(mut self, msp_id: impl Into<String>) -> Self {
        self.msp_id = msp_id.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Explicit mspId, or `<Name>MSP`
    pub fn resolved_msp_id(&self) -> String {
        if self.msp_id.is_empty() {
            naming::default_msp_id(&self.name)
        } else {
            self.msp_id.clone()
        }
    }

    /// Explicit domain, or `<name>.example.com`
    pub fn resolved_domain(&self) -> String {
        if self.domain.is_empty() {
            naming::default_domain(&self.name)
        } else {
            self.domain.clone()
        }
    }

    /// Fill in the derivable defaults. Applying this twice is a no-op.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.msp_id = self.resolved_msp_id();
        self.domain = self.resolved_domain();
        self
    }
}

fn default_peer_port() -> u16 {
    naming::PEER_LISTEN_PORT
}

fn default_orderer_port() -> u16 {
    naming::ORDERER_LISTEN_PORT
}

fn default_ca_port() -> u16 {
    naming::CA_LISTEN_PORT
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_peer_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub tls_enabled: bool,
    #[serde(default)]
    pub couch_db_enabled: bool,
}

impl Peer {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, organization_id: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            host: name.clone(),
            name,
            organization_id: organization_id.into(),
            port: default_peer_port(),
            tls_enabled: true,
            couch_db_enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orderer {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_orderer_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub tls_enabled: bool,
}

impl Orderer {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            host: name.clone(),
            name,
            organization_id: None,
            port: default_orderer_port(),
            tls_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAuthority {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_ca_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub tls_enabled: bool,
}

impl CertificateAuthority {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, organization_id: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            host: name.clone(),
            name,
            organization_id: organization_id.into(),
            port: default_ca_port(),
            tls_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "organizations")]
    pub organization_ids: Vec<String>,
    #[serde(default, alias = "orderers")]
    pub orderer_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChaincodeLanguage {
    #[default]
    Go,
    Node,
    Java,
}

fn default_chaincode_version() -> String {
    "1.0".to_string()
}

/// Smart-contract unit bound to a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chaincode {
    pub id: String,
    pub name: String,
    #[serde(default = "default_chaincode_version")]
    pub version: String,
    #[serde(default)]
    pub language: ChaincodeLanguage,
    #[serde(default)]
    pub channel_id: String,
}

impl Chaincode {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: default_chaincode_version(),
            language: ChaincodeLanguage::Go,
            channel_id: channel_id.into(),
        }
    }
}

/// The six typed collections, either maintained directly by a caller or
/// derived from a canvas graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entities {
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub peers: Vec<Peer>,
    #[serde(default)]
    pub orderers: Vec<Orderer>,
    #[serde(default)]
    pub cas: Vec<CertificateAuthority>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub chaincodes: Vec<Chaincode>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty()
            && self.peers.is_empty()
            && self.orderers.is_empty()
            && self.cas.is_empty()
            && self.channels.is_empty()
            && self.chaincodes.is_empty()
    }
}

fn default_network_name() -> String {
    "fabric-network".to_string()
}

fn default_channel_name() -> String {
    "mychannel".to_string()
}

/// Aggregate root saved by the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_network_name")]
    pub name: String,
    #[serde(default, rename = "consensusType")]
    pub consensus: ConsensusKind,
    #[serde(default = "default_channel_name")]
    pub channel_name: String,
    #[serde(flatten)]
    pub entities: Entities,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NetworkStatus>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: default_network_name(),
            consensus: ConsensusKind::default(),
            channel_name: default_channel_name(),
            entities: Entities::default(),
            nodes: Vec::new(),
            edges: Vec::new(),
            created_at: None,
            updated_at: None,
            status: None,
        }
    }
}

impl NetworkConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_consensus(mut self, consensus: ConsensusKind) -> Self {
        self.consensus = consensus;
        self
    }

    #[must_use]
    pub fn with_channel_name(mut self, channel_name: impl Into<String>) -> Self {
        self.channel_name = channel_name.into();
        self
    }

    #[must_use]
    pub fn with_entities(mut self, entities: Entities) -> Self {
        self.entities = entities;
        self
    }

    #[must_use]
    pub fn with_graph(mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        self.nodes = nodes;
        self.edges = edges;
        self
    }
}

/// Partial update applied by `update_network`; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPatch {
    pub name: Option<String>,
    #[serde(rename = "consensusType")]
    pub consensus: Option<ConsensusKind>,
    pub channel_name: Option<String>,
    pub organizations: Option<Vec<Organization>>,
    pub peers: Option<Vec<Peer>>,
    pub orderers: Option<Vec<Orderer>>,
    pub cas: Option<Vec<CertificateAuthority>>,
    pub channels: Option<Vec<Channel>>,
    pub chaincodes: Option<Vec<Chaincode>>,
    pub nodes: Option<Vec<Node>>,
    pub edges: Option<Vec<Edge>>,
    pub status: Option<NetworkStatus>,
}

impl NetworkPatch {
    /// Merge into `network`. Identity and timestamps are left to the caller.
    pub fn apply(self, network: &mut NetworkConfig) {
        if let Some(name) = self.name {
            network.name = name;
        }
        if let Some(consensus) = self.consensus {
            network.consensus = consensus;
        }
        if let Some(channel_name) = self.channel_name {
            network.channel_name = channel_name;
        }
        if let Some(organizations) = self.organizations {
            network.entities.organizations = organizations;
        }
        if let Some(peers) = self.peers {
            network.entities.peers = peers;
        }
        if let Some(orderers) = self.orderers {
            network.entities.orderers = orderers;
        }
        if let Some(cas) = self.cas {
            network.entities.cas = cas;
        }
        if let Some(channels) = self.channels {
            network.entities.channels = channels;
        }
        if let Some(chaincodes) = self.chaincodes {
            network.entities.chaincodes = chaincodes;
        }
        if let Some(nodes) = self.nodes {
            network.nodes = nodes;
        }
        if let Some(edges) = self.edges {
            network.edges = edges;
        }
        if let Some(status) = self.status {
            network.status = Some(status);
        }
    }
}
