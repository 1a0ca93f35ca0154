//! Topology extractor
//!
//! Normalizes the two ways a caller can describe a network (a raw canvas
//! graph, or typed collections it maintains itself) into one [`Topology`].
//! Builders only ever see the normalized form, so hostname and anchor-peer
//! rules exist in exactly one place.

use serde::Serialize;
use tracing::{debug, warn};

use crate::graph::{Edge, Node, NodeKind, TopologyGraph};
use crate::model::{
    AnchorPeer, CertificateAuthority, Chaincode, Channel, ConsensusKind, Entities, NetworkConfig,
    Organization, Orderer, Peer,
};
use crate::naming;

/// Where the entities come from
#[derive(Debug, Clone, Copy)]
pub enum TopologyInput<'a> {
    Graph { nodes: &'a [Node], edges: &'a [Edge] },
    Collections(&'a Entities),
}

impl NetworkConfig {
    /// Typed collections take precedence over the canvas graph.
    pub fn input(&self) -> TopologyInput<'_> {
        if self.entities.is_empty() {
            TopologyInput::Graph {
                nodes: &self.nodes,
                edges: &self.edges,
            }
        } else {
            TopologyInput::Collections(&self.entities)
        }
    }
}

/// Application organization as the documents reference it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgProfile {
    pub id: String,
    pub name: String,
    pub msp_id: String,
    pub domain: String,
    pub anchor_peers: Vec<AnchorPeer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdererProfile {
    pub id: String,
    pub name: String,
    pub index: usize,
    /// `orderer`, `orderer1`, ...
    pub hostname: String,
}

impl OrdererProfile {
    /// Host name qualified by the orderer-organization domain.
    pub fn fqdn(&self, orderer_domain: &str) -> String {
        naming::orderer_fqdn(self.index, orderer_domain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KindCounts {
    pub organizations: usize,
    pub peers: usize,
    pub orderers: usize,
    pub cas: usize,
    pub channels: usize,
    pub chaincodes: usize,
}

/// Normalized, read-only snapshot consumed by the builders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    pub network_name: String,
    pub consensus: ConsensusKind,
    pub channel_name: String,
    pub orderer_domain: String,
    pub organizations: Vec<OrgProfile>,
    pub orderers: Vec<OrdererProfile>,
    pub entities: Entities,
    pub counts: KindCounts,
}

impl Topology {
    pub fn from_network(network: &NetworkConfig) -> Self {
        let mut topology = extract(&network.name, network.input());
        topology.consensus = network.consensus;
        topology.channel_name = network.channel_name.clone();
        topology
    }
}

/// Normalize `input` for a network named `network_name`. Consensus and
/// channel name start at their defaults; [`Topology::from_network`] fills
/// them from a saved network.
pub fn extract(network_name: &str, input: TopologyInput<'_>) -> Topology {
    let entities = match input {
        TopologyInput::Graph { nodes, edges } => entities_from_graph(nodes, edges),
        TopologyInput::Collections(entities) => entities.clone(),
    };

    let orderer_domain = naming::orderer_domain(network_name);
    let organizations = entities
        .organizations
        .iter()
        .map(|org| org_profile(org, &entities.peers))
        .collect();
    let orderers = entities
        .orderers
        .iter()
        .enumerate()
        .map(|(index, orderer)| OrdererProfile {
            id: orderer.id.clone(),
            name: orderer.name.clone(),
            index,
            hostname: naming::orderer_hostname(index),
        })
        .collect();

    let counts = KindCounts {
        organizations: entities.organizations.len(),
        peers: entities.peers.len(),
        orderers: entities.orderers.len(),
        cas: entities.cas.len(),
        channels: entities.channels.len(),
        chaincodes: entities.chaincodes.len(),
    };
    debug!(
        network = %network_name,
        organizations = counts.organizations,
        peers = counts.peers,
        orderers = counts.orderers,
        "Extracted topology"
    );

    Topology {
        network_name: network_name.to_string(),
        consensus: ConsensusKind::default(),
        channel_name: "mychannel".to_string(),
        orderer_domain,
        organizations,
        orderers,
        entities,
        counts,
    }
}

fn anchor(host: String) -> AnchorPeer {
    AnchorPeer {
        host,
        port: naming::PEER_LISTEN_PORT,
    }
}

/// Explicit anchor peers, else one per peer mapped to the organization,
/// else `peer0.<domain>`.
fn org_profile(org: &Organization, peers: &[Peer]) -> OrgProfile {
    let msp_id = org.resolved_msp_id();
    let domain = org.resolved_domain();

    let anchor_peers = match &org.anchor_peers {
        Some(explicit) if !explicit.is_empty() => explicit.clone(),
        _ => {
            let mapped: Vec<AnchorPeer> = peers
                .iter()
                .filter(|p| p.organization_id == org.id)
                .enumerate()
                .map(|(k, _)| anchor(naming::peer_hostname(k, &domain)))
                .collect();
            if mapped.is_empty() {
                vec![anchor(naming::peer_hostname(0, &domain))]
            } else {
                mapped
            }
        }
    };

    OrgProfile {
        id: org.id.clone(),
        name: org.name.clone(),
        msp_id,
        domain,
        anchor_peers,
    }
}

fn first_neighbor(graph: &TopologyGraph<'_>, id: &str, kind: NodeKind) -> Option<String> {
    graph.neighbors(id, kind).first().map(|n| n.id.clone())
}

/// Derive typed collections from the canvas. Foreign keys come from
/// adjacency; an organization's anchor peers are its adjacent peers.
fn entities_from_graph(nodes: &[Node], edges: &[Edge]) -> Entities {
    let graph = TopologyGraph::new(nodes, edges);
    for edge in graph.dangling_edges() {
        warn!(edge = %edge.id, "Skipping edge with a missing endpoint");
    }

    let organizations = graph
        .nodes_of(NodeKind::Organization)
        .enumerate()
        .map(|(i, node)| {
            let name = match node.label.trim() {
                "" => format!("Org{}", i + 1),
                label => label.to_string(),
            };
            let mut org = Organization::new(node.id.clone(), name);
            let domain = org.resolved_domain();
            let adjacent = graph.neighbors(&node.id, NodeKind::Peer);
            if !adjacent.is_empty() {
                org.anchor_peers = Some(
                    (0..adjacent.len())
                        .map(|k| anchor(naming::peer_hostname(k, &domain)))
                        .collect(),
                );
            }
            org
        })
        .collect();

    let peers = graph
        .nodes_of(NodeKind::Peer)
        .map(|node| {
            let org_id = first_neighbor(&graph, &node.id, NodeKind::Organization).unwrap_or_default();
            Peer::new(node.id.clone(), node.label.clone(), org_id)
        })
        .collect();

    let orderers = graph
        .nodes_of(NodeKind::Orderer)
        .map(|node| {
            let mut orderer = Orderer::new(node.id.clone(), node.label.clone());
            orderer.organization_id = first_neighbor(&graph, &node.id, NodeKind::Organization);
            orderer
        })
        .collect();

    let cas = graph
        .nodes_of(NodeKind::CertificateAuthority)
        .map(|node| {
            let org_id = first_neighbor(&graph, &node.id, NodeKind::Organization).unwrap_or_default();
            CertificateAuthority::new(node.id.clone(), node.label.clone(), org_id)
        })
        .collect();

    let ids = |nodes: Vec<&Node>| nodes.into_iter().map(|n| n.id.clone()).collect::<Vec<_>>();
    let channels = graph
        .nodes_of(NodeKind::Channel)
        .map(|node| Channel {
            id: node.id.clone(),
            name: node.label.clone(),
            organization_ids: ids(graph.neighbors(&node.id, NodeKind::Organization)),
            orderer_ids: ids(graph.neighbors(&node.id, NodeKind::Orderer)),
        })
        .collect();

    let chaincodes = graph
        .nodes_of(NodeKind::SmartContractUnit)
        .map(|node| {
            let channel_id = first_neighbor(&graph, &node.id, NodeKind::Channel).unwrap_or_default();
            Chaincode::new(node.id.clone(), node.label.clone(), channel_id)
        })
        .collect();

    Entities {
        organizations,
        peers,
        orderers,
        cas,
        channels,
        chaincodes,
    }
}
