//! Built-in network templates

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{Edge, Node, NodeKind};
use crate::model::{Entities, NetworkConfig, Orderer, Organization, Peer};
use crate::naming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub org_count: usize,
    pub peer_count: usize,
    pub orderer_count: usize,
    pub featured: bool,
}

pub const TEMPLATES: [NetworkTemplate; 6] = [
    NetworkTemplate {
        id: "1",
        name: "Two-Org Basic Network",
        description: "Simple network with two organizations, ideal for development and testing",
        org_count: 2,
        peer_count: 4,
        orderer_count: 1,
        featured: true,
    },
    NetworkTemplate {
        id: "2",
        name: "Three-Org Production",
        description: "Production-ready network with three organizations and Raft consensus",
        org_count: 3,
        peer_count: 6,
        orderer_count: 3,
        featured: true,
    },
    NetworkTemplate {
        id: "3",
        name: "Multi-Channel Enterprise",
        description: "Enterprise setup with multiple channels for different business processes",
        org_count: 4,
        peer_count: 8,
        orderer_count: 5,
        featured: false,
    },
    NetworkTemplate {
        id: "4",
        name: "Dev Single Org",
        description: "Minimal single organization setup for rapid prototyping",
        org_count: 1,
        peer_count: 2,
        orderer_count: 1,
        featured: false,
    },
    NetworkTemplate {
        id: "5",
        name: "High Availability Cluster",
        description: "Fault-tolerant configuration with redundant orderers and peers",
        org_count: 3,
        peer_count: 9,
        orderer_count: 5,
        featured: false,
    },
    NetworkTemplate {
        id: "6",
        name: "Supply Chain Network",
        description: "Pre-configured for supply chain use cases with multiple stakeholders",
        org_count: 5,
        peer_count: 10,
        orderer_count: 3,
        featured: true,
    },
];

pub fn find_template(id: &str) -> Result<&'static NetworkTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::TemplateNotFound(id.to_string()))
}

const ORG_SPACING: f64 = 300.0;
const PEER_SPACING: f64 = 120.0;
const ORDERER_SPACING: f64 = 150.0;

impl NetworkTemplate {
    pub fn peers_per_org(&self) -> usize {
        if self.org_count == 0 {
            0
        } else {
            self.peer_count.div_ceil(self.org_count)
        }
    }

    /// Build the collections and the matching canvas graph. Ids are
    /// positional so two instantiations are identical until saved.
    pub fn instantiate(&self) -> NetworkConfig {
        let mut entities = Entities::default();
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let per_org = self.peers_per_org();

        for i in 0..self.org_count {
            let org_id = format!("org-{}", i);
            let name = format!("Org{}", i + 1);
            let org = Organization::new(org_id.clone(), name.clone()).with_defaults();
            nodes.push(
                Node::new(org_id.clone(), NodeKind::Organization, name.clone())
                    .with_description(format!("Organization {}", i + 1))
                    .at(100.0 + i as f64 * ORG_SPACING, 100.0),
            );
            entities.organizations.push(org);

            for j in 0..per_org {
                let peer_index = i * per_org + j;
                if peer_index >= self.peer_count {
                    break;
                }
                let peer_id = format!("peer-{}", peer_index);
                let peer_name = format!("peer{}.{}", j, name.to_lowercase());
                let mut peer = Peer::new(peer_id.clone(), peer_name.clone(), org_id.clone());
                peer.port = naming::PEER_LISTEN_PORT + (peer_index as u16) * 1000;
                entities.peers.push(peer);

                nodes.push(
                    Node::new(peer_id.clone(), NodeKind::Peer, peer_name)
                        .with_description(format!("Peer node for {}", name))
                        .at(100.0 + i as f64 * ORG_SPACING, 250.0 + j as f64 * PEER_SPACING),
                );
                edges.push(Edge::new(format!("edge-{}-{}", peer_id, org_id), peer_id, org_id.clone()));
            }
        }

        for i in 0..self.orderer_count {
            let orderer_id = format!("orderer-{}", i);
            let name = format!("orderer{}", i + 1);
            let mut orderer = Orderer::new(orderer_id.clone(), name.clone());
            orderer.port = naming::ORDERER_LISTEN_PORT + (i as u16) * 1000;
            entities.orderers.push(orderer);
            nodes.push(
                Node::new(orderer_id, NodeKind::Orderer, name)
                    .with_description(format!("Orderer node {}", i + 1))
                    .at(600.0 + (i / 3) as f64 * 200.0, 100.0 + (i % 3) as f64 * ORDERER_SPACING),
            );
        }

        NetworkConfig::new(naming::network_slug(self.name))
            .with_entities(entities)
            .with_graph(nodes, edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue() {
        let counts: Vec<(usize, usize, usize)> = TEMPLATES
            .iter()
            .map(|t| (t.org_count, t.peer_count, t.orderer_count))
            .collect();
        assert_eq!(counts, vec![(2, 4, 1), (3, 6, 3), (4, 8, 5), (1, 2, 1), (3, 9, 5), (5, 10, 3)]);
        assert!(find_template("7").is_err());
    }

    #[test]
    fn test_instantiate_two_org() {
        let network = find_template("1").unwrap().instantiate();
        assert_eq!(network.name, "two-org-basic-network");
        assert_eq!(network.entities.organizations.len(), 2);
        assert_eq!(network.entities.peers.len(), 4);
        assert_eq!(network.entities.orderers[0].name, "orderer1");
        assert_eq!(network.entities.organizations[1].msp_id, "Org2MSP");
        assert_eq!(network.entities.organizations[1].domain, "org2.example.com");
        assert_eq!(network.entities.peers[3].organization_id, "org-1");
        assert_eq!(network.entities.peers[3].name, "peer1.org2");
        assert_eq!(network.edges.len(), 4);
        assert_eq!(network.nodes.len(), 2 + 4 + 1);
    }

    #[test]
    fn test_uneven_peers_stop_at_total() {
        // 9 peers over 3 orgs, then 10 over 5: ceil keeps every org populated
        let ha = find_template("5").unwrap().instantiate();
        assert_eq!(ha.entities.peers.len(), 9);
        let supply = find_template("6").unwrap();
        assert_eq!(supply.peers_per_org(), 2);
        assert_eq!(supply.instantiate().entities.peers.len(), 10);
    }

    #[test]
    fn test_instantiation_is_deterministic() {
        let template = find_template("2").unwrap();
        assert_eq!(template.instantiate(), template.instantiate());
    }
}
