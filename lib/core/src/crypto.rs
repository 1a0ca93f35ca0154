//! Certificate-material document (`crypto-config.yaml`)

use serde_yaml::Value;
use tracing::debug;

use crate::configtx::RUNTIME_TAG;
use crate::extract::{OrdererProfile, OrgProfile};
use crate::naming;
use crate::render::{self, Header, MapBuilder};

pub const CRYPTOGEN_REFERENCE: &str = "https://hyperledger-fabric.readthedocs.io/en/latest/commands/cryptogen.html";

/// Identities generated per organization
const PEER_TEMPLATE_COUNT: usize = naming::PEERS_PER_ORG;
const USER_COUNT: usize = 1;

fn count(n: usize) -> Value {
    MapBuilder::new().entry("Count", n as u64).build()
}

pub fn cert_material_document(
    network_name: &str,
    organizations: &[OrgProfile],
    orderers: &[OrdererProfile],
) -> Value {
    let orderer_orgs = if orderers.is_empty() {
        Vec::new()
    } else {
        let specs = orderers
            .iter()
            .map(|o| MapBuilder::new().entry("Hostname", o.hostname.as_str()).build())
            .collect::<Vec<_>>();
        vec![MapBuilder::new()
            .entry("Name", "Orderer")
            .entry("Domain", naming::orderer_domain(network_name))
            .entry("EnableNodeOUs", true)
            .entry("Specs", Value::Sequence(specs))
            .build()]
    };

    let peer_orgs = organizations
        .iter()
        .map(|org| {
            MapBuilder::new()
                .entry("Name", org.name.as_str())
                .entry("Domain", org.domain.as_str())
                .entry("EnableNodeOUs", true)
                .entry("Template", count(PEER_TEMPLATE_COUNT))
                .entry("Users", count(USER_COUNT))
                .build()
        })
        .collect::<Vec<_>>();

    MapBuilder::new()
        .entry("OrdererOrgs", Value::Sequence(orderer_orgs))
        .entry("PeerOrgs", Value::Sequence(peer_orgs))
        .build()
}

/// Render `crypto-config.yaml` for cryptogen.
pub fn build_cert_material_document(
    network_name: &str,
    organizations: &[OrgProfile],
    orderers: &[OrdererProfile],
) -> String {
    debug!(
        network = %network_name,
        organizations = organizations.len(),
        orderers = orderers.len(),
        "Building cert-material document"
    );
    let header = Header {
        title: "Hyperledger Fabric crypto-config.yaml".to_string(),
        network: network_name.to_string(),
        runtime: RUNTIME_TAG.to_string(),
        consensus: None,
        channel: None,
        notes: vec!["Generated for use with cryptogen tool".to_string()],
        reference: CRYPTOGEN_REFERENCE.to_string(),
    };
    render::document(&header, &cert_material_document(network_name, organizations, orderers))
}
