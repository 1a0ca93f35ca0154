//! Container-orchestration document (`docker-compose.yaml`)
//!
//! One service per orderer and a fixed pair of peers per organization,
//! whatever the number of peers drawn. Service names, ports and volume
//! paths all come from [`crate::naming`].

use serde_yaml::Value;
use tracing::debug;

use crate::configtx::RUNTIME_TAG;
use crate::extract::{OrdererProfile, OrgProfile};
use crate::naming;
use crate::render::{self, Header, MapBuilder};

pub const COMPOSE_FILE_VERSION: &str = "3.7";
pub const NETWORK_NAME: &str = "fabric-network";
pub const ORDERER_IMAGE: &str = "hyperledger/fabric-orderer:2.5";
pub const PEER_IMAGE: &str = "hyperledger/fabric-peer:2.5";
pub const COMPOSE_REFERENCE: &str = "https://hyperledger-fabric.readthedocs.io/en/latest/test_network.html";

const ORDERER_HOME: &str = "/var/hyperledger/orderer";
const PEER_HOME: &str = "/etc/hyperledger/fabric";
const WORKING_DIR: &str = "/opt/gopath/src/github.com/hyperledger/fabric";

fn orderer_service(orderer: &OrdererProfile, orderer_domain: &str) -> Value {
    let crypto_dir = naming::orderer_crypto_dir(orderer.index, orderer_domain);
    let environment = [
        "FABRIC_LOGGING_SPEC=INFO".to_string(),
        "ORDERER_GENERAL_LISTENADDRESS=0.0.0.0".to_string(),
        format!("ORDERER_GENERAL_LISTENPORT={}", naming::ORDERER_LISTEN_PORT),
        format!("ORDERER_GENERAL_LOCALMSPID={}", naming::ORDERER_MSP_ID),
        format!("ORDERER_GENERAL_LOCALMSPDIR={ORDERER_HOME}/msp"),
        "ORDERER_GENERAL_TLS_ENABLED=true".to_string(),
        format!("ORDERER_GENERAL_TLS_PRIVATEKEY={ORDERER_HOME}/tls/server.key"),
        format!("ORDERER_GENERAL_TLS_CERTIFICATE={ORDERER_HOME}/tls/server.crt"),
        format!("ORDERER_GENERAL_TLS_ROOTCAS=[{ORDERER_HOME}/tls/ca.crt]"),
    ];

    MapBuilder::new()
        .entry("container_name", orderer.fqdn(orderer_domain))
        .entry("image", ORDERER_IMAGE)
        .entry("environment", render::strings(environment))
        .entry("working_dir", WORKING_DIR)
        .entry("command", "orderer")
        .entry(
            "ports",
            render::strings([format!(
                "{}:{}",
                naming::orderer_host_port(orderer.index),
                naming::ORDERER_LISTEN_PORT
            )]),
        )
        .entry(
            "volumes",
            render::strings([
                format!("./{crypto_dir}/msp:{ORDERER_HOME}/msp"),
                format!("./{crypto_dir}/tls:{ORDERER_HOME}/tls"),
            ]),
        )
        .entry("networks", render::strings([NETWORK_NAME]))
        .build()
}

fn peer_service(org: &OrgProfile, org_index: usize, peer_index: usize) -> Value {
    let name = naming::peer_hostname(peer_index, &org.domain);
    let address = format!("{}:{}", name, naming::PEER_LISTEN_PORT);
    let crypto_dir = naming::peer_crypto_dir(peer_index, &org.domain);
    let environment = [
        "FABRIC_LOGGING_SPEC=INFO".to_string(),
        format!("CORE_PEER_ID={name}"),
        format!("CORE_PEER_ADDRESS={address}"),
        format!("CORE_PEER_LOCALMSPID={}", org.msp_id),
        "CORE_PEER_TLS_ENABLED=true".to_string(),
        format!("CORE_PEER_TLS_CERT_FILE={PEER_HOME}/tls/server.crt"),
        format!("CORE_PEER_TLS_KEY_FILE={PEER_HOME}/tls/server.key"),
        format!("CORE_PEER_TLS_ROOTCERT_FILE={PEER_HOME}/tls/ca.crt"),
        format!("CORE_PEER_GOSSIP_BOOTSTRAP={address}"),
        format!("CORE_PEER_GOSSIP_EXTERNALENDPOINT={address}"),
    ];

    MapBuilder::new()
        .entry("container_name", name.as_str())
        .entry("image", PEER_IMAGE)
        .entry("environment", render::strings(environment))
        .entry("working_dir", format!("{WORKING_DIR}/peer"))
        .entry("command", "peer node start")
        .entry(
            "ports",
            render::strings([format!(
                "{}:{}",
                naming::peer_host_port(org_index, peer_index),
                naming::PEER_LISTEN_PORT
            )]),
        )
        .entry(
            "volumes",
            render::strings([
                format!("./{crypto_dir}/msp:{PEER_HOME}/msp"),
                format!("./{crypto_dir}/tls:{PEER_HOME}/tls"),
            ]),
        )
        .entry("networks", render::strings([NETWORK_NAME]))
        .build()
}

pub fn orchestration_document(
    network_name: &str,
    organizations: &[OrgProfile],
    orderers: &[OrdererProfile],
) -> Value {
    let orderer_domain = naming::orderer_domain(network_name);
    let mut services = MapBuilder::new();
    for orderer in orderers {
        services.insert(orderer.fqdn(&orderer_domain), orderer_service(orderer, &orderer_domain));
    }
    for (org_index, org) in organizations.iter().enumerate() {
        for peer_index in 0..naming::PEERS_PER_ORG {
            services.insert(
                naming::peer_hostname(peer_index, &org.domain),
                peer_service(org, org_index, peer_index),
            );
        }
    }

    MapBuilder::new()
        .entry("version", COMPOSE_FILE_VERSION)
        .entry(
            "networks",
            MapBuilder::new()
                .entry(NETWORK_NAME, MapBuilder::new().entry("name", NETWORK_NAME).build())
                .build(),
        )
        .entry("services", services.build())
        .build()
}

/// Render `docker-compose.yaml`.
pub fn build_orchestration_document(
    network_name: &str,
    organizations: &[OrgProfile],
    orderers: &[OrdererProfile],
) -> String {
    debug!(
        network = %network_name,
        services = orderers.len() + organizations.len() * naming::PEERS_PER_ORG,
        "Building orchestration document"
    );
    let header = Header {
        title: "Docker Compose configuration for Hyperledger Fabric network".to_string(),
        network: network_name.to_string(),
        runtime: RUNTIME_TAG.to_string(),
        consensus: None,
        channel: None,
        notes: vec!["Usage: docker-compose up -d".to_string()],
        reference: COMPOSE_REFERENCE.to_string(),
    };
    render::document(&header, &orchestration_document(network_name, organizations, orderers))
}
