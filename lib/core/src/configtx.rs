//! Channel/policy document (`configtx.yaml`)

use serde_yaml::Value;
use tracing::debug;

use crate::extract::{OrdererProfile, OrgProfile};
use crate::model::ConsensusKind;
use crate::naming;
use crate::render::{self, Header, MapBuilder};

pub const CONFIGTX_REFERENCE: &str =
    "https://hyperledger-fabric.readthedocs.io/en/latest/create_channel/create_channel_config.html";
pub const RUNTIME_TAG: &str = "Fabric v2.5/v3.0";

fn policy(kind: &str, rule: impl Into<String>) -> Value {
    MapBuilder::new().entry("Type", kind).entry("Rule", rule.into()).build()
}

fn signature(rule: String) -> Value {
    policy("Signature", rule)
}

fn implicit_meta(rule: &str) -> Value {
    policy("ImplicitMeta", rule)
}

fn flag(name: &str) -> Value {
    MapBuilder::new().entry(name, true).build()
}

/// Membership rules of an application organization
fn org_policies(msp: &str) -> Value {
    MapBuilder::new()
        .entry("Readers", signature(format!("OR('{msp}.admin','{msp}.peer','{msp}.client')")))
        .entry("Writers", signature(format!("OR('{msp}.admin','{msp}.client')")))
        .entry("Admins", signature(format!("OR('{msp}.admin')")))
        .entry("Endorsement", signature(format!("OR('{msp}.peer')")))
        .build()
}

fn org_definition(org: &OrgProfile) -> Value {
    let anchors = org
        .anchor_peers
        .iter()
        .map(|a| MapBuilder::new().entry("Host", a.host.as_str()).entry("Port", a.port).build())
        .collect::<Vec<_>>();

    MapBuilder::new()
        .entry("Name", org.msp_id.as_str())
        .entry("ID", org.msp_id.as_str())
        .entry("MSPDir", naming::peer_org_msp_dir(&org.domain))
        .entry("Policies", org_policies(&org.msp_id))
        .entry("AnchorPeers", Value::Sequence(anchors))
        .build()
}

fn orderer_org_definition(orderer_domain: &str, orderers: &[OrdererProfile]) -> Value {
    let msp = naming::ORDERER_MSP_ID;
    let policies = MapBuilder::new()
        .entry("Readers", signature(format!("OR('{msp}.member')")))
        .entry("Writers", signature(format!("OR('{msp}.member')")))
        .entry("Admins", signature(format!("OR('{msp}.admin')")))
        .build();

    MapBuilder::new()
        .entry("Name", msp)
        .entry("ID", msp)
        .entry("MSPDir", naming::orderer_org_msp_dir(orderer_domain))
        .entry("Policies", policies)
        .entry(
            "OrdererEndpoints",
            render::strings(orderers.iter().map(|o| naming::orderer_endpoint(o.index, orderer_domain))),
        )
        .build()
}

fn reference(msp: &str) -> Value {
    MapBuilder::new().entry("Name", msp).entry("ID", msp).build()
}

fn orderer_section(consensus: ConsensusKind, orderer_domain: &str, orderers: &[OrdererProfile]) -> Value {
    let mut section = MapBuilder::new()
        .entry("OrdererType", consensus.as_str())
        .entry("BatchTimeout", "2s")
        .entry(
            "BatchSize",
            MapBuilder::new()
                .entry("MaxMessageCount", 500)
                .entry("AbsoluteMaxBytes", "10 MB")
                .entry("PreferredMaxBytes", "2 MB")
                .build(),
        )
        .entry("Organizations", Value::Null)
        .entry(
            "Policies",
            MapBuilder::new()
                .entry("Readers", implicit_meta("ANY Readers"))
                .entry("Writers", implicit_meta("ANY Writers"))
                .entry("Admins", implicit_meta("MAJORITY Admins"))
                .entry("BlockValidation", implicit_meta("ANY Writers"))
                .build(),
        )
        .entry("Capabilities", flag("V2_0"));

    match consensus {
        ConsensusKind::EtcdRaft => {
            let consenters = orderers
                .iter()
                .map(|o| {
                    let cert = naming::orderer_tls_cert(o.index, orderer_domain);
                    MapBuilder::new()
                        .entry("Host", o.fqdn(orderer_domain))
                        .entry("Port", naming::ORDERER_LISTEN_PORT)
                        .entry("ClientTLSCert", cert.as_str())
                        .entry("ServerTLSCert", cert)
                        .build()
                })
                .collect::<Vec<_>>();
            section.insert(
                "EtcdRaft",
                MapBuilder::new().entry("Consenters", Value::Sequence(consenters)).build(),
            );
        }
        ConsensusKind::Bft => {
            section.insert(
                "SmartBFT",
                MapBuilder::new()
                    .entry("RequestBatchMaxCount", 100)
                    .entry("RequestBatchMaxInterval", "50ms")
                    .entry("IncomingMessageBufferSize", 200)
                    .entry("RequestPoolSize", 400)
                    .entry("LeaderHeartbeatTimeout", "1s")
                    .build(),
            );
        }
        ConsensusKind::Solo => {}
    }

    section.build()
}

fn profiles(
    consensus: ConsensusKind,
    channel_name: &str,
    organizations: &[OrgProfile],
    has_orderers: bool,
) -> Value {
    let org_refs = || Value::Sequence(organizations.iter().map(|o| reference(&o.msp_id)).collect());
    let orderer_refs = if has_orderers {
        vec![reference(naming::ORDERER_MSP_ID)]
    } else {
        Vec::new()
    };

    let genesis = MapBuilder::new()
        .entry(
            "Orderer",
            MapBuilder::new()
                .entry("OrdererType", consensus.as_str())
                .entry("Organizations", Value::Sequence(orderer_refs))
                .build(),
        )
        .entry("Application", MapBuilder::new().entry("Organizations", org_refs()).build())
        .entry("Capabilities", flag("V3_0"))
        .build();

    let channel = MapBuilder::new()
        .entry(
            "Application",
            MapBuilder::new()
                .entry("Organizations", org_refs())
                .entry("Capabilities", flag("V2_5"))
                .build(),
        )
        .build();

    MapBuilder::new()
        .entry(format!("{}Genesis", channel_name), genesis)
        .entry(format!("{}Channel", channel_name), channel)
        .build()
}

/// Structured channel document, top-level sections in canonical order.
pub fn channel_document(
    network_name: &str,
    consensus: ConsensusKind,
    channel_name: &str,
    organizations: &[OrgProfile],
    orderers: &[OrdererProfile],
) -> Value {
    let orderer_domain = naming::orderer_domain(network_name);

    let mut definitions = Vec::with_capacity(organizations.len() + 1);
    if !orderers.is_empty() {
        definitions.push(orderer_org_definition(&orderer_domain, orderers));
    }
    definitions.extend(organizations.iter().map(org_definition));

    MapBuilder::new()
        .entry("Organizations", Value::Sequence(definitions))
        .entry(
            "Capabilities",
            MapBuilder::new()
                .entry("Channel", flag("V3_0"))
                .entry("Orderer", flag("V2_0"))
                .entry("Application", flag("V2_5"))
                .build(),
        )
        .entry(
            "Application",
            MapBuilder::new()
                .entry("Organizations", Value::Null)
                .entry(
                    "Policies",
                    MapBuilder::new()
                        .entry("Readers", implicit_meta("ANY Readers"))
                        .entry("Writers", implicit_meta("ANY Writers"))
                        .entry("Admins", implicit_meta("MAJORITY Admins"))
                        .entry("LifecycleEndorsement", implicit_meta("MAJORITY Endorsement"))
                        .entry("Endorsement", implicit_meta("MAJORITY Endorsement"))
                        .build(),
                )
                .entry("Capabilities", flag("V2_5"))
                .build(),
        )
        .entry("Orderer", orderer_section(consensus, &orderer_domain, orderers))
        .entry(
            "Channel",
            MapBuilder::new()
                .entry(
                    "Policies",
                    MapBuilder::new()
                        .entry("Readers", implicit_meta("ANY Readers"))
                        .entry("Writers", implicit_meta("ANY Writers"))
                        .entry("Admins", implicit_meta("MAJORITY Admins"))
                        .build(),
                )
                .entry("Capabilities", flag("V3_0"))
                .build(),
        )
        .entry("Profiles", profiles(consensus, channel_name, organizations, !orderers.is_empty()))
        .build()
}

/// Render `configtx.yaml` with its comment header.
pub fn build_channel_document(
    network_name: &str,
    consensus: ConsensusKind,
    channel_name: &str,
    organizations: &[OrgProfile],
    orderers: &[OrdererProfile],
) -> String {
    debug!(
        network = %network_name,
        consensus = %consensus,
        organizations = organizations.len(),
        orderers = orderers.len(),
        "Building channel document"
    );
    let header = Header {
        title: "Hyperledger Fabric configtx.yaml".to_string(),
        network: network_name.to_string(),
        runtime: RUNTIME_TAG.to_string(),
        consensus: Some(consensus.as_str().to_string()),
        channel: Some(channel_name.to_string()),
        notes: Vec::new(),
        reference: CONFIGTX_REFERENCE.to_string(),
    };
    let body = channel_document(network_name, consensus, channel_name, organizations, orderers);
    render::document(&header, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract, TopologyInput};
    use crate::model::{Entities, Orderer, Organization};

    fn topology(orgs: usize, orderers: usize) -> crate::extract::Topology {
        let entities = Entities {
            organizations: (1..=orgs).map(|i| Organization::new(format!("org{i}"), format!("Org{i}"))).collect(),
            orderers: (0..orderers).map(|i| Orderer::new(format!("o{i}"), format!("orderer{i}"))).collect(),
            ..Default::default()
        };
        extract("MyNet", TopologyInput::Collections(&entities))
    }

    fn parse(consensus: ConsensusKind, orgs: usize, orderers: usize) -> Value {
        let t = topology(orgs, orderers);
        let text = build_channel_document("MyNet", consensus, "mychannel", &t.organizations, &t.orderers);
        serde_yaml::from_str(&text).unwrap()
    }

    #[test]
    fn test_minimal_network() {
        let doc = parse(ConsensusKind::EtcdRaft, 1, 1);
        assert_eq!(doc["Organizations"].as_sequence().unwrap().len(), 2);
        assert_eq!(doc["Organizations"][0]["Name"], "OrdererMSP");
        assert_eq!(doc["Organizations"][1]["Name"], "Org1MSP");
        let profiles = doc["Profiles"].as_mapping().unwrap();
        let keys: Vec<&str> = profiles.keys().filter_map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["mychannelGenesis", "mychannelChannel"]);
        assert_eq!(doc["Orderer"]["EtcdRaft"]["Consenters"].as_sequence().unwrap().len(), 1);
        assert_eq!(doc["Orderer"]["EtcdRaft"]["Consenters"][0]["Host"], "orderer.mynet.com");
    }

    #[test]
    fn test_no_orderers_omits_orderer_org() {
        let doc = parse(ConsensusKind::EtcdRaft, 1, 0);
        assert_eq!(doc["Organizations"].as_sequence().unwrap().len(), 1);
        assert_eq!(doc["Profiles"]["mychannelGenesis"]["Orderer"]["Organizations"], Value::Sequence(vec![]));
        assert!(doc["Orderer"]["EtcdRaft"]["Consenters"].as_sequence().unwrap().is_empty());
    }

    #[test]
    fn test_bft_block() {
        let doc = parse(ConsensusKind::Bft, 2, 3);
        assert_eq!(doc["Orderer"]["SmartBFT"]["RequestBatchMaxCount"], 100);
        assert_eq!(doc["Orderer"]["SmartBFT"]["LeaderHeartbeatTimeout"], "1s");
        assert!(doc["Orderer"].get("EtcdRaft").is_none());
    }

    #[test]
    fn test_solo_has_no_consensus_block() {
        let doc = parse(ConsensusKind::Solo, 1, 1);
        assert!(doc["Orderer"].get("EtcdRaft").is_none());
        assert!(doc["Orderer"].get("SmartBFT").is_none());
        assert_eq!(doc["Orderer"]["OrdererType"], "solo");
    }

    #[test]
    fn test_policy_rules_are_literal() {
        let doc = parse(ConsensusKind::EtcdRaft, 1, 1);
        let policies = &doc["Organizations"][1]["Policies"];
        assert_eq!(policies["Readers"]["Rule"], "OR('Org1MSP.admin','Org1MSP.peer','Org1MSP.client')");
        assert_eq!(policies["Writers"]["Rule"], "OR('Org1MSP.admin','Org1MSP.client')");
        assert_eq!(policies["Admins"]["Rule"], "OR('Org1MSP.admin')");
        assert_eq!(policies["Endorsement"]["Rule"], "OR('Org1MSP.peer')");
        assert_eq!(policies["Endorsement"]["Type"], "Signature");
        assert_eq!(doc["Organizations"][0]["Policies"]["Readers"]["Rule"], "OR('OrdererMSP.member')");
    }

    #[test]
    fn test_top_level_order_and_null_placeholders() {
        let t = topology(1, 1);
        let text = build_channel_document("MyNet", ConsensusKind::EtcdRaft, "mychannel", &t.organizations, &t.orderers);
        let sections: Vec<&str> = text
            .lines()
            .filter(|l| !l.starts_with('#') && !l.starts_with(' ') && !l.is_empty())
            .collect();
        assert_eq!(
            sections,
            vec!["Organizations:", "Capabilities:", "Application:", "Orderer:", "Channel:", "Profiles:"]
        );
        assert_eq!(text.matches("  Organizations: null").count(), 2);
    }

    #[test]
    fn test_empty_network_is_structurally_complete() {
        let text = build_channel_document("Empty", ConsensusKind::EtcdRaft, "mychannel", &[], &[]);
        let doc: Value = serde_yaml::from_str(&text).unwrap();
        for section in ["Organizations", "Capabilities", "Application", "Orderer", "Channel", "Profiles"] {
            assert!(doc.get(section).is_some(), "missing {}", section);
        }
        assert!(doc["Organizations"].as_sequence().unwrap().is_empty());
    }

    #[test]
    fn test_header() {
        let text = build_channel_document("My Net", ConsensusKind::Bft, "ops", &[], &[]);
        let header: Vec<&str> = text.lines().take(8).collect();
        let reference = format!("# Reference: {}", CONFIGTX_REFERENCE);
        assert_eq!(
            header,
            vec![
                "# Hyperledger Fabric configtx.yaml",
                "# Network: My Net",
                "# Generated for Fabric v2.5/v3.0",
                "# Consensus: bft",
                "# Channel: ops",
                "#",
                reference.as_str(),
                "",
            ]
        );
    }

    #[test]
    fn test_orderer_endpoints_follow_naming() {
        let doc = parse(ConsensusKind::EtcdRaft, 1, 3);
        let endpoints: Vec<&str> = doc["Organizations"][0]["OrdererEndpoints"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(
            endpoints,
            vec!["orderer.mynet.com:7050", "orderer1.mynet.com:7050", "orderer2.mynet.com:7050"]
        );
        assert_eq!(
            doc["Orderer"]["EtcdRaft"]["Consenters"][2]["ServerTLSCert"],
            "crypto-config/ordererOrganizations/mynet.com/orderers/orderer2.mynet.com/tls/server.crt"
        );
    }
}
