// Integration tests for fabrix
use fabrix::naming;
use fabrix::{
    build_cert_material_document, build_channel_document, build_orchestration_document, compile, extract,
    validate, validate_network, ConsensusKind, Edge, Entities, MemoryRepository, NetworkConfig,
    NetworkRepository, Node, NodeKind, Orderer, Organization, Peer, Topology, TopologyInput,
};
use serde_yaml::Value;

fn entities(orgs: usize, orderers: usize) -> Entities {
    Entities {
        organizations: (1..=orgs)
            .map(|i| Organization::new(format!("org{}", i), format!("Org{}", i)))
            .collect(),
        orderers: (0..orderers)
            .map(|i| Orderer::new(format!("ord{}", i), format!("orderer{}", i)))
            .collect(),
        ..Default::default()
    }
}

fn channel_doc(consensus: ConsensusKind, orgs: usize, orderers: usize) -> Value {
    let entities = entities(orgs, orderers);
    let t = extract("MyNet", TopologyInput::Collections(&entities));
    let text = build_channel_document("MyNet", consensus, "mychannel", &t.organizations, &t.orderers);
    serde_yaml::from_str(&text).unwrap()
}

fn seq_len(value: &Value) -> usize {
    value.as_sequence().map(|s| s.len()).unwrap_or(0)
}

#[test]
fn test_minimal_network_scenario() {
    let doc = channel_doc(ConsensusKind::EtcdRaft, 1, 1);
    assert_eq!(seq_len(&doc["Organizations"]), 2);
    assert!(doc["Profiles"].get("mychannelGenesis").is_some());
    assert!(doc["Profiles"].get("mychannelChannel").is_some());
    assert_eq!(seq_len(&doc["Orderer"]["EtcdRaft"]["Consenters"]), 1);
    assert_eq!(doc["Application"]["Organizations"], Value::Null);
    assert_eq!(doc["Orderer"]["Organizations"], Value::Null);
}

#[test]
fn test_no_orderers_scenario() {
    let doc = channel_doc(ConsensusKind::EtcdRaft, 1, 0);
    assert_eq!(seq_len(&doc["Organizations"]), 1);
    assert_eq!(doc["Organizations"][0]["Name"], "Org1MSP");
}

#[test]
fn test_bft_scenario() {
    let doc = channel_doc(ConsensusKind::Bft, 1, 1);
    assert_eq!(doc["Orderer"]["SmartBFT"]["RequestBatchMaxCount"], 100);
    assert!(doc["Orderer"].get("EtcdRaft").is_none());
}

#[test]
fn test_determinism() {
    let network = NetworkConfig::new("Determinism").with_entities(entities(3, 3));
    let first = compile(&network);
    let second = compile(&network);
    assert_eq!(first, second);
}

#[test]
fn test_naming_agreement_across_documents() {
    let entities = entities(2, 3);
    let t = extract("Agreement Net", TopologyInput::Collections(&entities));

    let configtx: Value = serde_yaml::from_str(&build_channel_document(
        "Agreement Net",
        ConsensusKind::EtcdRaft,
        "mychannel",
        &t.organizations,
        &t.orderers,
    ))
    .unwrap();
    let crypto: Value =
        serde_yaml::from_str(&build_cert_material_document("Agreement Net", &t.organizations, &t.orderers)).unwrap();
    let compose: Value =
        serde_yaml::from_str(&build_orchestration_document("Agreement Net", &t.organizations, &t.orderers))
            .unwrap();

    let orderer_domain = crypto["OrdererOrgs"][0]["Domain"].as_str().unwrap();
    assert_eq!(orderer_domain, "agreement-net.com");
    for i in 0..3 {
        let host = configtx["Orderer"]["EtcdRaft"]["Consenters"][i]["Host"].as_str().unwrap();
        let spec = crypto["OrdererOrgs"][0]["Specs"][i]["Hostname"].as_str().unwrap();
        assert_eq!(host, format!("{}.{}", spec, orderer_domain));
        assert_eq!(host, naming::orderer_fqdn(i, orderer_domain));
        assert!(compose["services"].get(host).is_some(), "no service for {}", host);
    }

    for org in &t.organizations {
        let msp_dir = format!("crypto-config/peerOrganizations/{}/msp", org.domain);
        assert!(configtx["Organizations"]
            .as_sequence()
            .unwrap()
            .iter()
            .any(|o| o["MSPDir"] == msp_dir.as_str()));
        assert!(compose["services"].get(naming::peer_hostname(0, &org.domain)).is_some());
    }
}

#[test]
fn test_validation_completeness_and_fan_out() {
    let report = validate(&[], &[], &[], &[], &[], &[]);
    assert_eq!(report.tests.len(), 6);
    assert_eq!(report.issues.len(), 2);

    let peers: Vec<Peer> = (0..3).map(|i| Peer::new(format!("p{}", i), format!("peer{}", i), "")).collect();
    let report = validate(&[], &peers, &[], &[], &[], &[]);
    assert_eq!(report.issues_for("peer-org").count(), 3);
}

#[test]
fn test_graph_and_collection_inputs_agree() {
    let nodes = vec![
        Node::new("org1", NodeKind::Organization, "Org1"),
        Node::new("p0", NodeKind::Peer, "peer0"),
        Node::new("o0", NodeKind::Orderer, "orderer0"),
    ];
    let edges = vec![Edge::new("e1", "p0", "org1")];
    let from_graph = NetworkConfig::new("Same").with_graph(nodes, edges);

    let from_collections = NetworkConfig::new("Same").with_entities(Entities {
        organizations: vec![Organization::new("org1", "Org1")],
        peers: vec![Peer::new("p0", "peer0", "org1")],
        orderers: vec![Orderer::new("o0", "orderer0")],
        ..Default::default()
    });

    assert_eq!(compile(&from_graph), compile(&from_collections));
    let t = Topology::from_network(&from_graph);
    assert_eq!(t.counts.peers, 1);
}

#[test]
fn test_repository_round_trip_and_compile() {
    let repo = MemoryRepository::with_sample_data();
    let network = repo.get_network("sample-1").unwrap();
    let artifacts = compile(&network);

    let compose: Value = serde_yaml::from_str(&artifacts.docker_compose).unwrap();
    let services = compose["services"].as_mapping().unwrap();
    // one orderer plus the fixed pair of peers for each of the two orgs
    assert_eq!(services.len(), 5);
    assert_eq!(compose["services"]["peer1.org2.example.com"]["ports"][0], "7062:7051");

    assert!(!validate_network(Some(&network)).has_errors());
    assert!(validate_network(None).has_errors());
}

#[test]
fn test_render_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let network = NetworkConfig::new("Files").with_entities(entities(1, 1));
    let written = compile(&network).write_to(dir.path()).unwrap();
    let names: Vec<String> = written
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    assert_eq!(names, vec!["configtx.yaml", "crypto-config.yaml", "docker-compose.yaml"]);
}

#[test]
fn test_builders_share_one_orderer_domain() {
    // profiles extracted under one name, documents built under another
    let entities = entities(1, 2);
    let t = extract("Alpha", TopologyInput::Collections(&entities));

    let configtx: Value = serde_yaml::from_str(&build_channel_document(
        "Beta",
        ConsensusKind::EtcdRaft,
        "mychannel",
        &t.organizations,
        &t.orderers,
    ))
    .unwrap();
    let crypto: Value = serde_yaml::from_str(&build_cert_material_document("Beta", &t.organizations, &t.orderers)).unwrap();
    let compose: Value =
        serde_yaml::from_str(&build_orchestration_document("Beta", &t.organizations, &t.orderers)).unwrap();

    assert_eq!(configtx["Organizations"][0]["MSPDir"], "crypto-config/ordererOrganizations/beta.com/msp");
    assert_eq!(configtx["Organizations"][0]["OrdererEndpoints"][1], "orderer1.beta.com:7050");
    assert_eq!(configtx["Orderer"]["EtcdRaft"]["Consenters"][0]["Host"], "orderer.beta.com");
    assert!(configtx["Orderer"]["EtcdRaft"]["Consenters"][1]["ClientTLSCert"]
        .as_str()
        .unwrap()
        .starts_with("crypto-config/ordererOrganizations/beta.com/orderers/orderer1.beta.com/"));
    assert_eq!(crypto["OrdererOrgs"][0]["Domain"], "beta.com");

    let services = compose["services"].as_mapping().unwrap();
    assert!(services.get("orderer.beta.com").is_some());
    assert!(services.get("orderer1.beta.com").is_some());
    assert!(services.keys().filter_map(Value::as_str).all(|k| !k.contains("alpha")));
}
