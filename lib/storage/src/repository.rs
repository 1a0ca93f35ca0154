use chrono::{Duration, Utc};
use fabrix_core::{
    CertificateAuthority, Chaincode, ChaincodeLanguage, Channel, ConsensusKind, Entities, Error,
    NetworkConfig, NetworkPatch, NetworkStatus, Orderer, Organization, Peer, Result,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::deployment::{Deployment, DeploymentPatch};

/// CRUD over saved networks and their deployments
pub trait NetworkRepository: Send + Sync {
    fn list_networks(&self) -> Vec<NetworkConfig>;
    fn get_network(&self, id: &str) -> Option<NetworkConfig>;
    /// Store `network` under a fresh id with both timestamps set to now.
    fn create_network(&self, network: NetworkConfig) -> NetworkConfig;
    /// Merge `patch`, keep the id and refresh `updatedAt`.
    fn update_network(&self, id: &str, patch: NetworkPatch) -> Option<NetworkConfig>;
    fn delete_network(&self, id: &str) -> bool;

    fn list_deployments(&self) -> Vec<Deployment>;
    fn get_deployment(&self, id: &str) -> Option<Deployment>;
    /// Start a rollout of the saved network `network_id`.
    fn create_deployment(&self, network_id: &str) -> Result<Deployment>;
    fn update_deployment(&self, id: &str, patch: DeploymentPatch) -> Result<Deployment>;
    fn delete_deployment(&self, id: &str) -> bool;
}

/// In-memory repository. Cloning shares the underlying maps.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    networks: Arc<RwLock<HashMap<String, NetworkConfig>>>,
    deployments: Arc<RwLock<HashMap<String, Deployment>>>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository seeded with one active two-organization network.
    pub fn with_sample_data() -> Self {
        let repo = Self::new();
        let network = sample_network();
        let deployment = sample_deployment(&network);
        info!(network = %network.name, "Seeding sample network");
        repo.networks.write().insert(network.id.clone(), network);
        repo.deployments.write().insert(deployment.id.clone(), deployment);
        repo
    }
}

impl NetworkRepository for MemoryRepository {
    fn list_networks(&self) -> Vec<NetworkConfig> {
        let mut networks: Vec<NetworkConfig> = self.networks.read().values().cloned().collect();
        networks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        networks
    }

    fn get_network(&self, id: &str) -> Option<NetworkConfig> {
        self.networks.read().get(id).cloned()
    }

    fn create_network(&self, mut network: NetworkConfig) -> NetworkConfig {
        let now = Utc::now();
        network.id = new_id();
        network.created_at = Some(now);
        network.updated_at = Some(now);
        info!(id = %network.id, name = %network.name, "Created network");
        self.networks.write().insert(network.id.clone(), network.clone());
        network
    }

    fn update_network(&self, id: &str, patch: NetworkPatch) -> Option<NetworkConfig> {
        let mut networks = self.networks.write();
        let network = networks.get_mut(id)?;
        patch.apply(network);
        network.updated_at = Some(Utc::now());
        Some(network.clone())
    }

    fn delete_network(&self, id: &str) -> bool {
        let removed = self.networks.write().remove(id).is_some();
        if removed {
            info!(id = %id, "Deleted network");
        }
        removed
    }

    fn list_deployments(&self) -> Vec<Deployment> {
        let mut deployments: Vec<Deployment> = self.deployments.read().values().cloned().collect();
        deployments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        deployments
    }

    fn get_deployment(&self, id: &str) -> Option<Deployment> {
        self.deployments.read().get(id).cloned()
    }

    fn create_deployment(&self, network_id: &str) -> Result<Deployment> {
        let network = self
            .get_network(network_id)
            .ok_or_else(|| Error::NetworkNotFound(network_id.to_string()))?;
        let deployment = Deployment::for_network(new_id(), &network, Utc::now());
        info!(id = %deployment.id, network = %network.name, "Deployment started");
        self.deployments.write().insert(deployment.id.clone(), deployment.clone());
        Ok(deployment)
    }

    fn update_deployment(&self, id: &str, patch: DeploymentPatch) -> Result<Deployment> {
        let mut deployments = self.deployments.write();
        let deployment = deployments
            .get_mut(id)
            .ok_or_else(|| Error::DeploymentNotFound(id.to_string()))?;
        deployment.apply(patch, Utc::now())?;
        Ok(deployment.clone())
    }

    fn delete_deployment(&self, id: &str) -> bool {
        self.deployments.write().remove(id).is_some()
    }
}

fn sample_network() -> NetworkConfig {
    let now = Utc::now();
    let peer = |id: &str, name: &str, org: &str| {
        let mut peer = Peer::new(id, name, org);
        peer.host = format!("{}.example.com", name);
        peer
    };
    let ca = |id: &str, name: &str, org: &str| {
        let mut ca = CertificateAuthority::new(id, name, org);
        ca.host = format!("{}.example.com", name);
        ca
    };
    let peers = vec![peer("peer0-org1", "peer0.org1", "org1"), peer("peer0-org2", "peer0.org2", "org2")];
    let mut orderer = Orderer::new("orderer0", "orderer0");
    orderer.host = "orderer.example.com".to_string();

    let mut chaincode = Chaincode::new("cc1", "asset-transfer", "ch1");
    chaincode.language = ChaincodeLanguage::Go;

    let mut network = NetworkConfig::new("Production Network")
        .with_consensus(ConsensusKind::EtcdRaft)
        .with_channel_name("prodchannel")
        .with_entities(Entities {
            organizations: vec![
                Organization::new("org1", "Org1").with_defaults(),
                Organization::new("org2", "Org2").with_defaults(),
            ],
            peers,
            orderers: vec![orderer],
            cas: vec![ca("ca-org1", "ca.org1", "org1"), ca("ca-org2", "ca.org2", "org2")],
            channels: vec![Channel {
                id: "ch1".to_string(),
                name: "prodchannel".to_string(),
                organization_ids: vec!["org1".to_string(), "org2".to_string()],
                orderer_ids: vec!["orderer0".to_string()],
            }],
            chaincodes: vec![chaincode],
        });
    network.id = "sample-1".to_string();
    network.created_at = Some(now);
    network.updated_at = Some(now);
    network.status = Some(NetworkStatus::Active);
    network
}

fn sample_deployment(network: &NetworkConfig) -> Deployment {
    let now = Utc::now();
    let mut deployment = Deployment::for_network("deploy-1", network, now - Duration::days(14));
    deployment.status = NetworkStatus::Active;
    deployment.progress = None;
    deployment.uptime = Some("14d 6h 23m".to_string());
    deployment.last_active = Some(now);
    deployment
}
