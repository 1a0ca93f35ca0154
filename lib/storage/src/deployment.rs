//! Deployment records and their lifecycle
//!
//! ```text
//! Deploying(p) --advance(100)--> Active <--> Stopped
//!      |
//!      +------------fail---------> Error --retry--> Deploying(0)
//! ```
//!
//! Nothing here runs a timer. Whoever drives the rollout calls
//! [`Deployment::advance`] as progress is reported.

use chrono::{DateTime, Utc};
use fabrix_core::{Error, NetworkConfig, NetworkStatus, Result, Topology};
use serde::{Deserialize, Serialize};

pub const PROGRESS_COMPLETE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    pub network_id: String,
    pub network_name: String,
    pub status: NetworkStatus,
    pub total_nodes: usize,
    pub peer_count: usize,
    pub orderer_count: usize,
    pub ca_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
}

/// Partial update of a deployment. Status and progress changes go through
/// the lifecycle checks; `uptime` is free text reported by the runtime.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPatch {
    pub status: Option<NetworkStatus>,
    pub progress: Option<u8>,
    pub uptime: Option<String>,
}

fn invalid(from: NetworkStatus, to: impl Into<String>) -> Error {
    Error::InvalidTransition {
        from: from.as_str().to_string(),
        to: to.into(),
    }
}

impl Deployment {
    /// New rollout of `network`, starting at `Deploying(0)`.
    pub fn for_network(id: impl Into<String>, network: &NetworkConfig, now: DateTime<Utc>) -> Self {
        let counts = Topology::from_network(network).counts;
        Self {
            id: id.into(),
            network_id: network.id.clone(),
            network_name: network.name.clone(),
            status: NetworkStatus::Deploying,
            total_nodes: counts.peers + counts.orderers + counts.cas,
            peer_count: counts.peers,
            orderer_count: counts.orderers,
            ca_count: counts.cas,
            uptime: None,
            progress: Some(0),
            created_at: now,
            last_active: None,
        }
    }

    /// Record rollout progress. Progress never moves backwards; reaching
    /// 100 makes the deployment active.
    pub fn advance(&mut self, progress: u8, now: DateTime<Utc>) -> Result<()> {
        if self.status != NetworkStatus::Deploying {
            return Err(invalid(self.status, format!("deploying({})", progress)));
        }
        let current = self.progress.unwrap_or(0);
        if progress < current || progress > PROGRESS_COMPLETE {
            return Err(Error::InvalidInput(format!(
                "progress must stay within {}..={}, got {}",
                current, PROGRESS_COMPLETE, progress
            )));
        }
        self.progress = Some(progress);
        self.last_active = Some(now);
        if progress == PROGRESS_COMPLETE {
            self.status = NetworkStatus::Active;
        }
        Ok(())
    }

    pub fn can_transition(from: NetworkStatus, to: NetworkStatus) -> bool {
        use NetworkStatus::*;
        matches!(
            (from, to),
            (Deploying, Active | Error)
                | (Active, Stopped)
                | (Stopped, Active)
                | (Error, Deploying)
        ) || (from == to && from != Deploying)
    }

    pub fn transition(&mut self, to: NetworkStatus, now: DateTime<Utc>) -> Result<()> {
        if !Self::can_transition(self.status, to) {
            return Err(invalid(self.status, to.as_str()));
        }
        match (self.status, to) {
            (NetworkStatus::Error, NetworkStatus::Deploying) => self.progress = Some(0),
            (NetworkStatus::Deploying, NetworkStatus::Active) => self.progress = Some(PROGRESS_COMPLETE),
            _ => {}
        }
        self.status = to;
        self.last_active = Some(now);
        Ok(())
    }

    /// Apply `patch` atomically: on error the record is left unchanged.
    pub fn apply(&mut self, patch: DeploymentPatch, now: DateTime<Utc>) -> Result<()> {
        let mut next = self.clone();
        if let Some(progress) = patch.progress {
            next.advance(progress, now)?;
        }
        if let Some(status) = patch.status {
            if status != next.status {
                next.transition(status, now)?;
            }
        }
        if let Some(uptime) = patch.uptime {
            next.uptime = Some(uptime);
        }
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabrix_core::{CertificateAuthority, Edge, Entities, Node, NodeKind, Orderer, Peer};

    fn deployment() -> Deployment {
        let mut network = NetworkConfig::new("net").with_entities(Entities {
            peers: vec![Peer::new("p0", "peer0", "org1"), Peer::new("p1", "peer1", "org1")],
            orderers: vec![Orderer::new("o", "orderer")],
            cas: vec![CertificateAuthority::new("ca", "ca.org1", "org1")],
            ..Default::default()
        });
        network.id = "n1".to_string();
        Deployment::for_network("d1", &network, Utc::now())
    }

    #[test]
    fn test_new_deployment_counts_nodes() {
        let d = deployment();
        assert_eq!(d.status, NetworkStatus::Deploying);
        assert_eq!(d.progress, Some(0));
        assert_eq!((d.total_nodes, d.peer_count, d.orderer_count, d.ca_count), (4, 2, 1, 1));
        assert_eq!(d.network_id, "n1");
    }

    #[test]
    fn test_graph_only_network_counts_nodes() {
        let network = NetworkConfig::new("canvas").with_graph(
            vec![
                Node::new("org1", NodeKind::Organization, "Org1"),
                Node::new("p0", NodeKind::Peer, "peer0"),
                Node::new("p1", NodeKind::Peer, "peer1"),
                Node::new("o0", NodeKind::Orderer, "orderer"),
                Node::new("ca", NodeKind::CertificateAuthority, "ca.org1"),
            ],
            vec![Edge::new("e0", "p0", "org1"), Edge::new("e1", "p1", "org1")],
        );
        let d = Deployment::for_network("d2", &network, Utc::now());
        assert_eq!((d.total_nodes, d.peer_count, d.orderer_count, d.ca_count), (4, 2, 1, 1));
    }

    #[test]
    fn test_progress_is_monotonic_and_completes() {
        let mut d = deployment();
        for step in [10, 25, 40, 60, 80] {
            d.advance(step, Utc::now()).unwrap();
            assert_eq!(d.status, NetworkStatus::Deploying);
        }
        assert!(d.advance(70, Utc::now()).is_err());
        d.advance(100, Utc::now()).unwrap();
        assert_eq!(d.status, NetworkStatus::Active);
        assert!(matches!(d.advance(100, Utc::now()), Err(Error::InvalidTransition { .. })));
    }

    #[test]
    fn test_transition_table() {
        use NetworkStatus::*;
        assert!(Deployment::can_transition(Active, Stopped));
        assert!(Deployment::can_transition(Stopped, Active));
        assert!(Deployment::can_transition(Error, Deploying));
        assert!(!Deployment::can_transition(Stopped, Deploying));
        assert!(!Deployment::can_transition(Active, Deploying));
        assert!(!Deployment::can_transition(Error, Active));
    }

    #[test]
    fn test_retry_after_error_resets_progress() {
        let mut d = deployment();
        d.advance(40, Utc::now()).unwrap();
        d.transition(NetworkStatus::Error, Utc::now()).unwrap();
        d.transition(NetworkStatus::Deploying, Utc::now()).unwrap();
        assert_eq!(d.progress, Some(0));
    }

    #[test]
    fn test_rejected_patch_leaves_record_untouched() {
        let mut d = deployment();
        let before = d.clone();
        let patch = DeploymentPatch {
            status: Some(NetworkStatus::Stopped),
            uptime: Some("1h".to_string()),
            ..Default::default()
        };
        assert!(d.apply(patch, Utc::now()).is_err());
        assert_eq!(d, before);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(deployment()).unwrap();
        assert_eq!(json["status"], "deploying");
        assert_eq!(json["networkName"], "net");
        assert_eq!(json["totalNodes"], 4);
        assert!(json.get("lastActive").is_none());
    }
}
