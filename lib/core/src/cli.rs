//! `peer` CLI command generator
//!
//! Renders the six lifecycle commands an operator runs after the network is
//! up, addressed at the same hostnames and crypto paths the documents use.

use serde::{Deserialize, Serialize};

use crate::extract::Topology;
use crate::naming;

const CLI_CRYPTO_ROOT: &str = "/opt/gopath/src/github.com/hyperledger/fabric/peer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeerCommand {
    CreateChannel,
    JoinChannel,
    InstallChaincode,
    ApproveChaincode,
    CommitChaincode,
    InvokeChaincode,
}

impl PeerCommand {
    pub const ALL: [PeerCommand; 6] = [
        PeerCommand::CreateChannel,
        PeerCommand::JoinChannel,
        PeerCommand::InstallChaincode,
        PeerCommand::ApproveChaincode,
        PeerCommand::CommitChaincode,
        PeerCommand::InvokeChaincode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeerCommand::CreateChannel => "create-channel",
            PeerCommand::JoinChannel => "join-channel",
            PeerCommand::InstallChaincode => "install-chaincode",
            PeerCommand::ApproveChaincode => "approve-chaincode",
            PeerCommand::CommitChaincode => "commit-chaincode",
            PeerCommand::InvokeChaincode => "invoke-chaincode",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PeerCommand::CreateChannel => "Create Channel",
            PeerCommand::JoinChannel => "Join Channel",
            PeerCommand::InstallChaincode => "Install Chaincode",
            PeerCommand::ApproveChaincode => "Approve Chaincode",
            PeerCommand::CommitChaincode => "Commit Chaincode",
            PeerCommand::InvokeChaincode => "Invoke Chaincode",
        }
    }
}

impl std::fmt::Display for PeerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PeerCommand {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        PeerCommand::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| crate::Error::InvalidInput(format!("unknown peer command '{}'", s)))
    }
}

/// Values substituted into every command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliContext {
    pub channel: String,
    pub orderer_domain: String,
    pub orderer_fqdn: String,
    pub org_name: String,
    pub org_domain: String,
    pub peer_host: String,
    pub chaincode: String,
    pub chaincode_version: String,
}

impl CliContext {
    pub fn from_topology(topology: &Topology) -> Self {
        let orderer_domain = topology.orderer_domain.clone();
        let orderer_fqdn = topology
            .orderers
            .first()
            .map(|o| o.fqdn(&orderer_domain))
            .unwrap_or_else(|| naming::orderer_fqdn(0, &orderer_domain));
        let (org_name, org_domain) = topology
            .organizations
            .first()
            .map(|o| (o.name.clone(), o.domain.clone()))
            .unwrap_or_else(|| ("Org1".to_string(), naming::default_domain("Org1")));
        let (chaincode, chaincode_version) = topology
            .entities
            .chaincodes
            .first()
            .map(|cc| (cc.name.clone(), cc.version.clone()))
            .unwrap_or_else(|| ("mycc".to_string(), "1.0".to_string()));

        Self {
            channel: topology.channel_name.clone(),
            peer_host: naming::peer_hostname(0, &org_domain),
            orderer_domain,
            orderer_fqdn,
            org_name,
            org_domain,
            chaincode,
            chaincode_version,
        }
    }

    fn orderer_address(&self) -> String {
        format!("{}:{}", self.orderer_fqdn, naming::ORDERER_LISTEN_PORT)
    }

    fn peer_address(&self) -> String {
        format!("{}:{}", self.peer_host, naming::PEER_LISTEN_PORT)
    }

    fn orderer_ca(&self) -> String {
        format!(
            "{}/crypto/ordererOrganizations/{}/orderers/{}/msp/tlscacerts/tlsca.{}-cert.pem",
            CLI_CRYPTO_ROOT, self.orderer_domain, self.orderer_fqdn, self.orderer_domain
        )
    }

    fn peer_root_cert(&self) -> String {
        format!(
            "{}/crypto/peerOrganizations/{}/peers/{}/tls/ca.crt",
            CLI_CRYPTO_ROOT, self.org_domain, self.peer_host
        )
    }

    pub fn description(&self, command: PeerCommand) -> String {
        match command {
            PeerCommand::CreateChannel => format!("Initialize channel \"{}\" on the network", self.channel),
            PeerCommand::JoinChannel => format!("Join {} to channel \"{}\"", self.peer_host, self.channel),
            PeerCommand::InstallChaincode => format!("Install chaincode on {}", self.peer_host),
            PeerCommand::ApproveChaincode => format!("Approve chaincode definition for {}", self.org_name),
            PeerCommand::CommitChaincode => "Commit chaincode definition to the channel".to_string(),
            PeerCommand::InvokeChaincode => "Invoke a chaincode function".to_string(),
        }
    }

    /// Multi-line shell command with `\` continuations
    pub fn render(&self, command: PeerCommand) -> String {
        let lines: Vec<String> = match command {
            PeerCommand::CreateChannel => vec![
                "peer channel create".to_string(),
                format!("-o {}", self.orderer_address()),
                format!("-c {}", self.channel),
                format!("-f ./channel-artifacts/{}.tx", self.channel),
                format!("--tls --cafile {}", self.orderer_ca()),
            ],
            PeerCommand::JoinChannel => vec![
                "peer channel join".to_string(),
                format!("-b {}.block", self.channel),
            ],
            PeerCommand::InstallChaincode => vec![
                "peer lifecycle chaincode install".to_string(),
                format!("{}.tar.gz", self.chaincode),
            ],
            PeerCommand::ApproveChaincode => vec![
                "peer lifecycle chaincode approveformyorg".to_string(),
                format!("-o {}", self.orderer_address()),
                format!("--channelID {}", self.channel),
                format!("--name {}", self.chaincode),
                format!("--version {}", self.chaincode_version),
                format!("--package-id {}_{}:hash", self.chaincode, self.chaincode_version),
                "--sequence 1".to_string(),
                format!("--tls --cafile {}", self.orderer_ca()),
            ],
            PeerCommand::CommitChaincode => vec![
                "peer lifecycle chaincode commit".to_string(),
                format!("-o {}", self.orderer_address()),
                format!("--channelID {}", self.channel),
                format!("--name {}", self.chaincode),
                format!("--version {}", self.chaincode_version),
                "--sequence 1".to_string(),
                format!("--tls --cafile {}", self.orderer_ca()),
                format!("--peerAddresses {}", self.peer_address()),
                format!("--tlsRootCertFiles {}", self.peer_root_cert()),
            ],
            PeerCommand::InvokeChaincode => vec![
                "peer chaincode invoke".to_string(),
                format!("-o {}", self.orderer_address()),
                format!("-C {}", self.channel),
                format!("-n {}", self.chaincode),
                r#"-c '{"function":"initLedger","Args":[]}'"#.to_string(),
                format!("--tls --cafile {}", self.orderer_ca()),
                format!("--peerAddresses {}", self.peer_address()),
                format!("--tlsRootCertFiles {}", self.peer_root_cert()),
            ],
        };
        lines.join(" \\\n  ")
    }
}

/// Render `command` for `topology`.
pub fn peer_command(topology: &Topology, command: PeerCommand) -> String {
    CliContext::from_topology(topology).render(command)
}

/// One entry of the command catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandEntry {
    pub command: PeerCommand,
    pub title: &'static str,
    pub description: String,
    pub script: String,
}

/// Every command rendered for `topology`, in lifecycle order.
pub fn peer_commands(topology: &Topology) -> Vec<CommandEntry> {
    let ctx = CliContext::from_topology(topology);
    PeerCommand::ALL
        .into_iter()
        .map(|command| CommandEntry {
            command,
            title: command.title(),
            description: ctx.description(command),
            script: ctx.render(command),
        })
        .collect()
}
