//! Validation engine
//!
//! Six fixed rules evaluated in order, every time. A rule never aborts the
//! run; each violating entity produces its own issue so the UI can point at
//! the offending node.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::model::{CertificateAuthority, Chaincode, Channel, Entities, Organization, Orderer, Peer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Passed,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub id: String,
    pub name: String,
    pub status: RuleStatus,
    pub issue_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Identifier of the rule that produced the issue
    pub rule: String,
    #[serde(rename = "type")]
    pub severity: IssueSeverity,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default)]
    pub fixable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub tests: Vec<RuleResult>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.tests.iter().any(|t| t.status == RuleStatus::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count()
    }

    pub fn issues_for(&self, rule: &str) -> impl Iterator<Item = &ValidationIssue> {
        let rule = rule.to_string();
        self.issues.iter().filter(move |i| i.rule == rule)
    }

    fn record(&mut self, id: &str, name: &str, failing: RuleStatus, issues: Vec<ValidationIssue>) {
        let status = if issues.is_empty() { RuleStatus::Passed } else { failing };
        self.tests.push(RuleResult {
            id: id.to_string(),
            name: name.to_string(),
            status,
            issue_count: issues.len(),
        });
        self.issues.extend(issues);
    }
}

fn warning(rule: &str, title: String, description: &str, node_id: &str) -> ValidationIssue {
    ValidationIssue {
        rule: rule.to_string(),
        severity: IssueSeverity::Warning,
        title,
        description: description.to_string(),
        node_id: Some(node_id.to_string()),
        fixable: true,
    }
}

fn hard_error(rule: &str, title: &str, description: &str) -> ValidationIssue {
    ValidationIssue {
        rule: rule.to_string(),
        severity: IssueSeverity::Error,
        title: title.to_string(),
        description: description.to_string(),
        node_id: None,
        fixable: false,
    }
}

/// Evaluate all six rules over the given collections.
pub fn validate(
    organizations: &[Organization],
    peers: &[Peer],
    orderers: &[Orderer],
    cas: &[CertificateAuthority],
    channels: &[Channel],
    chaincodes: &[Chaincode],
) -> ValidationReport {
    let mut report = ValidationReport::default();

    let org_issues = if organizations.is_empty() {
        vec![hard_error(
            "org-count",
            "No organizations defined",
            "Network must have at least one organization",
        )]
    } else {
        Vec::new()
    };
    report.record("org-count", "Organization Count", RuleStatus::Error, org_issues);

    let orderer_issues = if orderers.is_empty() {
        vec![hard_error(
            "orderer-count",
            "No orderers defined",
            "Network must have at least one orderer node",
        )]
    } else {
        Vec::new()
    };
    report.record("orderer-count", "Orderer Presence", RuleStatus::Error, orderer_issues);

    let peer_issues = peers
        .iter()
        .filter(|p| p.organization_id.trim().is_empty())
        .map(|p| {
            warning(
                "peer-org",
                format!("Peer {} has no organization", p.name),
                "Each peer should be connected to an organization",
                &p.id,
            )
        })
        .collect();
    report.record("peer-org", "Peer-Organization Mapping", RuleStatus::Warning, peer_issues);

    let channel_issues = channels
        .iter()
        .filter(|c| c.organization_ids.len() < 2)
        .map(|c| {
            warning(
                "channel-orgs",
                format!("Channel {} has fewer than 2 organizations", c.name),
                "Channels should have at least two organizations for proper decentralization",
                &c.id,
            )
        })
        .collect();
    report.record("channel-orgs", "Channel Organizations", RuleStatus::Warning, channel_issues);

    let chaincode_issues = chaincodes
        .iter()
        .filter(|cc| cc.channel_id.trim().is_empty())
        .map(|cc| {
            warning(
                "chaincode-channel",
                format!("Chaincode {} has no channel", cc.name),
                "Chaincodes must be associated with a channel",
                &cc.id,
            )
        })
        .collect();
    report.record("chaincode-channel", "Chaincode Deployment", RuleStatus::Warning, chaincode_issues);

    let ca_orgs: AHashSet<&str> = cas.iter().map(|ca| ca.organization_id.as_str()).collect();
    let ca_issues = organizations
        .iter()
        .filter(|org| !ca_orgs.contains(org.id.as_str()))
        .map(|org| {
            warning(
                "ca-org",
                format!("Organization {} has no Certificate Authority", org.name),
                "Each organization should have a Certificate Authority for identity management",
                &org.id,
            )
        })
        .collect();
    report.record("ca-org", "CA Configuration", RuleStatus::Warning, ca_issues);

    report
}

pub fn validate_entities(entities: &Entities) -> ValidationReport {
    validate(
        &entities.organizations,
        &entities.peers,
        &entities.orderers,
        &entities.cas,
        &entities.channels,
        &entities.chaincodes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_network_has_exactly_two_errors() {
        let report = validate_entities(&Entities::default());
        assert_eq!(report.tests.len(), 6);
        let errors: Vec<&str> = report
            .tests
            .iter()
            .filter(|t| t.status == RuleStatus::Error)
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(errors, vec!["org-count", "orderer-count"]);
        assert_eq!(
            report.tests.iter().filter(|t| t.status == RuleStatus::Passed).count(),
            4
        );
        assert!(report.issues.iter().all(|i| !i.fixable));
        assert!(report.has_errors());
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let report = validate_entities(&Entities::default());
        let ids: Vec<&str> = report.tests.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["org-count", "orderer-count", "peer-org", "channel-orgs", "chaincode-channel", "ca-org"]
        );
    }

    #[test]
    fn test_unmapped_peers_fan_out() {
        let peers: Vec<Peer> = (0..3).map(|i| Peer::new(format!("p{}", i), format!("peer{}", i), "")).collect();
        let report = validate(&[], &peers, &[], &[], &[], &[]);
        let peer_issues: Vec<&ValidationIssue> = report.issues_for("peer-org").collect();
        assert_eq!(peer_issues.len(), 3);
        assert!(peer_issues.iter().all(|i| i.rule == "peer-org" && i.fixable));
        assert_eq!(peer_issues[2].node_id.as_deref(), Some("p2"));
        assert_eq!(report.tests[2].issue_count, 3);
        assert_eq!(report.tests[2].status, RuleStatus::Warning);
    }

    #[test]
    fn test_healthy_network_passes() {
        let entities = Entities {
            organizations: vec![Organization::new("org1", "Org1"), Organization::new("org2", "Org2")],
            peers: vec![Peer::new("p1", "peer0.org1", "org1")],
            orderers: vec![Orderer::new("o1", "orderer")],
            cas: vec![
                CertificateAuthority::new("ca1", "ca.org1", "org1"),
                CertificateAuthority::new("ca2", "ca.org2", "org2"),
            ],
            channels: vec![Channel {
                id: "ch".into(),
                name: "mychannel".into(),
                organization_ids: vec!["org1".into(), "org2".into()],
                orderer_ids: vec!["o1".into()],
            }],
            chaincodes: vec![Chaincode::new("cc", "basic", "ch")],
        };
        let report = validate_entities(&entities);
        assert!(report.issues.is_empty());
        assert!(report.tests.iter().all(|t| t.status == RuleStatus::Passed));
    }

    #[test]
    fn test_org_without_ca_and_lonely_channel_warn() {
        let orgs = vec![Organization::new("org1", "Org1"), Organization::new("org2", "Org2")];
        let cas = vec![CertificateAuthority::new("ca1", "ca.org1", "org1")];
        let channels = vec![Channel {
            id: "ch".into(),
            name: "solo".into(),
            organization_ids: vec!["org1".into()],
            orderer_ids: vec![],
        }];
        let chaincodes = vec![Chaincode::new("cc", "orphan", "")];
        let report = validate(&orgs, &[], &[Orderer::new("o", "orderer")], &cas, &channels, &chaincodes);

        assert!(!report.has_errors());
        assert_eq!(report.warning_count(), 3);
        assert_eq!(report.issues_for("ca-org").next().unwrap().node_id.as_deref(), Some("org2"));
        assert_eq!(report.issues_for("channel-orgs").count(), 1);
        assert_eq!(report.issues_for("chaincode-channel").count(), 1);
    }
}
