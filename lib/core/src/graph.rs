// Canvas graph - typed nodes and undirected edges
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::validation::{IssueSeverity, ValidationIssue};

pub type NodeId = String;
pub type EdgeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Organization,
    Peer,
    Orderer,
    #[serde(rename = "ca")]
    CertificateAuthority,
    Channel,
    #[serde(rename = "chaincode")]
    SmartContractUnit,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Organization => "organization",
            NodeKind::Peer => "peer",
            NodeKind::Orderer => "orderer",
            NodeKind::CertificateAuthority => "ca",
            NodeKind::Channel => "channel",
            NodeKind::SmartContractUnit => "chaincode",
        }
    }

    /// Connection rules enforced by the canvas when a user draws an edge.
    pub fn can_connect(source: NodeKind, target: NodeKind) -> bool {
        use NodeKind::*;
        let allowed = |kind: NodeKind, other: NodeKind| match kind {
            Peer | CertificateAuthority => other == Organization,
            Orderer => matches!(other, Channel | Organization),
            Channel => matches!(other, Organization | Orderer | SmartContractUnit),
            SmartContractUnit => other == Channel,
            Organization => true,
        };
        allowed(source, target) && allowed(target, source)
    }
}

/// Canvas coordinates; irrelevant to compilation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    #[serde(alias = "source")]
    pub source_node_id: NodeId,
    #[serde(alias = "target")]
    pub target_node_id: NodeId,
}

impl Node {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            description: None,
            position: Position::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }
}

impl Edge {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<EdgeId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source_node_id: source.into(),
            target_node_id: target.into(),
        }
    }

    /// The endpoint opposite `node_id`, if `node_id` is one of the endpoints
    #[inline]
    pub fn other_end(&self, node_id: &str) -> Option<&str> {
        if self.source_node_id == node_id {
            Some(&self.target_node_id)
        } else if self.target_node_id == node_id {
            Some(&self.source_node_id)
        } else {
            None
        }
    }
}

/// Borrowed view over a node/edge snapshot with adjacency lookups
pub struct TopologyGraph<'a> {
    nodes: &'a [Node],
    edges: &'a [Edge],
    index: AHashMap<&'a str, usize>,
}

impl<'a> TopologyGraph<'a> {
    pub fn new(nodes: &'a [Node], edges: &'a [Edge]) -> Self {
        let mut index = AHashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            // first occurrence wins for duplicated ids
            index.entry(node.id.as_str()).or_insert(i);
        }
        Self { nodes, edges, index }
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &'a Node> + '_ {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    fn is_dangling(&self, edge: &Edge) -> bool {
        !self.index.contains_key(edge.source_node_id.as_str())
            || !self.index.contains_key(edge.target_node_id.as_str())
    }

    /// Nodes of `kind` adjacent to `node_id`, in canvas order, deduplicated.
    /// Dangling edges are ignored.
    pub fn neighbors(&self, node_id: &str, kind: NodeKind) -> Vec<&'a Node> {
        let adjacent: AHashSet<&str> = self
            .edges
            .iter()
            .filter(|e| !self.is_dangling(e))
            .filter_map(|e| e.other_end(node_id))
            .collect();

        self.nodes_of(kind)
            .filter(|n| n.id != node_id && adjacent.contains(n.id.as_str()))
            .collect()
    }

    pub fn dangling_edges(&self) -> impl Iterator<Item = &'a Edge> + '_ {
        self.edges.iter().filter(move |e| self.is_dangling(e))
    }

    /// Structural problems of the raw graph: duplicated node ids, edges
    /// pointing at missing nodes and edges the canvas would have refused.
    pub fn integrity_issues(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let mut seen = AHashSet::with_capacity(self.nodes.len());
        for node in self.nodes {
            if !seen.insert(node.id.as_str()) {
                issues.push(ValidationIssue {
                    rule: "graph-duplicate-node".to_string(),
                    severity: IssueSeverity::Error,
                    title: format!("Duplicate node id {}", node.id),
                    description: "Node ids must be unique within a topology".to_string(),
                    node_id: Some(node.id.clone()),
                    fixable: false,
                });
            }
        }

        for edge in self.dangling_edges() {
            issues.push(ValidationIssue {
                rule: "graph-dangling-edge".to_string(),
                severity: IssueSeverity::Warning,
                title: format!("Edge {} references a missing node", edge.id),
                description: format!(
                    "Edge connects {} and {}, but at least one of them does not exist",
                    edge.source_node_id, edge.target_node_id
                ),
                node_id: None,
                fixable: true,
            });
        }

        for edge in self.edges.iter().filter(|e| !self.is_dangling(e)) {
            let (Some(source), Some(target)) =
                (self.node(&edge.source_node_id), self.node(&edge.target_node_id))
            else {
                continue;
            };
            if !NodeKind::can_connect(source.kind, target.kind) {
                issues.push(ValidationIssue {
                    rule: "graph-connection".to_string(),
                    severity: IssueSeverity::Warning,
                    title: format!(
                        "A {} cannot connect to a {}",
                        source.kind.as_str(),
                        target.kind.as_str()
                    ),
                    description: format!(
                        "Edge {} between {} and {} is ignored during compilation",
                        edge.id, source.label, target.label
                    ),
                    node_id: Some(source.id.clone()),
                    fixable: true,
                });
            }
        }

        issues
    }
}
