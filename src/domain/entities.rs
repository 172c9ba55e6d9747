//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw, unvalidated tree description as supplied by a loader.
///
/// Every field is optional so that missing data surfaces as a
/// [`DomainError::MalformedTree`](crate::domain::DomainError) with a location,
/// instead of an opaque deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeDescription {
    /// Display title for the whole tree
    pub name: Option<String>,
    /// Top-level node
    pub root: Option<RawNode>,
}

/// Raw node inside a [`TreeDescription`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: Option<String>,
    pub name: Option<String>,
    /// `leaf`, `OR`, `AND` (anything else is an unrecognized gate)
    #[serde(rename = "type", alias = "kind")]
    pub kind: Option<String>,
    pub value: Option<f64>,
    pub children: Option<Vec<RawNode>>,
}

impl RawNode {
    /// Leaf node with a value.
    pub fn leaf(id: &str, name: &str, value: f64) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            kind: Some("leaf".to_string()),
            value: Some(value),
            children: None,
        }
    }

    /// Gate node of the given kind with children.
    pub fn gate(id: &str, name: &str, kind: &str, children: Vec<RawNode>) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            kind: Some(kind.to_string()),
            value: None,
            children: Some(children),
        }
    }
}

/// Combination rule of an internal node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// Attacker needs one path: worst child
    Or,
    /// Every step required: sum of children
    And,
    /// Kind string not known to the engine, evaluated as `Or`
    Unrecognized(String),
}

/// Kind of a node together with the data only that kind carries.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf { value: f64 },
    Gate(GateKind),
}

impl NodeKind {
    /// Parse the source `type` string. Matching is exact.
    pub fn parse(kind: &str, value: f64) -> Self {
        match kind {
            "leaf" => NodeKind::Leaf { value },
            "OR" => NodeKind::Gate(GateKind::Or),
            "AND" => NodeKind::Gate(GateKind::And),
            other => NodeKind::Gate(GateKind::Unrecognized(other.to_string())),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Leaf { .. })
    }

    /// Leaf value, `None` for gates.
    pub fn value(&self) -> Option<f64> {
        match self {
            NodeKind::Leaf { value } => Some(*value),
            NodeKind::Gate(_) => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Leaf { .. } => write!(f, "leaf"),
            NodeKind::Gate(GateKind::Or) => write!(f, "OR"),
            NodeKind::Gate(GateKind::And) => write!(f, "AND"),
            NodeKind::Gate(GateKind::Unrecognized(raw)) => write!(f, "{}", raw),
        }
    }
}

/// Data payload of a tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Unique addressing key
    pub id: String,
    /// Human-readable label, not necessarily unique
    pub name: String,
    pub kind: NodeKind,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// A leaf as exposed for prompting and reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafEntry {
    pub id: String,
    pub name: String,
    pub value: f64,
}

/// Modelling conditions that do not stop evaluation but must be reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "anomaly", rename_all = "kebab-case")]
pub enum Anomaly {
    /// Gate without children, contributes 0
    EmptyGate { id: String },
    /// Gate kind not known to the engine, evaluated with OR semantics
    UnknownGateKind { id: String, kind: String },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::EmptyGate { id } => {
                write!(f, "gate '{}' has no children and contributes 0", id)
            }
            Anomaly::UnknownGateKind { id, kind } => write!(
                f,
                "gate '{}' has unrecognized kind '{}', evaluated as OR",
                id, kind
            ),
        }
    }
}
