//! Risk evaluation: propagates leaf values up through OR/AND gates.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{instrument, warn};

use crate::domain::arena::AttackTree;
use crate::domain::entities::{Anomaly, GateKind, NodeKind};
use crate::domain::error::{DomainError, DomainResult};

/// Risk of the node `id`.
///
/// Leaves return their value, gates combine their children: OR takes the
/// maximum, AND the sum, unrecognized kinds fall back to OR. A gate
/// without children is 0.
pub fn evaluate(tree: &AttackTree, id: &str) -> DomainResult<f64> {
    let idx = tree
        .index_of(id)
        .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
    Ok(node_risk(tree, idx))
}

fn node_risk(tree: &AttackTree, idx: Index) -> f64 {
    let Some(node) = tree.get_node(idx) else {
        return 0.0;
    };
    match &node.data.kind {
        NodeKind::Leaf { value } => *value,
        NodeKind::Gate(gate) => {
            let child_risks: Vec<f64> = node
                .children
                .iter()
                .map(|&child| node_risk(tree, child))
                .collect();
            combine(&node.data.id, gate, &child_risks)
        }
    }
}

fn combine(id: &str, gate: &GateKind, child_risks: &[f64]) -> f64 {
    if child_risks.is_empty() {
        warn!("Gate '{}' has no children, contributes 0", id);
        return 0.0;
    }
    match gate {
        GateKind::Or => max(child_risks),
        GateKind::And => child_risks.iter().sum(),
        GateKind::Unrecognized(kind) => {
            warn!("Gate '{}' has unrecognized kind '{}', using OR", id, kind);
            max(child_risks)
        }
    }
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

/// Risk of every node, keyed by id.
///
/// Computed bottom-up in a single post-order pass; results equal
/// [`evaluate`] for each node.
#[instrument(level = "debug", skip_all)]
pub fn evaluate_all(tree: &AttackTree) -> HashMap<String, f64> {
    let mut risks: HashMap<Index, f64> = HashMap::with_capacity(tree.node_count());
    for (idx, node) in tree.iter_postorder() {
        let risk = match &node.data.kind {
            NodeKind::Leaf { value } => *value,
            NodeKind::Gate(gate) => {
                let child_risks: Vec<f64> = node
                    .children
                    .iter()
                    .map(|child| risks.get(child).copied().unwrap_or(0.0))
                    .collect();
                combine(&node.data.id, gate, &child_risks)
            }
        };
        risks.insert(idx, risk);
    }

    tree.iter()
        .map(|(idx, node)| {
            (
                node.data.id.clone(),
                risks.get(&idx).copied().unwrap_or(0.0),
            )
        })
        .collect()
}

impl AttackTree {
    /// Overall risk exposure: the risk of the root.
    pub fn overall_risk(&self) -> f64 {
        node_risk(self, self.root())
    }

    /// Gates without children and gates of unrecognized kind, in construction order.
    pub fn anomalies(&self) -> Vec<Anomaly> {
        let mut found = Vec::new();
        for (_, node) in self.iter() {
            if let NodeKind::Gate(gate) = &node.data.kind {
                if let GateKind::Unrecognized(kind) = gate {
                    found.push(Anomaly::UnknownGateKind {
                        id: node.data.id.clone(),
                        kind: kind.clone(),
                    });
                }
                if node.children.is_empty() {
                    found.push(Anomaly::EmptyGate {
                        id: node.data.id.clone(),
                    });
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::build;
    use crate::domain::entities::{RawNode, TreeDescription};
    use rstest::rstest;

    fn tree(root: RawNode) -> AttackTree {
        build(&TreeDescription {
            name: Some("Test".to_string()),
            root: Some(root),
        })
        .unwrap()
    }

    fn leaves(values: &[f64]) -> Vec<RawNode> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| RawNode::leaf(&format!("leaf{}", i), &format!("Attack {}", i), *v))
            .collect()
    }

    #[rstest]
    #[case("OR", &[100.0, 200.0], 200.0)]
    #[case("AND", &[100.0, 200.0], 300.0)]
    #[case("OR", &[5.0, 50.0, 20.0], 50.0)]
    #[case("AND", &[5.0, 50.0, 20.0], 75.0)]
    #[case("XOR", &[100.0, 200.0], 200.0)]
    #[case("OR", &[0.0, 0.0], 0.0)]
    fn test_flat_gate_semantics(#[case] kind: &str, #[case] values: &[f64], #[case] expected: f64) {
        let t = tree(RawNode::gate("root", "Root", kind, leaves(values)));
        assert_eq!(evaluate(&t, "root").unwrap(), expected);
    }

    // Scenario C
    #[test]
    fn given_or_over_and_subtrees_when_evaluating_then_picks_larger_sum() {
        let t = tree(RawNode::gate(
            "root",
            "Root",
            "OR",
            vec![
                RawNode::gate(
                    "s1",
                    "Subtree 1",
                    "AND",
                    vec![RawNode::leaf("a", "A", 50.0), RawNode::leaf("b", "B", 50.0)],
                ),
                RawNode::gate(
                    "s2",
                    "Subtree 2",
                    "AND",
                    vec![
                        RawNode::leaf("c", "C", 30.0),
                        RawNode::leaf("d", "D", 30.0),
                        RawNode::leaf("e", "E", 30.0),
                    ],
                ),
            ],
        ));

        assert_eq!(t.overall_risk(), 100.0);
        assert_eq!(evaluate(&t, "s2").unwrap(), 90.0);
    }

    // Scenario E
    #[test]
    fn given_gate_without_children_when_evaluating_then_zero_and_flagged() {
        let t = tree(RawNode::gate("root", "Empty", "AND", vec![]));

        assert_eq!(t.overall_risk(), 0.0);
        assert_eq!(
            t.anomalies(),
            vec![Anomaly::EmptyGate {
                id: "root".to_string()
            }]
        );
    }

    #[test]
    fn given_unrecognized_kind_when_listing_anomalies_then_reported() {
        let t = tree(RawNode::gate("root", "Root", "XOR", leaves(&[1.0])));
        assert_eq!(
            t.anomalies(),
            vec![Anomaly::UnknownGateKind {
                id: "root".to_string(),
                kind: "XOR".to_string()
            }]
        );
    }

    #[test]
    fn given_leaf_root_when_evaluating_then_returns_value() {
        let t = tree(RawNode::leaf("only", "Only", 42.0));
        assert_eq!(t.overall_risk(), 42.0);
        assert!(t.anomalies().is_empty());
    }

    #[test]
    fn given_unknown_id_when_evaluating_then_not_found() {
        let t = tree(RawNode::leaf("only", "Only", 42.0));
        assert_eq!(
            evaluate(&t, "nope"),
            Err(DomainError::NodeNotFound("nope".to_string()))
        );
    }

    #[test]
    fn given_mixed_tree_when_evaluating_all_then_matches_evaluate() {
        let t = tree(RawNode::gate(
            "root",
            "Root",
            "AND",
            vec![
                RawNode::gate("o", "Either", "OR", leaves(&[3.0, 7.0])),
                RawNode::leaf("z", "Z", 11.0),
                RawNode::gate("empty", "Nothing", "OR", vec![]),
            ],
        ));

        let all = evaluate_all(&t);

        assert_eq!(all.len(), t.node_count());
        for (id, risk) in &all {
            assert_eq!(*risk, evaluate(&t, id).unwrap(), "node {}", id);
        }
        assert_eq!(all["root"], 18.0);
    }

    #[test]
    fn given_unchanged_tree_when_evaluating_twice_then_identical() {
        let t = tree(RawNode::gate("root", "Root", "AND", leaves(&[0.1, 0.2, 0.3])));
        assert_eq!(t.overall_risk(), t.overall_risk());
    }

    // Scenario D
    #[rstest]
    #[case::selected_branch(10.0, 400.0)]
    #[case::dominated_branch(1000.0, 0.0)]
    fn test_mutation_inside_and_subtree(#[case] other_branch: f64, #[case] expected_increase: f64) {
        let mut t = tree(RawNode::gate(
            "root",
            "Root",
            "OR",
            vec![
                RawNode::gate(
                    "and",
                    "Both",
                    "AND",
                    vec![RawNode::leaf("m", "M", 100.0), RawNode::leaf("n", "N", 100.0)],
                ),
                RawNode::leaf("other", "Other", other_branch),
            ],
        ));
        let before = t.overall_risk();

        t.set_leaf_value("m", 500.0).unwrap();

        assert_eq!(t.overall_risk() - before, expected_increase);
    }
}
