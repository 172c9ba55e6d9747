//! Render-ready views of an evaluated tree.
//!
//! Renderers get ids, labels, kinds, values, risks and edges without
//! needing any of the combination logic themselves.

use generational_arena::Index;
use serde::Serialize;
use termtree::Tree;

use crate::domain::arena::AttackTree;
use crate::domain::evaluator::evaluate_all;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: String,
    pub name: String,
    pub kind: String,
    /// Leaf value, `None` for gates
    pub value: Option<f64>,
    pub risk: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub parent: String,
    pub child: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeView {
    pub title: String,
    pub root: String,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<Edge>,
}

impl AttackTree {
    /// Snapshot of every node with its evaluated risk, plus the edge list.
    pub fn view(&self) -> TreeView {
        let risks = evaluate_all(self);
        let nodes = self
            .iter()
            .map(|(_, node)| NodeView {
                id: node.data.id.clone(),
                name: node.data.name.clone(),
                kind: node.data.kind.to_string(),
                value: node.data.kind.value(),
                risk: risks.get(&node.data.id).copied().unwrap_or(0.0),
            })
            .collect();
        let edges = self
            .edges()
            .into_iter()
            .map(|(parent, child)| Edge {
                parent: parent.to_string(),
                child: child.to_string(),
            })
            .collect();

        TreeView {
            title: self.title().to_string(),
            root: self.root_id().to_string(),
            nodes,
            edges,
        }
    }
}

/// Conversion into a `termtree` for terminal display.
pub trait TreeDisplay {
    fn to_tree_string(&self, money: &dyn Fn(f64) -> String) -> Tree<String>;
}

impl TreeDisplay for AttackTree {
    fn to_tree_string(&self, money: &dyn Fn(f64) -> String) -> Tree<String> {
        let risks = evaluate_all(self);

        let label = |idx: Index| -> String {
            match self.get_node(idx) {
                Some(node) => {
                    let risk = risks.get(&node.data.id).copied().unwrap_or(0.0);
                    if node.data.kind.is_leaf() {
                        format!("{} [leaf] {}", node.data.name, money(risk))
                    } else {
                        format!("{} [{}] risk {}", node.data.name, node.data.kind, money(risk))
                    }
                }
                None => String::new(),
            }
        };

        fn build_tree(
            tree: &AttackTree,
            node_idx: Index,
            parent_tree: &mut Tree<String>,
            label: &dyn Fn(Index) -> String,
        ) {
            if let Some(node) = tree.get_node(node_idx) {
                for &child_idx in &node.children {
                    let mut child_tree = Tree::new(label(child_idx));
                    build_tree(tree, child_idx, &mut child_tree, label);
                    parent_tree.push(child_tree);
                }
            }
        }

        let root = self.root();
        let mut out = Tree::new(label(root));
        build_tree(self, root, &mut out, &label);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::build;
    use crate::domain::entities::{RawNode, TreeDescription};

    fn sample() -> AttackTree {
        build(&TreeDescription {
            name: Some("Payments".to_string()),
            root: Some(RawNode::gate(
                "root",
                "Steal money",
                "OR",
                vec![
                    RawNode::leaf("card", "Card skimming", 500.0),
                    RawNode::gate(
                        "phish",
                        "Phishing",
                        "AND",
                        vec![
                            RawNode::leaf("mail", "Send mail", 100.0),
                            RawNode::leaf("login", "Use login", 700.0),
                        ],
                    ),
                ],
            )),
        })
        .unwrap()
    }

    #[test]
    fn given_tree_when_viewing_then_exposes_risks_and_edges() {
        let view = sample().view();

        assert_eq!(view.root, "root");
        assert_eq!(view.nodes.len(), 5);
        assert_eq!(view.nodes[0].risk, 800.0);
        assert_eq!(view.nodes[0].kind, "OR");
        assert_eq!(view.nodes[0].value, None);
        let phish = view.nodes.iter().find(|n| n.id == "phish").unwrap();
        assert_eq!(phish.risk, 800.0);
        assert_eq!(view.edges.len(), 4);
        assert_eq!(
            view.edges[0],
            Edge {
                parent: "root".to_string(),
                child: "card".to_string()
            }
        );
    }

    #[test]
    fn given_tree_when_rendering_then_lists_every_node() {
        let rendered = sample()
            .to_tree_string(&|v| format!("{:.0}", v))
            .to_string();

        assert!(rendered.starts_with("Steal money [OR] risk 800"));
        assert!(rendered.contains("Card skimming [leaf] 500"));
        assert!(rendered.contains("Phishing [AND] risk 800"));
        assert_eq!(rendered.lines().count(), 5);
    }
}
