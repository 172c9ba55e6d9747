//! Arena-backed attack tree storage and the leaf value store.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::entities::{LeafEntry, NodeData, NodeKind};
use crate::domain::error::{DomainError, DomainResult};

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in declaration order
    pub children: Vec<Index>,
}

/// Attack tree: a single-rooted hierarchy of gates and leaves.
///
/// Structure (ids, names, kinds, edges) is fixed once built by
/// [`TreeBuilder`](crate::domain::TreeBuilder). Only leaf values change
/// afterwards, through [`AttackTree::set_leaf_value`].
#[derive(Debug)]
pub struct AttackTree {
    title: String,
    arena: Arena<TreeNode>,
    root: Index,
    ids: HashMap<String, Index>,
}

impl AttackTree {
    pub(crate) fn with_root(title: String, data: NodeData) -> Self {
        let mut arena = Arena::new();
        let id = data.id.clone();
        let root = arena.insert(TreeNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        let mut ids = HashMap::new();
        ids.insert(id, root);
        Self {
            title,
            arena,
            root,
            ids,
        }
    }

    /// Attach a new node under `parent`. Id uniqueness is checked by the builder.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn insert_child(&mut self, parent: Index, data: NodeData) -> Index {
        let id = data.id.clone();
        let node_idx = self.arena.insert(TreeNode {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(node_idx);
        }
        self.ids.insert(id, node_idx);
        node_idx
    }

    /// Display title of the tree.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn root(&self) -> Index {
        self.root
    }

    /// Id of the root node.
    pub fn root_id(&self) -> &str {
        &self.arena[self.root].data.id
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    /// Look up a node's arena index by id.
    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.ids.get(id).copied()
    }

    /// Look up a node by id.
    pub fn get(&self, id: &str) -> Option<&NodeData> {
        self.index_of(id)
            .and_then(|idx| self.arena.get(idx))
            .map(|node| &node.data)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Direct children of `id`, in declaration order.
    pub fn successors(&self, id: &str) -> DomainResult<Vec<&NodeData>> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
        Ok(self.arena[idx]
            .children
            .iter()
            .filter_map(|&child| self.arena.get(child))
            .map(|node| &node.data)
            .collect())
    }

    /// Parent → child pairs of ids, in pre-order.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.iter()
            .flat_map(|(_, node)| {
                node.children.iter().filter_map(move |&child| {
                    self.arena
                        .get(child)
                        .map(|c| (node.data.id.as_str(), c.data.id.as_str()))
                })
            })
            .collect()
    }

    /// Pre-order traversal, children left to right (construction order).
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Post-order traversal: every child is yielded before its parent.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// All leaf nodes in construction order.
    pub fn list_leaves(&self) -> Vec<LeafEntry> {
        self.iter()
            .filter_map(|(_, node)| match node.data.kind {
                NodeKind::Leaf { value } => Some(LeafEntry {
                    id: node.data.id.clone(),
                    name: node.data.name.clone(),
                    value,
                }),
                NodeKind::Gate(_) => None,
            })
            .collect()
    }

    /// Overwrite a leaf's value in place.
    ///
    /// The tree is left untouched on any error.
    #[instrument(level = "debug", skip(self))]
    pub fn set_leaf_value(&mut self, id: &str, value: f64) -> DomainResult<()> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::InvalidValue {
                id: id.to_string(),
                value,
            });
        }
        let node = self
            .arena
            .get_mut(idx)
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
        match &mut node.data.kind {
            NodeKind::Leaf { value: current } => {
                debug!("Updated {} = {} (was {})", node.data.name, value, current);
                *current = value;
                Ok(())
            }
            NodeKind::Gate(_) => Err(DomainError::NotALeaf(id.to_string())),
        }
    }
}

pub struct TreeIterator<'a> {
    tree: &'a AttackTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a AttackTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a AttackTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a AttackTree) -> Self {
        Self {
            tree,
            stack: vec![(tree.root, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::GateKind;

    fn node(id: &str, kind: NodeKind) -> NodeData {
        NodeData {
            id: id.to_string(),
            name: format!("Node {}", id),
            kind,
        }
    }

    //      root (OR)
    //      /      \
    //   a (AND)   b=30
    //   /    \
    // a1=10  a2=20
    fn sample() -> AttackTree {
        let mut tree =
            AttackTree::with_root("Sample".into(), node("root", NodeKind::Gate(GateKind::Or)));
        let root = tree.root();
        let a = tree.insert_child(root, node("a", NodeKind::Gate(GateKind::And)));
        tree.insert_child(a, node("a1", NodeKind::Leaf { value: 10.0 }));
        tree.insert_child(a, node("a2", NodeKind::Leaf { value: 20.0 }));
        tree.insert_child(root, node("b", NodeKind::Leaf { value: 30.0 }));
        tree
    }

    fn ids<'a>(it: impl Iterator<Item = (Index, &'a TreeNode)>) -> Vec<String> {
        it.map(|(_, n)| n.data.id.clone()).collect()
    }

    #[test]
    fn test_preorder_follows_construction_order() {
        let tree = sample();
        assert_eq!(ids(tree.iter()), vec!["root", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_postorder_yields_children_first() {
        let tree = sample();
        assert_eq!(ids(tree.iter_postorder()), vec!["a1", "a2", "a", "b", "root"]);
    }

    #[test]
    fn test_depth_and_count() {
        let tree = sample();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.root_id(), "root");
    }

    #[test]
    fn test_successors_and_edges() {
        let tree = sample();
        let succ: Vec<_> = tree
            .successors("a")
            .unwrap()
            .iter()
            .map(|d| d.id.clone())
            .collect();
        assert_eq!(succ, vec!["a1", "a2"]);
        assert_eq!(
            tree.edges(),
            vec![("root", "a"), ("a", "a1"), ("a", "a2"), ("root", "b")]
        );
        assert!(matches!(tree.successors("zzz"), Err(DomainError::NodeNotFound(_))));
    }

    #[test]
    fn test_list_leaves_in_construction_order() {
        let tree = sample();
        let leaves = tree.list_leaves();
        let got: Vec<_> = leaves.iter().map(|l| (l.id.as_str(), l.value)).collect();
        assert_eq!(got, vec![("a1", 10.0), ("a2", 20.0), ("b", 30.0)]);
    }

    #[test]
    fn test_set_leaf_value_overwrites_only_value() {
        let mut tree = sample();
        tree.set_leaf_value("a1", 99.5).unwrap();
        let data = tree.get("a1").unwrap();
        assert_eq!(data.kind, NodeKind::Leaf { value: 99.5 });
        assert_eq!(data.name, "Node a1");
    }

    #[test]
    fn test_set_leaf_value_rejects_bad_input_without_mutation() {
        let mut tree = sample();
        assert!(matches!(
            tree.set_leaf_value("missing", 1.0),
            Err(DomainError::NodeNotFound(_))
        ));
        assert!(matches!(
            tree.set_leaf_value("a1", -1.0),
            Err(DomainError::InvalidValue { .. })
        ));
        assert!(matches!(
            tree.set_leaf_value("a1", f64::NAN),
            Err(DomainError::InvalidValue { .. })
        ));
        assert!(matches!(
            tree.set_leaf_value("a1", f64::INFINITY),
            Err(DomainError::InvalidValue { .. })
        ));
        assert!(matches!(
            tree.set_leaf_value("a", 5.0),
            Err(DomainError::NotALeaf(_))
        ));
        assert_eq!(tree.get("a1").unwrap().kind.value(), Some(10.0));
    }
}
