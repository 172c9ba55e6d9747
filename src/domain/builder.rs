//! Tree builder: validates a raw description and converts it into an [`AttackTree`].

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, info, instrument, warn};

use crate::domain::arena::AttackTree;
use crate::domain::entities::{GateKind, NodeData, NodeKind, RawNode, TreeDescription};
use crate::domain::error::{DomainError, DomainResult};

/// Build a tree from a description with a fresh builder.
pub fn build(description: &TreeDescription) -> DomainResult<AttackTree> {
    TreeBuilder::new().build(description)
}

/// Constructs attack trees from nested descriptions.
///
/// Nodes are visited depth-first in declaration order, so child order in
/// the resulting tree matches the source.
pub struct TreeBuilder {
    /// id -> location of first declaration
    seen: HashMap<String, String>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            seen: HashMap::new(),
        }
    }

    /// Build a tree. Nothing is returned on error, no partial tree escapes.
    #[instrument(level = "debug", skip_all)]
    pub fn build(&mut self, description: &TreeDescription) -> DomainResult<AttackTree> {
        // Reset state for a fresh build
        self.seen.clear();

        let raw_root = description
            .root
            .as_ref()
            .ok_or_else(|| DomainError::malformed("description", "missing 'root'"))?;

        let root_data = self.validate(raw_root, "root")?;
        let title = match &description.name {
            Some(name) => name.clone(),
            None => {
                debug!("No tree name given, using root name '{}'", root_data.name);
                root_data.name.clone()
            }
        };

        let mut tree = AttackTree::with_root(title, root_data);
        let root = tree.root();
        self.attach_children(&mut tree, root, raw_root, "root")?;

        info!(
            "Built attack tree '{}' with {} nodes (depth {})",
            tree.title(),
            tree.node_count(),
            tree.depth()
        );
        Ok(tree)
    }

    fn attach_children(
        &mut self,
        tree: &mut AttackTree,
        parent: Index,
        raw: &RawNode,
        location: &str,
    ) -> DomainResult<()> {
        for (i, child) in raw.children.iter().flatten().enumerate() {
            let child_location = format!("{}.children[{}]", location, i);
            let data = self.validate(child, &child_location)?;
            let child_idx = tree.insert_child(parent, data);
            self.attach_children(tree, child_idx, child, &child_location)?;
        }
        Ok(())
    }

    fn validate(&mut self, raw: &RawNode, location: &str) -> DomainResult<NodeData> {
        let id = required(&raw.id, location, "id")?;
        let name = required(&raw.name, location, "name")?;
        let kind_str = required(&raw.kind, location, "type")?;

        let kind = NodeKind::parse(kind_str, raw.value.unwrap_or(0.0));
        match &kind {
            NodeKind::Leaf { value } => {
                if !value.is_finite() || *value < 0.0 {
                    return Err(DomainError::malformed(
                        location,
                        format!("leaf value must be a finite number >= 0, got {}", value),
                    ));
                }
                if raw.children.as_ref().is_some_and(|c| !c.is_empty()) {
                    return Err(DomainError::malformed(location, "leaf node has children"));
                }
            }
            NodeKind::Gate(gate) => {
                if let Some(value) = raw.value {
                    debug!("Ignoring value {} on gate '{}'", value, id);
                }
                if let GateKind::Unrecognized(raw_kind) = gate {
                    warn!(
                        "Node '{}' has unrecognized kind '{}', it will be evaluated as OR",
                        id, raw_kind
                    );
                }
            }
        }

        if let Some(first) = self.seen.get(id) {
            return Err(DomainError::DuplicateId {
                id: id.to_string(),
                first: first.clone(),
                second: location.to_string(),
            });
        }
        self.seen.insert(id.to_string(), location.to_string());

        debug!("Validated node '{}' ({}) at {}", id, kind, location);
        Ok(NodeData {
            id: id.to_string(),
            name: name.to_string(),
            kind,
        })
    }
}

fn required<'a>(field: &'a Option<String>, location: &str, name: &str) -> DomainResult<&'a str> {
    match field.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(DomainError::malformed(
            location,
            format!("field '{}' is empty", name),
        )),
        None => Err(DomainError::malformed(
            location,
            format!("missing field '{}'", name),
        )),
    }
}
