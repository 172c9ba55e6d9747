//! Breakdown of a tree's risk: naive sum of leaf impacts vs gate-combined risk.

use std::fmt;

use serde::Serialize;

use crate::domain::arena::AttackTree;
use crate::domain::entities::{Anomaly, LeafEntry};

/// Relative tolerance when comparing gated risk to the sum of leaves.
///
/// Scaled by the larger magnitude with a floor of 1.0, so below 1.0 it acts
/// as an absolute tolerance: any gap up to 1e-9 counts as `Equal`
/// (gated 0.0 vs sum 1e-10 is `Equal`, not `LowerDueToOr`).
const RELATIVE_TOLERANCE: f64 = 1e-9;

/// How the gate-combined risk relates to the naive sum of all leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relation {
    LowerDueToOr,
    HigherDueToAnd,
    Equal,
}

impl Relation {
    /// Compare `gated` against `sum`.
    pub fn between(gated: f64, sum: f64) -> Self {
        let scale = gated.abs().max(sum.abs()).max(1.0);
        if (gated - sum).abs() <= RELATIVE_TOLERANCE * scale {
            Relation::Equal
        } else if gated < sum {
            Relation::LowerDueToOr
        } else {
            Relation::HigherDueToAnd
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::LowerDueToOr => "lower-due-to-or",
            Relation::HigherDueToAnd => "higher-due-to-and",
            Relation::Equal => "equal",
        }
    }

    /// One-line explanation for presenters.
    pub fn explanation(&self) -> &'static str {
        match self {
            Relation::LowerDueToOr => {
                "Lower overall risk due to OR-gate logic - not all attacks likely"
            }
            Relation::HigherDueToAnd => "Higher overall risk due to AND-gate combinations",
            Relation::Equal => "Overall risk equals the sum of individual attacks",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary contrasting the naive sum of leaf impacts with the gated root risk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub title: String,
    /// Every leaf in construction order (names may repeat)
    pub per_leaf: Vec<LeafEntry>,
    pub sum_of_leaves: f64,
    pub gated_risk: f64,
    pub relation: Relation,
    pub anomalies: Vec<Anomaly>,
}

/// Produce the breakdown for `tree`. Pure, the tree is not modified.
pub fn breakdown(tree: &AttackTree) -> Breakdown {
    let per_leaf = tree.list_leaves();
    let sum_of_leaves = per_leaf.iter().map(|l| l.value).sum();
    let gated_risk = tree.overall_risk();

    Breakdown {
        title: tree.title().to_string(),
        per_leaf,
        sum_of_leaves,
        gated_risk,
        relation: Relation::between(gated_risk, sum_of_leaves),
        anomalies: tree.anomalies(),
    }
}
