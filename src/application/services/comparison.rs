//! Scenario comparison service
//!
//! Compares the risk of two independently owned trees, typically the
//! current business against its digitalised version.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::application::services::TreeLoader;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::{ScenarioConfig, Settings};
use crate::domain::AttackTree;

/// Whether digitalisation moves the overall risk up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Increases,
    Reduces,
    Unchanged,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Increases => write!(f, "increases"),
            Direction::Reduces => write!(f, "reduces"),
            Direction::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Overall risks of both scenarios and their difference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub current_risk: f64,
    pub digitalised_risk: f64,
    /// `digitalised_risk - current_risk`
    pub difference: f64,
    pub direction: Direction,
}

/// Compare two trees by their overall risk.
pub fn compare(current: &AttackTree, digitalised: &AttackTree) -> Comparison {
    let current_risk = current.overall_risk();
    let digitalised_risk = digitalised.overall_risk();
    let difference = digitalised_risk - current_risk;
    let direction = if difference > 0.0 {
        Direction::Increases
    } else if difference < 0.0 {
        Direction::Reduces
    } else {
        Direction::Unchanged
    };

    Comparison {
        current_risk,
        digitalised_risk,
        difference,
        direction,
    }
}

/// Resolved file locations of a scenario pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPaths {
    pub label: String,
    pub current: PathBuf,
    pub digitalised: PathBuf,
    pub recommendation: Option<String>,
}

/// Service for loading and comparing scenario pairs.
pub struct ComparisonService {
    loader: TreeLoader,
    settings: Arc<Settings>,
}

impl ComparisonService {
    pub fn new(loader: TreeLoader, settings: Arc<Settings>) -> Self {
        Self { loader, settings }
    }

    /// Look up a configured scenario and resolve its paths against `data_dir`.
    pub fn resolve(&self, name: &str) -> ApplicationResult<ScenarioPaths> {
        let scenario: &ScenarioConfig = self
            .settings
            .scenarios
            .get(name)
            .ok_or_else(|| ApplicationError::UnknownScenario(name.to_string()))?;
        Ok(ScenarioPaths {
            label: scenario.label.clone(),
            current: self.settings.resolve_path(&scenario.current),
            digitalised: self.settings.resolve_path(&scenario.digitalised),
            recommendation: scenario.recommendation.clone(),
        })
    }

    /// Load both trees. Each is built independently; nothing is shared.
    #[instrument(level = "debug", skip(self))]
    pub fn load_pair(
        &self,
        current: &Path,
        digitalised: &Path,
    ) -> ApplicationResult<(AttackTree, AttackTree)> {
        let current = self.loader.load(current)?;
        let digitalised = self.loader.load(digitalised)?;
        info!(
            "Loaded scenario pair '{}' / '{}'",
            current.title(),
            digitalised.title()
        );
        Ok((current, digitalised))
    }
}
