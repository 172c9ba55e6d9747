//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/attack-tree/attack-tree.toml`
//! 3. Local config: `./.attack-tree.toml` (or the file given with `--config`)
//! 4. Environment variables: `ATTACK_TREE_*` prefix

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

/// Name of the local config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".attack-tree.toml";

/// A pair of trees describing one system before and after digitalisation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// Display label, e.g. "Payment System"
    pub label: String,
    /// Tree of the current business (relative paths resolve against `data_dir`)
    pub current: PathBuf,
    /// Tree after digitalisation
    pub digitalised: PathBuf,
    /// Advice printed after the comparison
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Unified configuration for attack-tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Currency symbol used in prompts and reports (default: "£")
    pub currency: String,
    /// Base directory for scenario tree files
    pub data_dir: PathBuf,
    /// Prompt for leaf values before reporting (default: true)
    pub interactive: bool,
    /// Named scenario pairs for `compare --scenario`
    pub scenarios: BTreeMap<String, ScenarioConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "£".into(),
            data_dir: PathBuf::from("data/attack_trees"),
            interactive: true,
            scenarios: default_scenarios(),
        }
    }
}

fn default_scenarios() -> BTreeMap<String, ScenarioConfig> {
    let mut scenarios = BTreeMap::new();
    scenarios.insert(
        "payment".to_string(),
        ScenarioConfig {
            label: "Payment System".into(),
            current: PathBuf::from("payment_system_current.json"),
            digitalised: PathBuf::from("payment_system_digitalised.json"),
            recommendation: Some(
                "Proceed with digitalisation but implement security controls".into(),
            ),
        },
    );
    scenarios.insert(
        "supply-chain".to_string(),
        ScenarioConfig {
            label: "Supply Chain".into(),
            current: PathBuf::from("supply_chain_current.json"),
            digitalised: PathBuf::from("supply_chain_digitalised.json"),
            recommendation: Some(
                "Maintain local suppliers - reject international cost savings".into(),
            ),
        },
    );
    scenarios
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub currency: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub interactive: Option<bool>,
    pub scenarios: Option<BTreeMap<String, ScenarioConfig>>,
}

/// Get the XDG config directory for attack-tree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "attack-tree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("attack-tree.toml"))
}

/// Get the path to the local config file in the working directory.
pub fn local_config_path() -> PathBuf {
    PathBuf::from(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Resolve a scenario file path: absolute paths stay, relative ones join `data_dir`.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);
    }

    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Scenarios: overlay entries are added, same-named entries replaced
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut scenarios = self.scenarios.clone();
        if let Some(extra) = &overlay.scenarios {
            for (name, scenario) in extra {
                scenarios.insert(name.clone(), scenario.clone());
            }
        }
        Self {
            currency: overlay
                .currency
                .clone()
                .unwrap_or_else(|| self.currency.clone()),
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            interactive: overlay.interactive.unwrap_or(self.interactive),
            scenarios,
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit local config; must exist when given.
    ///   Without it, `./.attack-tree.toml` is used if present.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let local = match config_file {
            Some(path) if !path.exists() => {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                })
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(local_config_path()).filter(|p| p.exists()),
        };
        Self::load_layers(global_config_path().as_deref(), local.as_deref())
    }

    /// Load from explicit global and local files (each optional, skipped if missing).
    pub fn load_layers(
        global: Option<&Path>,
        local: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global.filter(|p| p.exists()) {
            debug!("Loading global config {}", global_path.display());
            current = current.merge_with(&load_raw_settings(global_path)?);
        }

        // 3. Local config
        if let Some(local_path) = local.filter(|p| p.exists()) {
            debug!("Loading local config {}", local_path.display());
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply ATTACK_TREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ATTACK_TREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("currency") {
            settings.currency = val;
        }
        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_bool("interactive") {
            settings.interactive = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# attack-tree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/attack-tree/attack-tree.toml
#   Local:  ./.attack-tree.toml (or --config FILE)
#   Env:    ATTACK_TREE_* environment variables (CURRENCY, DATA_DIR, INTERACTIVE)

# Currency symbol for prompts and reports
# currency = "£"

# Directory holding scenario tree files
# data_dir = "data/attack_trees"

# Prompt for leaf values before reporting
# interactive = true

# Scenario pairs for `attack-tree compare --scenario <name>`.
# Entries replace built-in scenarios of the same name.
# [scenarios.payment]
# label = "Payment System"
# current = "payment_system_current.json"
# digitalised = "payment_system_digitalised.json"
# recommendation = "Proceed with digitalisation but implement security controls"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
