//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::application::services::parse_assignment;

/// Attack tree risk assessment: gate-combined risk exposure, breakdowns and scenario comparison
#[derive(Parser, Debug)]
#[command(name = "attack-tree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: ./.attack-tree.toml if present)
    #[arg(
        short,
        long,
        global = true,
        env = "ATTACK_TREE_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enter leaf values and show the risk breakdown
    Analyze {
        /// Attack tree JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Do not prompt for leaf values
        #[arg(long)]
        no_input: bool,
        /// Set a leaf value before reporting (repeatable)
        #[arg(long = "set", value_name = "ID=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, f64)>,
        /// Print the breakdown as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the tree with evaluated risks
    Tree {
        /// Attack tree JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Set a leaf value before rendering (repeatable)
        #[arg(long = "set", value_name = "ID=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, f64)>,
    },

    /// List leaf nodes and their values
    Leaves {
        /// Attack tree JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Export nodes, risks and edges as JSON
    Export {
        /// Attack tree JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Set a leaf value before exporting (repeatable)
        #[arg(long = "set", value_name = "ID=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, f64)>,
    },

    /// Compare current vs digitalised risk
    Compare {
        /// Configured scenario name (see `scenarios`)
        #[arg(short, long, conflicts_with_all = ["current", "digitalised"])]
        scenario: Option<String>,
        /// Tree of the current business
        #[arg(value_hint = ValueHint::FilePath, requires = "digitalised")]
        current: Option<PathBuf>,
        /// Tree after digitalisation
        #[arg(value_hint = ValueHint::FilePath)]
        digitalised: Option<PathBuf>,
        /// Do not prompt for leaf values
        #[arg(long)]
        no_input: bool,
    },

    /// List configured scenarios
    Scenarios,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
