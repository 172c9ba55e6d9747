//! Command dispatch: thin I/O shell around the attack tree engine

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::{compare, Comparison, Direction, ScenarioPaths};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{self, Settings};
use crate::domain::{breakdown, AttackTree, Breakdown, Relation, TreeDisplay};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::util::money::format_money;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let command = cli
        .command
        .as_ref()
        .ok_or_else(|| CliError::Usage("no command given, see --help".into()))?;

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Analyze {
            file,
            no_input,
            set,
            json,
        } => cmd_analyze(&container, file, *no_input, set, *json),
        Commands::Tree { file, set } => cmd_tree(&container, file, set),
        Commands::Leaves { file } => cmd_leaves(&container, file),
        Commands::Export { file, set } => cmd_export(&container, file, set),
        Commands::Compare {
            scenario,
            current,
            digitalised,
            no_input,
        } => cmd_compare(
            &container,
            scenario.as_deref(),
            current.as_deref(),
            digitalised.as_deref(),
            *no_input,
        ),
        Commands::Scenarios => cmd_scenarios(&container),
        Commands::Config { command } => cmd_config(&container, cli.config.as_deref(), command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn load_tree(
    container: &ServiceContainer,
    file: &Path,
    overrides: &[(String, f64)],
) -> CliResult<AttackTree> {
    let mut tree = container.loader().load(file)?;
    container.assessment().apply_overrides(&mut tree, overrides)?;
    Ok(tree)
}

fn prompt_values(container: &ServiceContainer, tree: &mut AttackTree) -> CliResult<()> {
    output::header("RISK VALUE INPUT");
    let stdin = io::stdin();
    let stdout = io::stdout();
    let updated = container
        .assessment()
        .prompt_values(tree, stdin.lock(), stdout.lock())?;
    output::success(&format!("{} values updated", updated));
    Ok(())
}

fn to_json<T: Serialize>(value: &T, what: &str) -> CliResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        ApplicationError::OperationFailed {
            context: format!("serialize {}", what),
            source: Box::new(e),
        }
        .into()
    })
}

fn warn_anomalies(tree: &AttackTree) {
    for anomaly in tree.anomalies() {
        output::warning(&anomaly);
    }
}

#[instrument(skip(container, set))]
fn cmd_analyze(
    container: &ServiceContainer,
    file: &Path,
    no_input: bool,
    set: &[(String, f64)],
    json: bool,
) -> CliResult<()> {
    // JSON mode never prompts, stdout carries only the document
    if json {
        output::info(&breakdown_json(container, file, set)?);
        return Ok(());
    }

    let mut tree = load_tree(container, file, set)?;
    output::success(&format!("Loaded attack tree: {}", tree.title()));
    output::success_detail(&format!("Built graph with {} nodes", tree.node_count()));

    if container.settings.interactive && !no_input {
        prompt_values(container, &mut tree)?;
    }

    print_breakdown(&breakdown(&tree), &container.settings.currency);
    Ok(())
}

/// Breakdown of `file` with `set` applied, as pretty JSON.
fn breakdown_json(
    container: &ServiceContainer,
    file: &Path,
    set: &[(String, f64)],
) -> CliResult<String> {
    let tree = load_tree(container, file, set)?;
    to_json(&breakdown(&tree), "breakdown")
}

fn print_breakdown(report: &Breakdown, currency: &str) {
    let money = |v: f64| format_money(v, currency);

    output::header("DETAILED RISK BREAKDOWN");
    for leaf in report.per_leaf.iter().filter(|l| l.value > 0.0) {
        output::detail(&format!("{}: {}", leaf.name, money(leaf.value)));
    }
    output::action("Sum of individual attacks", &money(report.sum_of_leaves));
    output::action("Calculated overall risk", &money(report.gated_risk));
    if report.relation != Relation::Equal {
        output::detail(&format!("({})", report.relation.explanation()));
    }
    for anomaly in &report.anomalies {
        output::warning(anomaly);
    }

    output::header(&format!(
        "Total Business Risk Exposure: {}",
        money(report.gated_risk)
    ));
}

#[instrument(skip(container, set))]
fn cmd_tree(container: &ServiceContainer, file: &Path, set: &[(String, f64)]) -> CliResult<()> {
    let tree = load_tree(container, file, set)?;
    let currency = container.settings.currency.clone();

    output::header(tree.title());
    output::info(&tree.to_tree_string(&|v| format_money(v, &currency)));
    warn_anomalies(&tree);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_leaves(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let tree = load_tree(container, file, &[])?;
    for leaf in tree.list_leaves() {
        output::info(&format!(
            "{}\t{}\t{}",
            leaf.id,
            leaf.name,
            format_money(leaf.value, &container.settings.currency)
        ));
    }
    Ok(())
}

#[instrument(skip(container, set))]
fn cmd_export(container: &ServiceContainer, file: &Path, set: &[(String, f64)]) -> CliResult<()> {
    let tree = load_tree(container, file, set)?;
    warn_anomalies(&tree);
    output::info(&to_json(&tree.view(), "tree view")?);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_compare(
    container: &ServiceContainer,
    scenario: Option<&str>,
    current: Option<&Path>,
    digitalised: Option<&Path>,
    no_input: bool,
) -> CliResult<()> {
    let service = container.comparison();
    let paths = match (scenario, current, digitalised) {
        (Some(name), _, _) => service.resolve(name)?,
        (None, Some(current), Some(digitalised)) => ScenarioPaths {
            label: "Scenario".to_string(),
            current: current.to_path_buf(),
            digitalised: digitalised.to_path_buf(),
            recommendation: None,
        },
        _ => {
            return Err(CliError::InvalidArgs(
                "give --scenario NAME or both CURRENT and DIGITALISED files".into(),
            ))
        }
    };
    debug!("cmd_compare: {:?}", paths);

    let (mut current, mut digitalised) = service.load_pair(&paths.current, &paths.digitalised)?;
    let interactive = container.settings.interactive && !no_input;
    let currency = &container.settings.currency;

    for (stage, tree) in [("CURRENT", &mut current), ("DIGITALISED", &mut digitalised)] {
        output::header(&format!(
            ">>> ANALYSING: {} ({}) <<<",
            paths.label.to_uppercase(),
            stage
        ));
        if interactive {
            prompt_values(container, tree)?;
        }
        warn_anomalies(tree);
        output::action("Overall risk", &format_money(tree.overall_risk(), currency));
    }

    let result = compare(&current, &digitalised);
    print_comparison(&paths, &result, currency);
    Ok(())
}

fn print_comparison(paths: &ScenarioPaths, result: &Comparison, currency: &str) {
    let money = |v: f64| format_money(v, currency);

    output::header(&format!(
        "{} RISK COMPARISON SUMMARY",
        paths.label.to_uppercase()
    ));
    output::action("Current risk", &money(result.current_risk));
    output::action("Digitalised risk", &money(result.digitalised_risk));
    output::action("Risk change", &money(result.difference));

    match result.direction {
        Direction::Increases => output::failure(&format!(
            "Digitalisation INCREASES risk by {}",
            money(result.difference)
        )),
        Direction::Reduces => output::success_detail(&format!(
            "Digitalisation REDUCES risk by {}",
            money(result.difference.abs())
        )),
        Direction::Unchanged => output::detail("Risk remains the same"),
    }

    if let Some(recommendation) = &paths.recommendation {
        output::action("Recommendation", recommendation);
    }
}

fn cmd_scenarios(container: &ServiceContainer) -> CliResult<()> {
    let settings = &container.settings;
    if settings.scenarios.is_empty() {
        output::info("No scenarios configured");
        return Ok(());
    }
    for (name, scenario) in &settings.scenarios {
        output::action(name, &scenario.label);
        output::detail(&format!(
            "current:     {}",
            settings.resolve_path(&scenario.current).display()
        ));
        output::detail(&format!(
            "digitalised: {}",
            settings.resolve_path(&scenario.digitalised).display()
        ));
    }
    Ok(())
}

fn cmd_config(
    container: &ServiceContainer,
    config_file: Option<&Path>,
    command: &ConfigCommands,
) -> CliResult<()> {
    let local = config_file
        .map(Path::to_path_buf)
        .unwrap_or_else(config::local_config_path);

    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match config::global_config_path() {
                Some(global) => output::action("Global", &describe_path(container, &global)),
                None => output::action("Global", "(no config directory)"),
            }
            output::action("Local", &describe_path(container, &local));
        }
        ConfigCommands::Init { global, force } => {
            let target = if *global {
                config::global_config_path().ok_or_else(|| ApplicationError::Config {
                    message: "cannot determine global config directory".into(),
                })?
            } else {
                local
            };
            if container.fs.exists(&target) && !force {
                return Err(CliError::Usage(format!(
                    "config file already exists: {} (use --force to overwrite)",
                    target.display()
                )));
            }
            container
                .fs
                .ensure_parent(&target)
                .map_err(|e| InfraError::io(format!("create {}", target.display()), e))?;
            container
                .fs
                .write(&target, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", target.display()), e))?;
            output::success(&format!("Created config: {}", target.display()));
        }
    }
    Ok(())
}

fn describe_path(container: &ServiceContainer, path: &Path) -> String {
    if container.fs.exists(path) {
        format!("{} (exists)", path.display())
    } else {
        format!("{} (not found)", path.display())
    }
}
