//! Tests for ComparisonService scenario resolution and loading

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use attack_tree::application::services::{compare, Direction};
use attack_tree::application::ApplicationError;
use attack_tree::config::{ScenarioConfig, Settings};
use attack_tree::infrastructure::di::ServiceContainer;

fn write_tree(dir: &Path, name: &str, leaf_value: f64) -> PathBuf {
    let path = dir.join(name);
    let json = format!(
        r#"{{"name": "{name}", "root": {{"id": "root", "name": "Root", "type": "OR",
            "children": [{{"id": "a", "name": "A", "type": "leaf", "value": {leaf_value}}}]}}}}"#
    );
    std::fs::write(&path, json).unwrap();
    path
}

fn settings_for(dir: &Path) -> Settings {
    let mut scenarios = BTreeMap::new();
    scenarios.insert(
        "shop".to_string(),
        ScenarioConfig {
            label: "Shop".into(),
            current: PathBuf::from("now.json"),
            digitalised: PathBuf::from("next.json"),
            recommendation: Some("Go ahead".into()),
        },
    );
    Settings {
        data_dir: dir.to_path_buf(),
        interactive: false,
        scenarios,
        ..Settings::default()
    }
}

#[test]
fn given_configured_scenario_when_resolving_then_joins_data_dir() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let container = ServiceContainer::new(settings_for(temp.path()));

    // Act
    let paths = container.comparison().resolve("shop").unwrap();

    // Assert
    assert_eq!(paths.label, "Shop");
    assert_eq!(paths.current, temp.path().join("now.json"));
    assert_eq!(paths.digitalised, temp.path().join("next.json"));
    assert_eq!(paths.recommendation.as_deref(), Some("Go ahead"));
}

#[test]
fn given_unknown_scenario_when_resolving_then_error() {
    let temp = TempDir::new().unwrap();
    let container = ServiceContainer::new(settings_for(temp.path()));

    let err = container.comparison().resolve("bakery").unwrap_err();

    assert!(matches!(err, ApplicationError::UnknownScenario(name) if name == "bakery"));
}

#[test]
fn given_scenario_files_when_comparing_then_reports_increase() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), "now.json", 1000.0);
    write_tree(temp.path(), "next.json", 2500.0);
    let container = ServiceContainer::new(settings_for(temp.path()));
    let service = container.comparison();
    let paths = service.resolve("shop").unwrap();

    let (current, digitalised) = service.load_pair(&paths.current, &paths.digitalised).unwrap();
    let result = compare(&current, &digitalised);

    assert_eq!(result.current_risk, 1000.0);
    assert_eq!(result.digitalised_risk, 2500.0);
    assert_eq!(result.difference, 1500.0);
    assert_eq!(result.direction, Direction::Increases);
}

#[test]
fn given_missing_digitalised_file_when_loading_pair_then_file_not_found() {
    let temp = TempDir::new().unwrap();
    let current = write_tree(temp.path(), "now.json", 10.0);
    let container = ServiceContainer::new(settings_for(temp.path()));

    let err = container
        .comparison()
        .load_pair(&current, &temp.path().join("next.json"))
        .unwrap_err();

    assert!(matches!(err, ApplicationError::FileNotFound(_)));
}
