//! Tests for TreeLoader

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use attack_tree::application::services::TreeLoader;
use attack_tree::application::ApplicationError;
use attack_tree::domain::DomainError;
use attack_tree::infrastructure::traits::{FileSystem, RealFileSystem};

/// In-memory filesystem keyed by path
#[derive(Default)]
struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    fn with_file(path: &str, content: &str) -> Self {
        let fs = Self::default();
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), content.to_string());
        fs
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "not found"))
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn ensure_parent(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

const SIMPLE: &str = r#"{
  "name": "Simple",
  "root": {
    "id": "root", "name": "Root", "type": "AND",
    "children": [
      {"id": "a", "name": "A", "type": "leaf", "value": 100},
      {"id": "b", "name": "B", "type": "leaf", "value": 200}
    ]
  }
}"#;

#[test]
fn given_json_file_when_loading_then_builds_tree() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("simple.json");
    std::fs::write(&path, SIMPLE).unwrap();
    let loader = TreeLoader::new(Arc::new(RealFileSystem));

    // Act
    let tree = loader.load(&path).unwrap();

    // Assert
    assert_eq!(tree.title(), "Simple");
    assert_eq!(tree.overall_risk(), 300.0);
}

#[test]
fn given_memory_filesystem_when_loading_then_reads_through_trait() {
    let loader = TreeLoader::new(Arc::new(MemoryFileSystem::with_file("/t.json", SIMPLE)));

    let tree = loader.load(Path::new("/t.json")).unwrap();

    assert_eq!(tree.node_count(), 3);
}

#[test]
fn given_same_file_when_loading_twice_then_trees_are_independent() {
    let loader = TreeLoader::new(Arc::new(MemoryFileSystem::with_file("/t.json", SIMPLE)));
    let mut first = loader.load(Path::new("/t.json")).unwrap();
    let second = loader.load(Path::new("/t.json")).unwrap();

    first.set_leaf_value("a", 0.0).unwrap();

    assert_eq!(first.overall_risk(), 200.0);
    assert_eq!(second.overall_risk(), 300.0);
}

#[test]
fn given_missing_file_when_loading_then_file_not_found() {
    let loader = TreeLoader::new(Arc::new(MemoryFileSystem::default()));

    let err = loader.load(Path::new("/missing.json")).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::FileNotFound(p) if p == Path::new("/missing.json")
    ));
}

#[test]
fn given_invalid_json_when_loading_then_parse_error() {
    let loader = TreeLoader::new(Arc::new(MemoryFileSystem::with_file("/bad.json", "{ nope")));

    let err = loader.load(Path::new("/bad.json")).unwrap_err();

    assert!(matches!(err, ApplicationError::Parse { .. }));
}

#[test]
fn given_structurally_invalid_tree_when_loading_then_domain_error() {
    let loader = TreeLoader::new(Arc::new(MemoryFileSystem::with_file(
        "/t.json",
        r#"{"root": {"id": "r", "type": "OR"}}"#,
    )));

    let err = loader.load(Path::new("/t.json")).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::MalformedTree { .. })
    ));
}
