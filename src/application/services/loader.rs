//! Tree loading service
//!
//! Reads JSON tree descriptions and hands them to the domain builder.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{self, AttackTree, TreeDescription};
use crate::infrastructure::traits::FileSystem;

/// Service for loading attack trees from JSON files.
pub struct TreeLoader {
    fs: Arc<dyn FileSystem>,
}

impl TreeLoader {
    /// Create a new loader.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read and decode a description without building it.
    #[instrument(level = "debug", skip(self))]
    pub fn load_description(&self, path: &Path) -> ApplicationResult<TreeDescription> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::FileNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read attack tree", path)?;
        debug!("load_description: read {} bytes", content.len());

        serde_json::from_str(&content).map_err(|e| ApplicationError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load a file and build its tree.
    ///
    /// Every call returns a new, independently owned tree.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<AttackTree> {
        let description = self.load_description(path)?;
        let tree = domain::build(&description)?;
        info!(
            "Loaded attack tree '{}' from {} ({} nodes)",
            tree.title(),
            path.display(),
            tree.node_count()
        );
        Ok(tree)
    }
}
