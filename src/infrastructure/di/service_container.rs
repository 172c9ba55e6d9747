//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{AssessmentService, ComparisonService, TreeLoader};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding settings, I/O boundaries and the services built on them.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
        }
    }

    pub fn loader(&self) -> TreeLoader {
        TreeLoader::new(Arc::clone(&self.fs))
    }

    pub fn assessment(&self) -> AssessmentService {
        AssessmentService::new(self.settings.currency.clone())
    }

    pub fn comparison(&self) -> ComparisonService {
        ComparisonService::new(self.loader(), Arc::clone(&self.settings))
    }
}
