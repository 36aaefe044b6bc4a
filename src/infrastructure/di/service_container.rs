//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{DatasetLoader, SchoolService};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraResult;

/// Container holding all application services.
///
/// The dataset is loaded once, when the container is built, and shared by every
/// service for the life of the process.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Queries over the loaded dataset
    pub school: SchoolService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> InfraResult<Self> {
        let settings = Arc::new(settings);
        let dataset = DatasetLoader::new(fs.clone()).load(settings.dataset.as_deref())?;
        debug!(
            "ServiceContainer: dataset loaded ({} colleges)",
            dataset.colleges.len()
        );
        let school = SchoolService::new(Arc::new(dataset));

        Ok(Self {
            settings,
            fs,
            school,
        })
    }
}
