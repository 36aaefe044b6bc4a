//! Dataset loading
//!
//! The dataset comes either from the embedded mock literal or from a JSON file
//! of the same shape. It is loaded once per process.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Dataset;
use crate::infrastructure::traits::FileSystem;

/// Loads a `Dataset` from its configured source.
pub struct DatasetLoader {
    fs: Arc<dyn FileSystem>,
}

impl DatasetLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load from `path`, or the built-in mock data when no path is given.
    pub fn load(&self, path: Option<&Path>) -> ApplicationResult<Dataset> {
        let Some(path) = path else {
            debug!("load: using built-in mock dataset");
            return Ok(Dataset::mock()?);
        };

        debug!("load: path={}", path.display());
        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("dataset not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "dataset file does not exist",
                )),
            });
        }

        let content =
            self.fs
                .read_to_string(path)
                .map_err(|e| ApplicationError::OperationFailed {
                    context: format!("read dataset {}", path.display()),
                    source: Box::new(e),
                })?;

        let dataset = Dataset::from_json(&content)?;
        debug!("load: {} colleges", dataset.colleges.len());
        Ok(dataset)
    }

    /// Write the built-in mock dataset to `path` as a starting point for a custom one.
    pub fn export_mock(&self, path: &Path) -> ApplicationResult<()> {
        debug!("export_mock: path={}", path.display());
        self.fs
            .ensure_parent(path)
            .and_then(|_| self.fs.write(path, Dataset::mock_source()))
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("write dataset {}", path.display()),
                source: Box::new(e),
            })
    }
}
