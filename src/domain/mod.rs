//! Domain layer: entities and the dataset they live in
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod dataset;
pub mod entities;
pub mod error;
pub mod views;

pub use dataset::{Dataset, DuplicateId};
pub use entities::*;
pub use error::DomainError;
pub use views::{ClassView, DepartmentView, SearchHit, StudentView};
