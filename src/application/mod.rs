//! Application layer: services and use cases
//!
//! This layer orchestrates domain queries over a loaded dataset.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
