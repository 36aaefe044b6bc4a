//! Application services
//!
//! Concrete service implementations over a loaded `Dataset`.
//! Services are concrete structs, not traits.

mod loader;
mod school;
mod stats;

pub use loader::DatasetLoader;
pub use school::{SchoolService, SearchOptions};
pub use stats::{Stats, StudentStats};
