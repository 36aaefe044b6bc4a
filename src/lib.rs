//! roster: read-only viewer over a College → Department → Class → Student hierarchy
//!
//! Layers, innermost first:
//! - `domain`: entities, the dataset tree and flattened views
//! - `application`: dataset loading, queries, search and aggregates
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: argument parsing, dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
