//! Layered YAML configuration library
//!
//! Merges an optional user source into a schema-defining default source,
//! rejects unknown keys and shape changes, and resolves path-like values to
//! absolute paths. See [`config::ConfigStore`] for the entry point.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod tree;

pub use config::{ConfigSources, ConfigStore, LoadedConfig, ResolvedPaths};
pub use error::{ConfigError, ConfigIssue, Result};
pub use tree::{ConfigTree, TreeKind};
