//! Layered configuration loading.
//!
//! Two YAML sources feed one configuration:
//! 1. **Defaults** - the required source; its shape is the schema
//! 2. **User** - an optional override source that may only set keys the
//!    defaults already define
//!
//! ## Pipeline
//! - Load both sources (a missing user source counts as empty)
//! - Merge user into defaults, collecting every structural issue
//! - Resolve `general.working_dir` / `general.resources_dir` to absolute paths
//! - Rewrite `*path*`, `*location*` and `resources.*` values to absolute paths
//!
//! ## Environment Variables
//! - `LAYERED_CONFIG_DEFAULT_PATH` - Default source (default: `configs/config-default.yaml`)
//! - `LAYERED_CONFIG_USER_PATH` - User source (default: `configs/config.yaml`)

mod loader;
mod merge;
mod resolve;
mod store;

pub use loader::{load_optional_tree, load_tree};
pub use merge::merge;
pub use resolve::{
    GENERAL_SECTION, RESOURCES_DIR_KEY, ResolvedPaths, WORKING_DIR_KEY, resolve_paths,
};
pub use store::{
    ConfigSources, ConfigStore, DEFAULT_SOURCE, DEFAULT_SOURCE_ENV, LoadedConfig, USER_SOURCE,
    USER_SOURCE_ENV,
};
