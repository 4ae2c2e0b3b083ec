//! Path resolution for the merged tree.
//!
//! Keys signal which values are filesystem paths:
//! - a key containing `path` is relative to `general.working_dir`
//! - a key containing `location` is relative to `general.resources_dir`
//! - every direct child of a mapping named `resources` is relative to
//!   `general.resources_dir`
//!
//! Resolution is a one-shot rewrite performed once per load. Resolved paths
//! are stored as strings; a path that is not valid UTF-8 is stored with
//! replacement characters and logged with `warn!`.

use crate::error::{ConfigError, Result};
use crate::tree::{ConfigTree, Mapping};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Reserved top-level section holding the base directories.
pub const GENERAL_SECTION: &str = "general";
/// Key of the working directory inside `general`.
pub const WORKING_DIR_KEY: &str = "working_dir";
/// Key of the resources directory inside `general`.
pub const RESOURCES_DIR_KEY: &str = "resources_dir";

const RESOURCES_KEY: &str = "resources";
const PATH_MARKER: &str = "path";
const LOCATION_MARKER: &str = "location";

/// Absolute base directories every relative path is anchored at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub working_dir: PathBuf,
    pub resources_dir: PathBuf,
}

impl ResolvedPaths {
    pub fn new(working_dir: impl AsRef<Path>, resources_dir: impl AsRef<Path>) -> Self {
        Self {
            working_dir: absolutize(working_dir.as_ref()),
            resources_dir: absolutize(resources_dir.as_ref()),
        }
    }

    /// Read both base directories from the `general` section and write their
    /// absolute forms back into it.
    pub fn from_general(tree: &mut ConfigTree) -> Result<Self> {
        let kind = tree.kind();
        let root = tree
            .as_mapping_mut()
            .ok_or_else(|| ConfigError::NotAMapping {
                name: "<root>".to_string(),
                kind,
            })?;
        let general = root
            .get_mut(GENERAL_SECTION)
            .ok_or_else(|| ConfigError::UnknownSection(GENERAL_SECTION.to_string()))?;
        let kind = general.kind();
        let general = general
            .as_mapping_mut()
            .ok_or_else(|| ConfigError::NotAMapping {
                name: GENERAL_SECTION.to_string(),
                kind,
            })?;

        let paths = Self::new(
            general_dir(general, WORKING_DIR_KEY)?,
            general_dir(general, RESOURCES_DIR_KEY)?,
        );

        general.insert(
            WORKING_DIR_KEY.to_string(),
            path_to_tree(&paths.working_dir),
        );
        general.insert(
            RESOURCES_DIR_KEY.to_string(),
            path_to_tree(&paths.resources_dir),
        );

        Ok(paths)
    }
}

fn general_dir(general: &Mapping, key: &str) -> Result<PathBuf> {
    general
        .get(key)
        .and_then(ConfigTree::as_str)
        .map(PathBuf::from)
        .ok_or_else(|| ConfigError::MissingGeneralKey(key.to_string()))
}

/// Make a path absolute against the current directory without touching the
/// filesystem (symlinks are not resolved).
fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Join `value` onto `base`, dropping `.` components.
///
/// An absolute `value` replaces `base`, as with [`Path::join`].
fn join_clean(base: &Path, value: &str) -> PathBuf {
    let mut out = base.to_path_buf();
    for component in Path::new(value).components() {
        match component {
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn path_to_tree(path: &Path) -> ConfigTree {
    if path.to_str().is_none() {
        warn!(path = %path.display(), "Path is not valid UTF-8, stored lossily");
    }
    ConfigTree::String(path.to_string_lossy().into_owned())
}

/// Rewrite every path-like value in `tree` to an absolute path.
///
/// Only mappings are walked; sequences are left as they are.
pub fn resolve_paths(tree: &mut ConfigTree, paths: &ResolvedPaths) {
    if let Some(map) = tree.as_mapping_mut() {
        resolve_mapping(map, paths);
    }
}

fn resolve_mapping(map: &mut Mapping, paths: &ResolvedPaths) {
    for (key, value) in map.iter_mut() {
        match value {
            ConfigTree::Mapping(children) if key.trim() == RESOURCES_KEY => {
                for (name, child) in children.iter_mut() {
                    rewrite(name, child, &paths.resources_dir);
                }
            }
            ConfigTree::Mapping(children) => resolve_mapping(children, paths),
            ConfigTree::Null => {}
            leaf => {
                if key.contains(PATH_MARKER) {
                    rewrite(key, leaf, &paths.working_dir);
                } else if key.contains(LOCATION_MARKER) {
                    rewrite(key, leaf, &paths.resources_dir);
                }
            }
        }
    }
}

fn rewrite(key: &str, value: &mut ConfigTree, base: &Path) {
    let resolved = match &*value {
        ConfigTree::String(s) => join_clean(base, s),
        other => {
            warn!(key = %key, kind = %other.kind(), "Path-like key does not hold a string, left unchanged");
            return;
        }
    };
    debug!(key = %key, to = %resolved.display(), "Resolved path");
    *value = path_to_tree(&resolved);
}
