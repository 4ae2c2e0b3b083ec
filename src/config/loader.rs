//! Source loading.
//!
//! Turns a YAML file into a [`ConfigTree`]. The default source must exist and
//! hold content; the user source may be absent, in which case an empty mapping
//! stands in for it.

use crate::error::{ConfigError, Result};
use crate::tree::ConfigTree;
use std::path::Path;
use tracing::debug;

/// Load a required source.
pub fn load_tree(path: &Path) -> Result<ConfigTree> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let tree = ConfigTree::from_yaml(value).map_err(|e| ConfigError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // Empty and comment-only documents parse as null
    if tree.is_null() {
        return Err(ConfigError::SourceEmpty {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), "Loaded config source");
    Ok(tree)
}

/// Load an optional source; a missing file yields an empty mapping.
pub fn load_optional_tree(path: &Path) -> Result<ConfigTree> {
    if !path.exists() {
        debug!(path = %path.display(), "User config not found, using defaults only");
        return Ok(ConfigTree::empty_mapping());
    }
    load_tree(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_tree() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "general:\n  working_dir: .\n").unwrap();

        let tree = load_tree(&path).unwrap();
        assert_eq!(
            tree.get_path("general.working_dir")
                .and_then(ConfigTree::as_str),
            Some(".")
        );
    }

    #[test]
    fn test_missing_required_source_is_unreadable() {
        let temp = TempDir::new().unwrap();
        let err = load_tree(&temp.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_malformed_source_is_unreadable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yaml");
        std::fs::write(&path, "key: [unclosed\n").unwrap();

        let err = load_tree(&path).unwrap_err();
        assert!(matches!(err, ConfigError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_colliding_keys_make_source_unreadable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "feature:\n  1: a\n  \"1\": b\n").unwrap();

        match load_tree(&path).unwrap_err() {
            ConfigError::SourceUnreadable { reason, .. } => {
                assert!(reason.contains("duplicate mapping key `1`"), "{}", reason)
            }
            other => panic!("expected unreadable source, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_and_comment_only_sources_are_empty() {
        let temp = TempDir::new().unwrap();
        for (name, content) in [("empty.yaml", ""), ("comments.yaml", "# nothing here\n")] {
            let path = temp.path().join(name);
            std::fs::write(&path, content).unwrap();
            let err = load_tree(&path).unwrap_err();
            assert!(matches!(err, ConfigError::SourceEmpty { .. }), "{}", name);
        }
    }

    #[test]
    fn test_missing_optional_source_is_empty_mapping() {
        let temp = TempDir::new().unwrap();
        let tree = load_optional_tree(&temp.path().join("config.yaml")).unwrap();
        assert_eq!(tree, ConfigTree::empty_mapping());
    }

    #[test]
    fn test_present_but_empty_optional_source_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "").unwrap();

        let err = load_optional_tree(&path).unwrap_err();
        assert!(matches!(err, ConfigError::SourceEmpty { .. }));
    }
}
