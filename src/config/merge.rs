//! Validated merge of the user source into the defaults.
//!
//! The default tree is the schema: the user tree may only set values for keys
//! the default tree already defines. Mappings are merged recursively, every
//! other value (scalars and sequences) replaces the default entirely.
//! All problems are collected rather than stopping at the first one.

use crate::error::ConfigIssue;
use crate::format::join_label;
use crate::tree::ConfigTree;

/// Merge `local` into `default` in place.
///
/// `label` names the current position for issue messages; the root call
/// passes the default source's name. Returns `false` if any issue was
/// recorded anywhere below this node.
///
/// # Example
/// ```
/// use layered_config::config::merge;
/// use layered_config::tree::ConfigTree;
///
/// let parse = |s: &str| ConfigTree::from_yaml(serde_yaml::from_str(s).unwrap()).unwrap();
///
/// let mut default = parse("feature: {threshold: 0.5, enabled: true}");
/// let local = parse("feature: {threshold: 0.9}");
///
/// let mut issues = Vec::new();
/// assert!(merge(&mut default, local, "defaults", &mut issues));
/// assert_eq!(default.get_path("feature.threshold").and_then(|v| v.as_f64()), Some(0.9));
/// assert_eq!(default.get_path("feature.enabled").and_then(|v| v.as_bool()), Some(true));
/// ```
pub fn merge(
    default: &mut ConfigTree,
    local: ConfigTree,
    label: &str,
    issues: &mut Vec<ConfigIssue>,
) -> bool {
    if default.kind() != local.kind() {
        issues.push(ConfigIssue::StructuralMismatch {
            path: label.to_string(),
            default_kind: default.kind(),
            local_kind: local.kind(),
        });
        return false;
    }

    let (ConfigTree::Mapping(default_map), ConfigTree::Mapping(local_map)) = (default, local)
    else {
        // Same non-mapping kind at the root of a merge: nothing to descend into
        return true;
    };

    let mut valid = true;
    for (key, local_value) in local_map {
        match default_map.get_mut(&key) {
            None => {
                issues.push(ConfigIssue::UnknownKey {
                    path: label.to_string(),
                    key,
                });
                valid = false;
            }
            Some(default_value) => {
                if matches!(local_value, ConfigTree::Mapping(_)) {
                    let child_label = join_label(label, &key);
                    valid = merge(default_value, local_value, &child_label, issues) && valid;
                } else {
                    *default_value = local_value;
                }
            }
        }
    }
    valid
}
