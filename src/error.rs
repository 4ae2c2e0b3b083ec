//! Error types for configuration loading and access.

use crate::format::{DELIMITER, bold, bold_path, format_issue_report};
use crate::tree::TreeKind;
use std::fmt;
use std::path::PathBuf;

/// One structural problem found while merging the user source into the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    /// The user value's kind disagrees with the default value's kind.
    StructuralMismatch {
        path: String,
        default_kind: TreeKind,
        local_kind: TreeKind,
    },
    /// The user mapping has a key the default mapping does not define.
    UnknownKey { path: String, key: String },
}

impl ConfigIssue {
    /// Arrow-separated location of the issue, e.g. `config-default.yaml -> model`.
    pub fn path(&self) -> &str {
        match self {
            ConfigIssue::StructuralMismatch { path, .. } => path,
            ConfigIssue::UnknownKey { path, .. } => path,
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::StructuralMismatch {
                path,
                default_kind,
                local_kind,
            } => write!(
                f,
                "{} has different types: {} and {}",
                path, default_kind, local_kind
            ),
            ConfigIssue::UnknownKey { path, key } => {
                write!(f, "No key in {} {} {}", path, DELIMITER, bold(key))
            }
        }
    }
}

/// Errors produced while loading or reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The source is missing or is not a parseable YAML document.
    #[error("cannot read {}: {reason}", bold_path(.path))]
    SourceUnreadable { path: PathBuf, reason: String },

    /// The source parsed but holds no content.
    #[error("{} is empty. Fill it, please.", bold_path(.path))]
    SourceEmpty { path: PathBuf },

    /// Merging the user source produced one or more issues.
    #[error("{}", format_issue_report(.default_source, .user_source, .issues))]
    Validation {
        default_source: PathBuf,
        user_source: PathBuf,
        issues: Vec<ConfigIssue>,
    },

    /// A top-level section that was never loaded.
    #[error("unknown section `{0}`")]
    UnknownSection(String),

    /// A dotted key that does not resolve to a value.
    #[error("key `{0}` not found")]
    KeyNotFound(String),

    /// A required key of the `general` section is missing or not a string.
    #[error("`general -> {0}` must be set to a directory path")]
    MissingGeneralKey(String),

    /// A node that must be a mapping is something else.
    #[error("`{name}` must be a mapping, found {kind}")]
    NotAMapping { name: String, kind: TreeKind },

    /// A section could not be deserialized into the requested type.
    #[error("cannot deserialize `{name}`: {source}")]
    Deserialize {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    /// Issues collected during validation, empty for other errors.
    pub fn issues(&self) -> &[ConfigIssue] {
        match self {
            ConfigError::Validation { issues, .. } => issues,
            _ => &[],
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
