//! Generic configuration tree.
//!
//! Every source is parsed into a [`ConfigTree`] before merging, so the merge
//! and path-resolution passes match on one closed set of node kinds instead of
//! working against `serde_yaml::Value` directly.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

/// Mapping node payload. Keys are always strings.
pub type Mapping = BTreeMap<String, ConfigTree>;

/// A parsed configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigTree {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<ConfigTree>),
    Mapping(Mapping),
}

/// The kind of a [`ConfigTree`] node, used for structural compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Sequence,
    Mapping,
}

impl TreeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeKind::Null => "null",
            TreeKind::Bool => "bool",
            TreeKind::Integer => "integer",
            TreeKind::Float => "float",
            TreeKind::String => "string",
            TreeKind::Sequence => "sequence",
            TreeKind::Mapping => "mapping",
        }
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A YAML document that has no faithful [`ConfigTree`] form.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("unsupported mapping key `{0}`: keys must be scalars")]
    UnsupportedKey(String),

    #[error("duplicate mapping key `{0}`")]
    DuplicateKey(String),

    #[error("integer `{0}` does not fit in a signed 64-bit value")]
    IntegerOutOfRange(String),
}

impl ConfigTree {
    /// An empty mapping node.
    pub fn empty_mapping() -> Self {
        ConfigTree::Mapping(Mapping::new())
    }

    pub fn kind(&self) -> TreeKind {
        match self {
            ConfigTree::Null => TreeKind::Null,
            ConfigTree::Bool(_) => TreeKind::Bool,
            ConfigTree::Integer(_) => TreeKind::Integer,
            ConfigTree::Float(_) => TreeKind::Float,
            ConfigTree::String(_) => TreeKind::String,
            ConfigTree::Sequence(_) => TreeKind::Sequence,
            ConfigTree::Mapping(_) => TreeKind::Mapping,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigTree::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigTree::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigTree::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as `f64`; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigTree::Float(f) => Some(*f),
            ConfigTree::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigTree::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigTree]> {
        match self {
            ConfigTree::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigTree::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            ConfigTree::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a direct child of a mapping node.
    pub fn get(&self, key: &str) -> Option<&ConfigTree> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Look up a nested value by dotted path, e.g. `"model.weights_path"`.
    ///
    /// Only mapping nodes are traversed; an empty path returns `self`.
    pub fn get_path(&self, dotted: &str) -> Option<&ConfigTree> {
        if dotted.is_empty() {
            return Some(self);
        }
        dotted
            .split('.')
            .try_fold(self, |node, segment| node.get(segment))
    }

    /// Deserialize this subtree into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_yaml::Error> {
        let value = serde_yaml::to_value(self)?;
        serde_yaml::from_value(value)
    }

    /// Convert a parsed YAML document into a tree.
    ///
    /// Scalar mapping keys are stringified; tags are dropped. Two keys of one
    /// mapping that stringify alike (`1` and `"1"`) are rejected.
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, TreeError> {
        use serde_yaml::Value;

        Ok(match value {
            Value::Null => ConfigTree::Null,
            Value::Bool(b) => ConfigTree::Bool(b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => ConfigTree::Integer(i),
                (None, Some(f)) if n.is_f64() => ConfigTree::Float(f),
                _ => return Err(TreeError::IntegerOutOfRange(n.to_string())),
            },
            Value::String(s) => ConfigTree::String(s),
            Value::Sequence(items) => ConfigTree::Sequence(
                items
                    .into_iter()
                    .map(ConfigTree::from_yaml)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Mapping(map) => {
                let mut out = Mapping::new();
                for (key, value) in map {
                    match out.entry(yaml_key_to_string(key)?) {
                        Entry::Occupied(entry) => {
                            return Err(TreeError::DuplicateKey(entry.key().clone()));
                        }
                        Entry::Vacant(entry) => {
                            entry.insert(ConfigTree::from_yaml(value)?);
                        }
                    }
                }
                ConfigTree::Mapping(out)
            }
            Value::Tagged(tagged) => ConfigTree::from_yaml(tagged.value)?,
        })
    }
}

fn yaml_key_to_string(key: serde_yaml::Value) -> Result<String, TreeError> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Tagged(tagged) => yaml_key_to_string(tagged.value),
        other => Err(TreeError::UnsupportedKey(format!("{:?}", other))),
    }
}

impl From<&str> for ConfigTree {
    fn from(s: &str) -> Self {
        ConfigTree::String(s.to_string())
    }
}

impl From<String> for ConfigTree {
    fn from(s: String) -> Self {
        ConfigTree::String(s)
    }
}

impl From<i64> for ConfigTree {
    fn from(i: i64) -> Self {
        ConfigTree::Integer(i)
    }
}

impl From<f64> for ConfigTree {
    fn from(f: f64) -> Self {
        ConfigTree::Float(f)
    }
}

impl From<bool> for ConfigTree {
    fn from(b: bool) -> Self {
        ConfigTree::Bool(b)
    }
}

impl From<Mapping> for ConfigTree {
    fn from(map: Mapping) -> Self {
        ConfigTree::Mapping(map)
    }
}
