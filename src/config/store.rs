//! Configuration store.
//!
//! Owns the two source paths and the current [`LoadedConfig`] snapshot.
//! Loading runs the whole pipeline: load both sources, merge the user source
//! into the defaults with validation, derive the base directories from
//! `general`, then resolve path-like values. Readers get cheap `Arc`
//! snapshots; [`ConfigStore::reset`] swaps in a freshly loaded one.

use super::loader::{load_optional_tree, load_tree};
use super::merge::merge;
use super::resolve::{GENERAL_SECTION, ResolvedPaths, resolve_paths};
use crate::error::{ConfigError, Result};
use crate::tree::{ConfigTree, Mapping};
use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Default location of the schema-defining source.
pub const DEFAULT_SOURCE: &str = "configs/config-default.yaml";
/// Default location of the optional user source.
pub const USER_SOURCE: &str = "configs/config.yaml";

/// Environment variable overriding the default source path.
pub const DEFAULT_SOURCE_ENV: &str = "LAYERED_CONFIG_DEFAULT_PATH";
/// Environment variable overriding the user source path.
pub const USER_SOURCE_ENV: &str = "LAYERED_CONFIG_USER_PATH";

/// Paths of the two configuration sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSources {
    /// Required source; its shape is the schema.
    pub default_source: PathBuf,
    /// Optional override source.
    pub user_source: PathBuf,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigSources {
    pub fn new(default_source: impl Into<PathBuf>, user_source: impl Into<PathBuf>) -> Self {
        Self {
            default_source: default_source.into(),
            user_source: user_source.into(),
        }
    }

    /// Source paths from the environment, falling back to `configs/`.
    pub fn discover() -> Self {
        Self {
            default_source: source_path(std::env::var_os(DEFAULT_SOURCE_ENV), DEFAULT_SOURCE),
            user_source: source_path(std::env::var_os(USER_SOURCE_ENV), USER_SOURCE),
        }
    }
}

/// An environment override is taken as raw OS bytes, so non-UTF-8 paths work.
fn source_path(var: Option<OsString>, fallback: &str) -> PathBuf {
    var.map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(fallback))
}

/// One fully merged and resolved configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    sections: Mapping,
    paths: ResolvedPaths,
}

impl LoadedConfig {
    /// Run the load, merge and resolve pipeline.
    pub fn load(sources: &ConfigSources) -> Result<Self> {
        let mut tree = load_tree(&sources.default_source)?;
        let local = load_optional_tree(&sources.user_source)?;

        let mut issues = Vec::new();
        let label = sources.default_source.display().to_string();
        let valid = merge(&mut tree, local, &label, &mut issues);
        if !valid || !issues.is_empty() {
            return Err(ConfigError::Validation {
                default_source: sources.default_source.clone(),
                user_source: sources.user_source.clone(),
                issues,
            });
        }

        let paths = ResolvedPaths::from_general(&mut tree)?;
        debug!(
            working_dir = %paths.working_dir.display(),
            resources_dir = %paths.resources_dir.display(),
            "Resolved base directories"
        );
        resolve_paths(&mut tree, &paths);

        let sections = match tree {
            ConfigTree::Mapping(sections) => sections,
            other => {
                return Err(ConfigError::NotAMapping {
                    name: label,
                    kind: other.kind(),
                });
            }
        };

        info!(
            default_source = %sources.default_source.display(),
            user_source = %sources.user_source.display(),
            sections = sections.len(),
            "Configuration loaded"
        );
        Ok(Self { sections, paths })
    }

    /// A top-level section by name.
    pub fn section(&self, name: &str) -> Result<&ConfigTree> {
        self.sections
            .get(name)
            .ok_or_else(|| ConfigError::UnknownSection(name.to_string()))
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn sections(&self) -> &Mapping {
        &self.sections
    }

    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    /// The whole configuration as a single mapping tree.
    pub fn to_tree(&self) -> ConfigTree {
        ConfigTree::Mapping(self.sections.clone())
    }

    /// A copy of section `name` with the keys of `general` laid over it.
    ///
    /// A null section counts as empty. On key collisions `general` wins.
    pub fn merged_section(&self, name: &str) -> Result<ConfigTree> {
        let mut merged = match self.section(name)? {
            ConfigTree::Null => Mapping::new(),
            ConfigTree::Mapping(map) => map.clone(),
            other => {
                return Err(ConfigError::NotAMapping {
                    name: name.to_string(),
                    kind: other.kind(),
                });
            }
        };

        match self.section(GENERAL_SECTION)? {
            ConfigTree::Null => {}
            ConfigTree::Mapping(general) => {
                for (key, value) in general {
                    merged.insert(key.clone(), value.clone());
                }
            }
            other => {
                return Err(ConfigError::NotAMapping {
                    name: GENERAL_SECTION.to_string(),
                    kind: other.kind(),
                });
            }
        }

        Ok(ConfigTree::Mapping(merged))
    }

    /// Look up a value by dotted path; the first segment names the section.
    pub fn get_path(&self, dotted: &str) -> Result<&ConfigTree> {
        let (name, rest) = dotted.split_once('.').unwrap_or((dotted, ""));
        self.section(name)?
            .get_path(rest)
            .ok_or_else(|| ConfigError::KeyNotFound(dotted.to_string()))
    }

    /// Deserialize section `name` into `T`.
    pub fn deserialize_section<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        deserialize_named(name, self.section(name)?)
    }

    /// Deserialize the merged view of section `name` into `T`.
    pub fn deserialize_merged_section<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        deserialize_named(name, &self.merged_section(name)?)
    }
}

fn deserialize_named<T: DeserializeOwned>(name: &str, tree: &ConfigTree) -> Result<T> {
    tree.deserialize().map_err(|source| ConfigError::Deserialize {
        name: name.to_string(),
        source,
    })
}

/// Shared owner of the active configuration.
///
/// Construct once at startup and share by reference or `Arc`. Reads are
/// lock-free; `reset()` replaces the whole snapshot at once, so readers never
/// observe a partially loaded configuration. Concurrent `reset()` calls are
/// last-writer-wins and should be serialized by the caller.
#[derive(Debug)]
pub struct ConfigStore {
    sources: ConfigSources,
    current: ArcSwap<LoadedConfig>,
}

impl ConfigStore {
    /// Load the configuration for the first time.
    pub fn open(sources: ConfigSources) -> Result<Self> {
        let loaded = LoadedConfig::load(&sources)?;
        Ok(Self {
            sources,
            current: ArcSwap::from_pointee(loaded),
        })
    }

    /// Open with [`ConfigSources::discover`].
    pub fn discover() -> Result<Self> {
        Self::open(ConfigSources::discover())
    }

    /// Reload both sources and replace the current configuration.
    ///
    /// On error the previously loaded configuration stays active.
    pub fn reset(&self) -> Result<()> {
        let loaded = LoadedConfig::load(&self.sources)?;
        self.current.store(Arc::new(loaded));
        Ok(())
    }

    pub fn sources(&self) -> &ConfigSources {
        &self.sources
    }

    pub fn default_source(&self) -> &Path {
        &self.sources.default_source
    }

    pub fn user_source(&self) -> &Path {
        &self.sources.user_source
    }

    /// The current configuration snapshot.
    pub fn snapshot(&self) -> Arc<LoadedConfig> {
        self.current.load_full()
    }

    /// A copy of top-level section `name`.
    pub fn get(&self, name: &str) -> Result<ConfigTree> {
        self.current.load().section(name).cloned()
    }

    /// See [`LoadedConfig::merged_section`].
    pub fn get_merged_section(&self, name: &str) -> Result<ConfigTree> {
        self.current.load().merged_section(name)
    }

    /// See [`LoadedConfig::get_path`].
    pub fn get_path(&self, dotted: &str) -> Result<ConfigTree> {
        self.current.load().get_path(dotted).cloned()
    }

    pub fn section_names(&self) -> Vec<String> {
        self.current
            .load()
            .section_names()
            .map(str::to_string)
            .collect()
    }

    pub fn paths(&self) -> ResolvedPaths {
        self.current.load().paths().clone()
    }

    pub fn deserialize_section<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.current.load().deserialize_section(name)
    }

    pub fn deserialize_merged_section<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.current.load().deserialize_merged_section(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_sources(temp: &TempDir, default: &str, user: Option<&str>) -> ConfigSources {
        let default_path = temp.path().join("config-default.yaml");
        let user_path = temp.path().join("config.yaml");
        std::fs::write(&default_path, default).unwrap();
        if let Some(user) = user {
            std::fs::write(&user_path, user).unwrap();
        }
        ConfigSources::new(default_path, user_path)
    }

    fn general(temp: &TempDir) -> String {
        format!(
            "general:\n  working_dir: {}\n  resources_dir: {}\n",
            temp.path().display(),
            temp.path().join("res").display()
        )
    }

    #[test]
    fn test_source_path_falls_back_only_when_unset() {
        assert_eq!(source_path(None, USER_SOURCE), PathBuf::from(USER_SOURCE));
        assert_eq!(
            source_path(Some(OsString::from("/etc/app.yaml")), USER_SOURCE),
            PathBuf::from("/etc/app.yaml")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_source_path_keeps_non_utf8_override() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"/etc/conf-\xff.yaml".to_vec());
        let path = source_path(Some(raw.clone()), DEFAULT_SOURCE);
        assert_eq!(path.as_os_str(), raw.as_os_str());
    }

    #[test]
    fn test_merged_section_overlays_general() {
        let temp = TempDir::new().unwrap();
        let default = format!(
            "{}  timeout: 30\nfeature:\n  threshold: 0.5\n  timeout: 5\n",
            general(&temp)
        );
        let loaded = LoadedConfig::load(&write_sources(&temp, &default, None)).unwrap();

        let merged = loaded.merged_section("feature").unwrap();
        assert_eq!(
            merged.get("threshold").and_then(ConfigTree::as_f64),
            Some(0.5)
        );
        // general wins on collision
        assert_eq!(merged.get("timeout").and_then(ConfigTree::as_i64), Some(30));
        assert!(merged.get("working_dir").is_some());

        // the stored section is untouched
        assert_eq!(
            loaded
                .section("feature")
                .unwrap()
                .get("timeout")
                .and_then(ConfigTree::as_i64),
            Some(5)
        );
    }

    #[test]
    fn test_merged_section_of_null_section() {
        let temp = TempDir::new().unwrap();
        let default = format!("{}empty: ~\n", general(&temp));
        let loaded = LoadedConfig::load(&write_sources(&temp, &default, None)).unwrap();

        let merged = loaded.merged_section("empty").unwrap();
        assert_eq!(
            merged.as_mapping().map(|m| m.len()),
            loaded.section("general").unwrap().as_mapping().map(|m| m.len())
        );
    }

    #[test]
    fn test_merged_section_rejects_scalar_section() {
        let temp = TempDir::new().unwrap();
        let default = format!("{}version: 3\n", general(&temp));
        let loaded = LoadedConfig::load(&write_sources(&temp, &default, None)).unwrap();

        let err = loaded.merged_section("version").unwrap_err();
        assert!(matches!(err, ConfigError::NotAMapping { .. }));
    }

    #[test]
    fn test_get_path() {
        let temp = TempDir::new().unwrap();
        let default = format!("{}feature:\n  inner:\n    threshold: 0.5\n", general(&temp));
        let loaded = LoadedConfig::load(&write_sources(&temp, &default, None)).unwrap();

        assert_eq!(
            loaded
                .get_path("feature.inner.threshold")
                .unwrap()
                .as_f64(),
            Some(0.5)
        );
        assert!(loaded.get_path("feature").unwrap().as_mapping().is_some());
        assert!(matches!(
            loaded.get_path("feature.nope"),
            Err(ConfigError::KeyNotFound(_))
        ));
        assert!(matches!(
            loaded.get_path("nope.x"),
            Err(ConfigError::UnknownSection(_))
        ));
    }

    #[test]
    fn test_non_mapping_root_is_reported() {
        let temp = TempDir::new().unwrap();
        let err = LoadedConfig::load(&write_sources(&temp, "- a\n- b\n", None)).unwrap_err();
        // the empty user mapping does not match a sequence root
        assert_eq!(err.issues().len(), 1);
    }

    #[test]
    fn test_sources_new() {
        let sources = ConfigSources::new("a.yaml", "b.yaml");
        assert_eq!(sources.default_source, PathBuf::from("a.yaml"));
        assert_eq!(sources.user_source, PathBuf::from("b.yaml"));
    }
}
