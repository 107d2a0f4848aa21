//! Project configuration for the lock engine
//!
//! Configuration comes from an optional `kgen.toml` at the project root,
//! merged over built-in defaults. Categories are kept as an ordered list
//! so the combined integrity hash sees them in a stable, user-controlled
//! order.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{LockError, LockResult};

/// File name of the persisted lock document
pub const LOCK_FILE_NAME: &str = "kgen.lock.json";

/// File name of the optional project configuration
pub const CONFIG_FILE_NAME: &str = "kgen.toml";

/// Directories that are never scanned, regardless of category globs
pub const DEFAULT_IGNORE_DIRS: &[&str] = &["node_modules", "dist", ".git", "target"];

/// A named file category defined by glob patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub name: String,
    pub patterns: Vec<String>,
}

impl CategorySpec {
    pub fn new(name: impl Into<String>, patterns: &[&str]) -> Self {
        Self {
            name: name.into(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Resolved configuration consumed by the scanner and lock manager
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Absolute path of the project being locked
    pub project_root: PathBuf,
    /// Project metadata recorded in the lock document
    pub project_name: String,
    pub project_version: String,
    /// Ordered category list; order is significant for the combined hash
    pub categories: Vec<CategorySpec>,
    /// Directory names excluded from every scan
    pub ignore: Vec<String>,
    /// Reproducible-build epoch override (seconds); wall clock when unset
    pub clock_override: Option<i64>,
}

impl LockConfig {
    /// Default configuration for a project root, without reading kgen.toml
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let project_name = project_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        Self {
            project_root,
            project_name,
            project_version: "0.0.0".to_string(),
            categories: default_categories(),
            ignore: DEFAULT_IGNORE_DIRS.iter().map(|d| d.to_string()).collect(),
            clock_override: None,
        }
    }

    /// Load configuration, merging `kgen.toml` over defaults when present
    pub fn load(project_root: impl Into<PathBuf>) -> LockResult<Self> {
        let mut config = Self::new(project_root);
        let config_path = config.project_root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let raw: RawConfig =
            toml::from_str(&content).map_err(|e| LockError::InvalidConfig {
                path: config_path.clone(),
                message: e.to_string(),
            })?;

        if let Some(project) = raw.project {
            if let Some(name) = project.name {
                config.project_name = name;
            }
            if let Some(version) = project.version {
                config.project_version = version;
            }
        }

        if let Some(categories) = raw.categories {
            let mut specs = Vec::new();
            for (name, value) in categories {
                let patterns: Vec<String> =
                    value.try_into().map_err(|e: toml::de::Error| {
                        LockError::InvalidConfig {
                            path: config_path.clone(),
                            message: format!("category '{}': {}", name, e),
                        }
                    })?;
                specs.push(CategorySpec { name, patterns });
            }
            config.categories = specs;
        }

        if let Some(scan) = raw.scan {
            if let Some(extra) = scan.ignore {
                for dir in extra {
                    if !config.ignore.contains(&dir) {
                        config.ignore.push(dir);
                    }
                }
            }
        }

        Ok(config)
    }

    /// Inject a reproducible-build epoch override (seconds since epoch)
    pub fn with_clock_override(mut self, epoch_seconds: Option<i64>) -> Self {
        self.clock_override = epoch_seconds;
        self
    }

    /// Path of the lock file for this project
    pub fn lock_path(&self) -> PathBuf {
        self.project_root.join(LOCK_FILE_NAME)
    }
}

/// Built-in categories: templates, rules, graphs
pub fn default_categories() -> Vec<CategorySpec> {
    vec![
        CategorySpec::new("templates", &["templates/**/*"]),
        CategorySpec::new("rules", &["rules/**/*"]),
        CategorySpec::new("graphs", &["**/*.ttl"]),
    ]
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    project: Option<RawProject>,
    // toml's preserve_order keeps the table in file order, which fixes
    // the category iteration order used by the combined hash.
    categories: Option<toml::map::Map<String, toml::Value>>,
    scan: Option<RawScan>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProject {
    name: Option<String>,
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawScan {
    ignore: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_have_three_categories_in_order() {
        let config = LockConfig::new("/tmp/project");
        let names: Vec<&str> = config.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["templates", "rules", "graphs"]);
    }

    #[test]
    fn default_project_name_from_directory() {
        let config = LockConfig::new("/tmp/my-project");
        assert_eq!(config.project_name, "my-project");
        assert_eq!(config.project_version, "0.0.0");
    }

    #[test]
    fn load_without_config_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = LockConfig::load(dir.path()).unwrap();
        assert_eq!(config.categories, default_categories());
        assert!(config.ignore.contains(&"node_modules".to_string()));
        assert!(config.ignore.contains(&"dist".to_string()));
    }

    #[test]
    fn load_reads_project_section() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("kgen.toml"),
            "[project]\nname = \"demo\"\nversion = \"1.2.3\"\n",
        )
        .unwrap();

        let config = LockConfig::load(dir.path()).unwrap();
        assert_eq!(config.project_name, "demo");
        assert_eq!(config.project_version, "1.2.3");
    }

    #[test]
    fn load_preserves_category_order_from_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("kgen.toml"),
            "[categories]\nvalidation = [\"**/*.check\"]\ntemplates = [\"tpl/**/*\"]\n",
        )
        .unwrap();

        let config = LockConfig::load(dir.path()).unwrap();
        let names: Vec<&str> = config.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["validation", "templates"]);
        assert_eq!(config.categories[1].patterns, vec!["tpl/**/*"]);
    }

    #[test]
    fn load_extends_ignore_list() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("kgen.toml"),
            "[scan]\nignore = [\"build\", \"dist\"]\n",
        )
        .unwrap();

        let config = LockConfig::load(dir.path()).unwrap();
        assert!(config.ignore.contains(&"build".to_string()));
        // no duplicate for dist
        assert_eq!(config.ignore.iter().filter(|d| *d == "dist").count(), 1);
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("kgen.toml"), "[project\nname=").unwrap();

        let err = LockConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, LockError::InvalidConfig { .. }));
    }

    #[test]
    fn load_rejects_non_array_category() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("kgen.toml"), "[categories]\nrules = 5\n").unwrap();

        let err = LockConfig::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("rules"));
    }

    #[test]
    fn lock_path_is_under_project_root() {
        let config = LockConfig::new("/tmp/project");
        assert_eq!(
            config.lock_path(),
            PathBuf::from("/tmp/project/kgen.lock.json")
        );
    }

    #[test]
    fn clock_override_builder() {
        let config = LockConfig::new("/tmp/p").with_clock_override(Some(1_700_000_000));
        assert_eq!(config.clock_override, Some(1_700_000_000));
    }
}
