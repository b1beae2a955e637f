use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Config file picked up from the workspace root when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "submodule-aliases.json";

pub const DEFAULT_NAME: &str = "submodule-aliases";
pub const DEFAULT_PACKAGES_DIR: &str = "packages";
pub const DEFAULT_FILTER: &str = "^@";

/// How often the submodule registry is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscoveryMode {
    /// Walk the workspace on every resolution request.
    #[default]
    PerCall,
    /// Walk once and reuse the registry until `AliasResolver::invalidate` is called.
    Cached,
}

/// Options for the alias resolver, as read from `submodule-aliases.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AliasOptions {
    /// Plugin display name reported to the host build tool.
    pub name: String,
    /// Workspace root. Relative paths are taken from the current directory;
    /// `None` means the current directory itself.
    pub root: Option<String>,
    pub packages_dir: String,
    /// When non-empty, only submodules with these names are registered.
    pub submodules: Vec<String>,
    /// Regex a specifier must match before the resolver looks at it.
    pub filter: String,
    /// Extensions tried by the path resolver, in preference order, without the dot.
    pub extensions: Vec<String>,
    pub discovery: DiscoveryMode,
}

impl Default for AliasOptions {
    fn default() -> Self {
        AliasOptions {
            name: DEFAULT_NAME.to_string(),
            root: None,
            packages_dir: DEFAULT_PACKAGES_DIR.to_string(),
            submodules: Vec::new(),
            filter: DEFAULT_FILTER.to_string(),
            extensions: vec!["ts".to_string(), "js".to_string()],
            discovery: DiscoveryMode::PerCall,
        }
    }
}

impl AliasOptions {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let options: AliasOptions =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        options.validate()?;
        Ok(options)
    }

    /// Load `submodule-aliases.json` from `root` if it exists, otherwise defaults.
    pub fn load_from_root(root: &Path) -> Result<Self, ConfigError> {
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            log::debug!("Loading alias options from {}", candidate.display());
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dir = self.packages_dir.as_str();
        if dir.is_empty() || dir == "." || dir == ".." || dir.contains('/') || dir.contains('\\') {
            return Err(ConfigError::InvalidPackagesDir(self.packages_dir.clone()));
        }
        if self.normalized_extensions().is_empty() {
            return Err(ConfigError::NoExtensions);
        }
        Ok(())
    }

    /// Extensions with any leading dot stripped, so `".ts"` and `"ts"` are equivalent.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fill_defaults_for_missing_fields() {
        let options: AliasOptions =
            serde_json::from_str(r#"{ "packagesDir": "modules" }"#).unwrap();
        assert_eq!(options.packages_dir, "modules");
        assert_eq!(options.name, DEFAULT_NAME);
        assert_eq!(options.filter, DEFAULT_FILTER);
        assert_eq!(options.extensions, vec!["ts", "js"]);
        assert_eq!(options.discovery, DiscoveryMode::PerCall);
    }

    #[test]
    fn should_parse_discovery_mode() {
        let options: AliasOptions = serde_json::from_str(r#"{ "discovery": "cached" }"#).unwrap();
        assert_eq!(options.discovery, DiscoveryMode::Cached);
    }

    #[test]
    fn should_reject_nested_packages_dir() {
        let options = AliasOptions {
            packages_dir: "libs/packages".to_string(),
            ..AliasOptions::default()
        };
        assert!(matches!(options.validate(), Err(ConfigError::InvalidPackagesDir(_))));
    }

    #[test]
    fn should_reject_empty_extensions() {
        let options = AliasOptions {
            extensions: Vec::new(),
            ..AliasOptions::default()
        };
        assert!(matches!(options.validate(), Err(ConfigError::NoExtensions)));
    }

    #[test]
    fn should_strip_leading_dots_from_extensions() {
        let options = AliasOptions {
            extensions: vec![".tsx".to_string(), "mjs".to_string()],
            ..AliasOptions::default()
        };
        assert_eq!(options.normalized_extensions(), vec!["tsx", "mjs"]);
    }

    #[test]
    fn should_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{ "name": "my-aliases", "submodules": ["lib"] }"#).unwrap();

        let options = AliasOptions::load(&path).unwrap();
        assert_eq!(options.name, "my-aliases");
        assert_eq!(options.submodules, vec!["lib"]);
    }

    #[test]
    fn should_report_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(AliasOptions::load(&path), Err(ConfigError::Json { .. })));
    }

    #[test]
    fn should_default_when_root_has_no_config() {
        let dir = tempfile::tempdir().unwrap();
        let options = AliasOptions::load_from_root(dir.path()).unwrap();
        assert_eq!(options, AliasOptions::default());
    }
}
