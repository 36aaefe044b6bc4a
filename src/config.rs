//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/roster/roster.toml`
//! 3. Local config: `<project_dir>/.roster.toml`
//! 4. Environment variables: `ROSTER_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::SearchOptions;
use crate::application::ApplicationError;
use crate::domain::Level;

/// How listings are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Name search configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Match names case-sensitively
    pub case_sensitive: bool,
    /// Levels searched by default (e.g., ["college", "student"])
    pub levels: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            levels: Level::ALL.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Raw search config for intermediate parsing (arrays are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSearchConfig {
    pub case_sensitive: Option<bool>,
    pub levels: Option<Vec<String>>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub dataset: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub search: RawSearchConfig,
}

/// Merge arrays with union semantics and negation support.
///
/// - Items from overlay are added to base
/// - Items prefixed with `!` remove the corresponding item from the result
/// - Duplicates are de-duplicated
///
/// # Examples
/// ```ignore
/// merge_array(&["class", "student"], &["college"])    // → ["class", "college", "student"]
/// merge_array(&["class", "student"], &["!class"])     // → ["student"]
/// ```
pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
    let mut result: HashSet<String> = base.iter().cloned().collect();

    for item in overlay {
        if let Some(negated) = item.strip_prefix('!') {
            result.remove(negated);
        } else {
            result.insert(item.clone());
        }
    }

    let mut vec: Vec<String> = result.into_iter().collect();
    vec.sort();
    vec
}

/// Lowercase known level names, keeping a leading `!`. Unknown names pass through
/// unchanged and are rejected by `SearchConfig::to_options`.
fn normalize_levels(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            let (bang, bare) = match name.strip_prefix('!') {
                Some(bare) => ("!", bare),
                None => ("", name.as_str()),
            };
            match Level::parse(bare) {
                Some(level) => format!("{bang}{}", level.as_str()),
                None => name.clone(),
            }
        })
        .collect()
}

impl SearchConfig {
    /// Merge overlay onto self: scalars replace, `levels` unions with `!` negation.
    pub fn merge(&self, overlay: &RawSearchConfig) -> Self {
        Self {
            case_sensitive: overlay.case_sensitive.unwrap_or(self.case_sensitive),
            levels: overlay
                .levels
                .as_ref()
                .map(|o| merge_array(&normalize_levels(&self.levels), &normalize_levels(o)))
                .unwrap_or_else(|| self.levels.clone()),
        }
    }

    /// Apply global config onto defaults: arrays REPLACE instead of union.
    pub fn apply_global(&self, global: &RawSearchConfig) -> Self {
        Self {
            case_sensitive: global.case_sensitive.unwrap_or(self.case_sensitive),
            levels: global
                .levels
                .as_deref()
                .map(normalize_levels)
                .unwrap_or_else(|| self.levels.clone()),
        }
    }

    /// Resolve level names into search options.
    pub fn to_options(&self) -> Result<SearchOptions, ApplicationError> {
        let levels = self
            .levels
            .iter()
            .map(|name| {
                Level::parse(name).ok_or_else(|| ApplicationError::Config {
                    message: format!("unknown search level: {name}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SearchOptions {
            case_sensitive: self.case_sensitive,
            levels,
        })
    }
}

/// Unified configuration for roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// JSON dataset to load instead of the built-in mock data
    pub dataset: Option<PathBuf>,
    /// Output format for listings
    pub format: OutputFormat,
    /// Name search settings
    pub search: SearchConfig,
}

/// Get the XDG config directory for roster.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "roster").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("roster.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".roster.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand `~`, `$VAR` and `${VAR}` in the dataset path.
    fn expand_paths(&mut self) {
        if let Some(dataset) = &self.dataset {
            let raw = dataset.to_string_lossy();
            let expanded = shellexpand::full(&raw)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            self.dataset = Some(PathBuf::from(expanded));
        }
    }

    /// Merge overlay config onto self (base) with union semantics for arrays.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            dataset: overlay.dataset.clone().or_else(|| self.dataset.clone()),
            format: overlay.format.unwrap_or(self.format),
            search: self.search.merge(&overlay.search),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            dataset: global.dataset.clone().or_else(|| self.dataset.clone()),
            format: global.format.unwrap_or(self.format),
            search: self.search.apply_global(&global.search),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.roster.toml`
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with negation support
    /// - Any → Env vars: REPLACE
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), project_dir)
    }

    /// Load settings from an explicit global config path.
    pub fn load_from(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        Self::load_layers(global_path, project_dir, None)
    }

    /// Like `load_from`, but reads `ROSTER_*` variables from `vars` instead of the
    /// process environment.
    pub fn load_with_env(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
        vars: Map<String, String>,
    ) -> Result<Self, ApplicationError> {
        Self::load_layers(global_path, project_dir, Some(vars))
    }

    fn load_layers(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
        env_vars: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current, env_vars)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply ROSTER_* environment variables as explicit overrides.
    ///
    /// `ROSTER_FORMAT`, `ROSTER_DATASET`, `ROSTER_SEARCH__CASE_SENSITIVE`,
    /// `ROSTER_SEARCH__LEVELS` (comma separated). A value that does not parse is an
    /// error rather than being skipped.
    fn apply_env_overrides(
        mut settings: Self,
        env_vars: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("ROSTER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("search.levels")
                .source(env_vars),
        );

        let config = builder.build().map_err(config_err)?;

        if let Some(val) = env_value(config.get_string("dataset"))? {
            settings.dataset = Some(PathBuf::from(val));
        }
        if let Some(val) = env_value(config.get::<OutputFormat>("format"))? {
            settings.format = val;
        }
        if let Some(val) = env_value(config.get_bool("search.case_sensitive"))? {
            settings.search.case_sensitive = val;
        }
        if let Some(val) = env_value(config.get::<Vec<String>>("search.levels"))? {
            settings.search.levels = normalize_levels(&val);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# roster configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/roster/roster.toml  (defines your baseline)
#   Local:  <project_dir>/.roster.toml    (per-directory additions)
#   Env:    ROSTER_* environment variables (explicit overrides)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global.
#   Use "!item" in local config to REMOVE an inherited item:
#     levels = ["!student"]  # stop searching student names

# JSON dataset to load instead of the built-in mock data
# dataset = "~/school.json"

# Output format: "table" or "json"
# format = "table"

[search]
# case_sensitive = false
# levels = ["college", "department", "class", "student"]
"#
        .to_string()
    }
}

/// An unset variable is `None`; a set but invalid one is an error.
fn env_value<T>(result: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match result {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("environment override: {e}"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_then_searches_all_levels() {
        let options = Settings::default().search.to_options().unwrap();
        assert_eq!(options.levels, Level::ALL.to_vec());
        assert!(!options.case_sensitive);
    }

    #[test]
    fn given_tilde_in_dataset_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            dataset: Some(PathBuf::from("~/school.json")),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let dataset = settings.dataset.unwrap();
        assert!(
            dataset.to_string_lossy().starts_with(&home),
            "dataset should start with home dir: {}",
            dataset.display()
        );
    }

    #[test]
    fn given_unknown_level_when_resolving_options_then_config_error() {
        let search = SearchConfig {
            case_sensitive: false,
            levels: vec!["school".into()],
        };
        assert!(matches!(
            search.to_options(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn test_merge_array_union() {
        let base = vec!["class".to_string(), "student".to_string()];
        let overlay = vec!["college".to_string()];
        let result = merge_array(&base, &overlay);

        assert_eq!(result, vec!["class", "college", "student"]);
    }

    #[test]
    fn test_merge_array_negation() {
        let base = vec!["class".to_string(), "student".to_string()];
        let overlay = vec!["!class".to_string()];
        let result = merge_array(&base, &overlay);

        assert_eq!(result, vec!["student"]);
    }

    #[test]
    fn test_merge_array_negation_nonexistent() {
        let base = vec!["class".to_string()];
        let overlay = vec!["!college".to_string()];
        let result = merge_array(&base, &overlay);

        assert_eq!(result, vec!["class"]);
    }

    #[test]
    fn test_apply_global_replaces_levels() {
        let base = SearchConfig::default();
        let global = RawSearchConfig {
            case_sensitive: Some(true),
            levels: Some(vec!["student".to_string()]),
        };

        let result = base.apply_global(&global);

        assert!(result.case_sensitive);
        assert_eq!(result.levels, vec!["student".to_string()]);
    }

    #[test]
    fn test_merge_negation_ignores_level_case() {
        let base = SearchConfig {
            case_sensitive: false,
            levels: vec!["class".to_string(), "student".to_string()],
        };
        let local = RawSearchConfig {
            case_sensitive: None,
            levels: Some(vec!["!Student".to_string(), "COLLEGE".to_string()]),
        };

        let result = base.merge(&local);

        assert_eq!(result.levels, vec!["class", "college"]);
    }

    #[test]
    fn test_normalize_levels_keeps_unknown_names() {
        let names = vec!["Department".to_string(), "!CLASS".to_string(), "school".to_string()];
        assert_eq!(
            normalize_levels(&names),
            vec!["department", "!class", "school"]
        );
    }

    #[test]
    fn test_merge_keeps_base_when_not_specified() {
        let base = SearchConfig {
            case_sensitive: true,
            levels: vec!["class".to_string()],
        };

        let result = base.merge(&RawSearchConfig::default());

        assert_eq!(result, base);
    }
}
