//! Configuration module for redundex.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `RX_` and use double underscores
//! to separate nested levels:
//! - `RX_ANALYSIS__CRITICAL_THRESHOLD=0.95` sets `analysis.critical_threshold`
//! - `RX_EMBEDDING__MODEL=BGESmallENV15` sets `embedding.model`
//! - `RX_INDEXING__EXTENSIONS=[rs]` sets `indexing.extensions`

use crate::analysis::{Thresholds, VERB_PREFIXES, validate_threshold};
use crate::vector::default_models_dir;
use crate::{IndexError, IndexResult};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the settings file and the default index.
pub const CONFIG_DIR: &str = ".redundex";

/// Settings file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Path to the persisted embedding index
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Directory holding the config directory; relative index paths resolve against it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Similarity analysis settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Source discovery settings
    #[serde(default)]
    pub indexing: IndexingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Cutoff for critical redundancy groups
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f32,

    /// Cutoff for potential redundancy groups
    #[serde(default = "default_potential_threshold")]
    pub potential_threshold: f32,

    /// Cutoff for the all-pairs duplicate listing
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f32,

    /// Number of search results shown
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Smallest name group worth reporting
    #[serde(default = "default_name_group_min")]
    pub name_group_min: usize,

    /// Members shown per name group
    #[serde(default = "default_name_group_display")]
    pub name_group_display: usize,

    /// Verb prefixes stripped before name grouping, first match wins
    #[serde(default = "default_verb_prefixes")]
    pub verb_prefixes: Vec<String>,

    /// Number of threads for pairwise comparison
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EmbeddingConfig {
    /// Model to use for embeddings
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Model download directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Characters of source content embedded per artifact
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Characters of source content kept as a display preview
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct IndexingConfig {
    /// File extensions indexed, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names skipped anywhere in the tree
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_index_path() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join("index.json")
}
fn default_false() -> bool {
    false
}
fn default_critical_threshold() -> f32 {
    0.90
}
fn default_potential_threshold() -> f32 {
    0.85
}
fn default_duplicate_threshold() -> f32 {
    0.85
}
fn default_search_limit() -> usize {
    10
}
fn default_name_group_min() -> usize {
    3
}
fn default_name_group_display() -> usize {
    5
}
fn default_verb_prefixes() -> Vec<String> {
    VERB_PREFIXES.iter().map(|p| p.to_string()).collect()
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_embedding_model() -> String {
    "AllMiniLML6V2".to_string()
}
fn default_max_chars() -> usize {
    1000
}
fn default_preview_chars() -> usize {
    200
}
fn default_extensions() -> Vec<String> {
    vec!["js".to_string(), "ts".to_string(), "vue".to_string()]
}
fn default_exclude_dirs() -> Vec<String> {
    vec!["node_modules".to_string(), "playwright-report".to_string()]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            index_path: default_index_path(),
            workspace_root: None,
            debug: false,
            analysis: AnalysisConfig::default(),
            embedding: EmbeddingConfig::default(),
            indexing: IndexingConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            critical_threshold: default_critical_threshold(),
            potential_threshold: default_potential_threshold(),
            duplicate_threshold: default_duplicate_threshold(),
            search_limit: default_search_limit(),
            name_group_min: default_name_group_min(),
            name_group_display: default_name_group_display(),
            verb_prefixes: default_verb_prefixes(),
            parallel_threads: default_parallel_threads(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            cache_dir: None,
            max_chars: default_max_chars(),
            preview_chars: default_preview_chars(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

impl AnalysisConfig {
    /// Validated severity thresholds.
    pub fn thresholds(&self) -> IndexResult<Thresholds> {
        Thresholds::new(self.critical_threshold, self.potential_threshold)
    }

    /// Validated duplicate threshold.
    pub fn duplicate_threshold(&self) -> IndexResult<f32> {
        validate_threshold(self.duplicate_threshold)
    }
}

impl EmbeddingConfig {
    /// Configured model directory, or the per-user cache.
    pub fn models_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_models_dir)
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let current = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_in(&current)
    }

    /// Load configuration as seen from `dir`, searching its ancestors for
    /// the config directory.
    pub fn load_in(dir: &Path) -> Result<Self, Box<figment::Error>> {
        let root = Self::workspace_root_from(dir);
        let config_path = root
            .as_deref()
            .unwrap_or(dir)
            .join(CONFIG_DIR)
            .join(CONFIG_FILE);

        Self::figment(config_path)
            .extract()
            .map_err(Box::new)
            .map(|settings: Settings| settings.anchored_at(root))
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        let root = Self::root_of_config(path.as_ref());
        Self::figment(path.as_ref())
            .extract()
            .map_err(Box::new)
            .map(|settings: Settings| settings.anchored_at(root))
    }

    /// Record the workspace root and resolve a relative index path against it.
    fn anchored_at(mut self, root: Option<PathBuf>) -> Self {
        if self.workspace_root.is_none() {
            self.workspace_root = root;
        }
        if let Some(root) = &self.workspace_root
            && self.index_path.is_relative()
        {
            self.index_path = root.join(&self.index_path);
        }
        self
    }

    /// Workspace root implied by an explicit settings file path.
    fn root_of_config(path: &Path) -> Option<PathBuf> {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty())?;
        if dir.file_name().is_some_and(|name| name == CONFIG_DIR) {
            dir.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
        } else {
            Some(dir.to_path_buf())
        }
    }

    fn figment(config_path: impl AsRef<Path>) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path.as_ref()))
            // Layer in environment variables with RX_ prefix
            // Double underscore (__) separates nested levels
            .merge(Env::prefixed("RX_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
    }

    /// Find the settings file by looking for the config directory
    /// Searches from current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Get the workspace root directory (where the config directory is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::workspace_root_from(&current)
    }

    fn workspace_root_from(dir: &Path) -> Option<PathBuf> {
        dir.ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Check if configuration is properly initialized
    pub fn check_init() -> Result<(), String> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        if !config_path.exists() {
            return Err("No configuration file found".to_string());
        }

        match std::fs::read_to_string(&config_path) {
            Ok(content) => {
                if let Err(e) = toml::from_str::<Settings>(&content) {
                    return Err(format!(
                        "Configuration file is corrupted: {e}\nRun 'redundex init --force' to regenerate."
                    ));
                }
            }
            Err(e) => {
                return Err(format!("Cannot read configuration file: {e}"));
            }
        }

        Ok(())
    }

    /// Validate values that cannot be expressed in the schema.
    pub fn validate(&self) -> IndexResult<()> {
        self.analysis.thresholds()?;
        self.analysis.duplicate_threshold()?;
        if self.analysis.search_limit == 0 {
            return Err(IndexError::ConfigError {
                reason: "analysis.search_limit must be at least 1".to_string(),
            });
        }
        if self.indexing.extensions.is_empty() {
            return Err(IndexError::ConfigError {
                reason: "indexing.extensions must list at least one extension".to_string(),
            });
        }
        Ok(())
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        Self::init_config_file_in(Path::new("."), force)
    }

    /// Create the default settings file under `root`.
    pub fn init_config_file_in(
        root: &Path,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let prefixes = VERB_PREFIXES
            .iter()
            .map(|p| format!("\"{p}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let template = format!(
            r#"# redundex configuration file

# Version of the configuration schema
version = 1

# Path to the embedding index (relative to the directory holding .redundex)
index_path = ".redundex/index.json"

# Global debug mode
debug = false

[analysis]
# Groups at or above this similarity are reported as critical
critical_threshold = 0.90

# Groups at or above this similarity are reported as merge candidates
potential_threshold = 0.85

# Default threshold for `redundex duplicates`
duplicate_threshold = 0.85

# Number of results shown by `redundex search`
search_limit = 10

# Name groups need at least this many members to be reported
name_group_min = 3

# Members shown per name group
name_group_display = 5

# Stripped before name grouping; only the first match in this order is removed
verb_prefixes = [{prefixes}]

# Number of threads for pairwise comparison (defaults to CPU count)
# parallel_threads = {threads}

[embedding]
# Model to use for embeddings
model = "AllMiniLML6V2"

# Model download directory (defaults to the user cache directory)
# cache_dir = "{cache}"

# Characters of source embedded per file
max_chars = 1000

# Characters of source kept for display
preview_chars = 200

[indexing]
# File extensions to index
extensions = ["js", "ts", "vue"]

# Directory names skipped anywhere in the tree
exclude_dirs = ["node_modules", "playwright-report"]
"#,
            threads = num_cpus::get(),
            cache = default_models_dir().display(),
        );

        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}
