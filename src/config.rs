//! Configuration file handling.
//!
//! This module handles loading `.aggregator.toml` and merging it with
//! command-line overrides.

use crate::models::{CollisionPolicy, LinkStrategy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the aggregator root.
pub const CONFIG_FILE_NAME: &str = ".aggregator.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Where sub-applications and menus live.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Menu merging settings.
    #[serde(default)]
    pub menus: MenusConfig,

    /// Module resolution settings.
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Route transform settings.
    #[serde(default)]
    pub transform: TransformConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Where the build context is written (`-` for stdout).
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "build-context.json".to_string()
}

/// Filesystem layout, relative to the aggregator root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Directory holding one subdirectory per sub-application.
    #[serde(default = "default_applications_root")]
    pub applications_root: PathBuf,

    /// Base navigation menu document.
    #[serde(default = "default_base_menu")]
    pub base_menu: PathBuf,

    /// UI source directory inside each sub-application.
    #[serde(default = "default_app_source_dir")]
    pub app_source_dir: PathBuf,

    /// Menu fragment inside each sub-application.
    #[serde(default = "default_app_menu_file")]
    pub app_menu_file: PathBuf,

    /// Directory inside the aggregator that receives the links.
    #[serde(default = "default_link_dir")]
    pub link_dir: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            applications_root: default_applications_root(),
            base_menu: default_base_menu(),
            app_source_dir: default_app_source_dir(),
            app_menu_file: default_app_menu_file(),
            link_dir: default_link_dir(),
        }
    }
}

fn default_applications_root() -> PathBuf {
    PathBuf::from("../../applications")
}

fn default_base_menu() -> PathBuf {
    PathBuf::from("../files/menu.json")
}

fn default_app_source_dir() -> PathBuf {
    PathBuf::from("htdoc")
}

fn default_app_menu_file() -> PathBuf {
    PathBuf::from("files/menu.json")
}

fn default_link_dir() -> PathBuf {
    PathBuf::from("src/applications")
}

/// Menu merging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenusConfig {
    /// Name of the global constant holding the merged menu.
    #[serde(default = "default_define_name")]
    pub define_name: String,

    /// Policy for keys declared by more than one source.
    #[serde(default)]
    pub on_collision: CollisionPolicy,
}

impl Default for MenusConfig {
    fn default() -> Self {
        Self {
            define_name: default_define_name(),
            on_collision: CollisionPolicy::default(),
        }
    }
}

fn default_define_name() -> String {
    "__MENUS__".to_string()
}

/// Module resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Symbolic prefix resolving to the aggregator's source root.
    #[serde(default = "default_alias")]
    pub alias: String,

    /// Source root, relative to the aggregator root.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// How sub-application sources are wired in.
    #[serde(default)]
    pub strategy: LinkStrategy,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            alias: default_alias(),
            source_dir: default_source_dir(),
            strategy: LinkStrategy::default(),
        }
    }
}

fn default_alias() -> String {
    "@".to_string()
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}

/// Route transform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Path suffix identifying the dev-only routing module.
    #[serde(default = "default_dev_routes_module")]
    pub dev_routes_module: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            dev_routes_module: default_dev_routes_module(),
        }
    }
}

fn default_dev_routes_module() -> String {
    "src/router/development.js".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the aggregator root.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_root(root: &Path) -> Result<Option<Self>> {
        let config_path = root.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with `resolve` arguments.
    ///
    /// CLI arguments take precedence over config file settings and only
    /// override when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::ResolveArgs) {
        if let Some(ref output) = args.output {
            self.general.output = output.clone();
        }
        if let Some(ref root) = args.applications_root {
            self.layout.applications_root = root.clone();
        }
        if let Some(ref menu) = args.base_menu {
            self.layout.base_menu = menu.clone();
        }
        if let Some(strategy) = args.strategy {
            self.resolve.strategy = strategy;
        }
        if let Some(policy) = args.on_collision {
            self.menus.on_collision = policy;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
