use anyhow::Context;
use folio_editor::EditorConfig;
use folio_model::key_generator::DEFAULT_NAMESPACE;
use folio_surface::SurfaceMarkers;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Folio configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Undo levels kept by the editor (0 = unlimited)
    #[serde(default = "default_max_undo_levels")]
    pub max_undo_levels: usize,

    /// Keep node keys when printing values
    #[serde(default)]
    pub preserve_keys: bool,

    /// Namespace seeding generated keys
    #[serde(default = "default_key_namespace")]
    pub key_namespace: String,

    /// Attribute names used by the renderer
    #[serde(default)]
    pub markers: SurfaceMarkers,
}

fn default_max_undo_levels() -> usize {
    folio_editor::DEFAULT_MAX_LEVELS
}

fn default_key_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", config_path.display()))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn editor_config(&self) -> EditorConfig {
        EditorConfig {
            max_undo_levels: self.max_undo_levels,
            key_namespace: self.key_namespace.clone(),
            ..EditorConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_undo_levels: default_max_undo_levels(),
            preserve_keys: false,
            key_namespace: default_key_namespace(),
            markers: SurfaceMarkers::default(),
        }
    }
}
