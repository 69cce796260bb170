//! Configuration system
//!
//! Editor settings are plain serde structs; the [`Config`] trait loads and
//! saves them as TOML or RON depending on the file extension.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Ordering applied to the picking hit list before hover and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitOrder {
    /// Ascending entity id. Stable across frames regardless of camera motion.
    #[default]
    EntityId,
    /// Nearest hit first; equal depths fall back to entity id.
    Depth,
}

/// Picking controller settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    /// Whether mouse events run hit-testing at all
    pub enabled: bool,
    /// Sort policy for the hit list
    pub hit_order: HitOrder,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hit_order: HitOrder::EntityId,
        }
    }
}

/// Top-level editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// `env_logger` filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Viewport size in pixels (width, height)
    pub viewport: (f32, f32),
    /// Picking settings
    pub picking: PickingConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            viewport: (1280.0, 720.0),
            picking: PickingConfig::default(),
        }
    }
}

impl Config for EditorConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("scene_engine_{}_{}", std::process::id(), name))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EditorConfig = toml::from_str("[picking]\nhit_order = \"Depth\"\n").unwrap();
        assert_eq!(config.picking.hit_order, HitOrder::Depth);
        assert!(config.picking.enabled);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_toml_file_roundtrip() {
        let path = temp_path("editor.toml");
        let mut config = EditorConfig::default();
        config.viewport = (640.0, 480.0);
        config.picking.enabled = false;

        config.save_to_file(&path).unwrap();
        let loaded = EditorConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_file_roundtrip() {
        let path = temp_path("editor.ron");
        let mut config = EditorConfig::default();
        config.picking.hit_order = HitOrder::Depth;

        config.save_to_file(&path).unwrap();
        let loaded = EditorConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = EditorConfig::default().save_to_file("editor.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
