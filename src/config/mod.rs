mod defaults;

use std::env;

use config::{Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggerConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
    #[serde(default = "defaults::log_format")]
    pub format: LogFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            format: defaults::log_format(),
        }
    }
}

/// Knobs of the publish coordinator.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishConfig {
    /// Relationship label marking an entity-has-image edge. Publishing such
    /// an edge also publishes the glyph-icon property on its source vertex.
    #[serde(default = "defaults::has_image_edge_label")]
    pub has_image_edge_label: String,

    /// Name of the glyph-icon property on entity vertices.
    #[serde(default = "defaults::glyph_icon_property_name")]
    pub glyph_icon_property_name: String,

    /// Name of the row-key property linking a vertex to its derived
    /// annotation records.
    #[serde(default = "defaults::row_key_property_name")]
    pub row_key_property_name: String,

    /// Upper bound on properties walked by one element's publish cascade.
    #[serde(default = "defaults::max_cascade_properties")]
    pub max_cascade_properties: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            has_image_edge_label: defaults::has_image_edge_label(),
            glyph_icon_property_name: defaults::glyph_icon_property_name(),
            row_key_property_name: defaults::row_key_property_name(),
            max_cascade_properties: defaults::max_cascade_properties(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logger: LoggerConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

/// Load configuration from `./config/{SANDGRAPH_ENV}.json` (if present)
/// with `SANDGRAPH_*` environment variable overrides.
pub fn load() -> Result<Config, ConfigError> {
    let env_name = env::var("SANDGRAPH_ENV").unwrap_or_else(|_| "development".to_string());
    let config_path = format!("./config/{}.json", env_name);

    let settings = config::Config::builder()
        .add_source(File::with_name(&config_path).required(false))
        .add_source(Environment::with_prefix("SANDGRAPH").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = Config::default();
        assert_eq!(config.publish.has_image_edge_label, "entityHasImage");
        assert_eq!(config.publish.glyph_icon_property_name, "glyphIconVertexId");
        assert_eq!(config.publish.row_key_property_name, "rowKey");
        assert!(config.publish.max_cascade_properties >= 1);
        assert_eq!(config.logger.format, LogFormat::Pretty);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"publish": {"has_image_edge_label": "pictureOf"}}"#)
                .expect("config json");
        assert_eq!(config.publish.has_image_edge_label, "pictureOf");
        assert_eq!(config.publish.row_key_property_name, "rowKey");
    }
}
