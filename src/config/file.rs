//! Config loading and saving
//!
//! Uses RON (Rusty Object Notation) so the file stays hand-editable.

use std::fs;
use std::path::Path;

use super::ViewerConfig;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "grim-raster.ron";

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ViewerConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load a config, falling back to defaults when the file doesn't exist
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<ViewerConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        log::info!("no config at {}, using defaults", path.display());
        return Ok(ViewerConfig::default().sanitized());
    }
    load_config(path)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &ViewerConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(2)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a config from a RON string
pub fn load_config_from_str(s: &str) -> Result<ViewerConfig, ConfigError> {
    let config: ViewerConfig = ron::from_str(s)?;
    Ok(config.sanitized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_DIMENSION;
    use crate::rasterizer::PixelFormatPreset;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = load_config_from_str("(width: 320, height: 240, pixel_format: Argb8888)").unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 240);
        assert_eq!(config.pixel_format, PixelFormatPreset::Argb8888);
        assert_eq!(config.clear_depth, u32::MAX);
        assert_eq!(config.window_size(), (640, 480));
    }

    #[test]
    fn test_bad_config_is_parse_error() {
        let err = load_config_from_str("(width: \"wide\")").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_oversized_target_is_clamped() {
        let config = load_config_from_str("(width: 70000, height: 0)").unwrap();
        assert_eq!(config.width, MAX_DIMENSION);
        assert_eq!(config.height, 1);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("grim-raster-test-{}.ron", std::process::id()));
        let config = ViewerConfig {
            clear_color: (1, 2, 3),
            log_filter: Some("debug".to_string()),
            ..Default::default()
        };
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config_or_default("/nonexistent/grim-raster.ron").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }
}
