use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::mode::OutputMode;
use crate::region::Percentages;

const FILE_NAME: &str = "trackscreen.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub device: Option<String>,
    #[serde(default)]
    pub by_name: bool,
    pub area: Option<Percentages>,
    pub scale: Option<f64>,
    pub mode: Option<OutputMode>,
    pub side_key: Option<u16>,
    #[serde(default = "default_true")]
    pub grab: bool,
    pub batch_capacity: Option<usize>,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            device: None,
            by_name: false,
            area: None,
            scale: None,
            mode: None,
            side_key: None,
            grab: true,
            batch_capacity: None,
            verbose: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Runs before logging is set up, so failures are returned rather than logged.
pub fn load_from_path(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::FileParse {
        path: path.display().to_string(),
        message: e.message().to_string(),
    })
}

/// The first config file found on the default search path.
pub fn load_from_default_paths() -> Result<Option<(PathBuf, FileConfig)>, ConfigError> {
    for path in default_config_paths() {
        if path.exists() {
            let config = load_from_path(&path)?;
            return Ok(Some((path, config)));
        }
    }
    Ok(None)
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(FILE_NAME)];

    if let Ok(home) = std::env::var("HOME") {
        paths.push(PathBuf::from(home).join(".config").join(FILE_NAME));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let config: FileConfig = toml::from_str(
            r#"
            device = "Goodix Capacitive TouchScreen"
            by_name = true
            area = { left = 0, top = 50, width = 50, height = 50 }
            scale = 1.5
            mode = "relative"
            side_key = 183
            grab = false
            "#,
        )
        .unwrap();

        assert_eq!(config.device.as_deref(), Some("Goodix Capacitive TouchScreen"));
        assert!(config.by_name);
        assert_eq!(
            config.area,
            Some(Percentages {
                left: 0,
                top: 50,
                width: 50,
                height: 50
            })
        );
        assert_eq!(config.scale, Some(1.5));
        assert_eq!(config.mode, Some(OutputMode::Relative));
        assert_eq!(config.side_key, Some(183));
        assert!(!config.grab);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.grab);
        assert!(config.device.is_none());
        assert!(config.mode.is_none());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<FileConfig>("palm_grace_ms = 500").is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("trackscreen-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "scale = \"fast\"\n").unwrap();
        let result = load_from_path(&path);
        std::fs::remove_file(&path).unwrap();

        match result {
            Err(ConfigError::FileParse { path: p, .. }) => assert_eq!(p, path.display().to_string()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_from_path(Path::new("/nonexistent/trackscreen.toml"));
        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }
}
