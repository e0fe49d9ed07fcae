mod cli;
mod file;

pub use cli::{Cli, Command};

use std::path::PathBuf;

use file::FileConfig;

use crate::batch::DEFAULT_CAPACITY;
use crate::error::ConfigError;
use crate::mode::OutputMode;
use crate::region::Percentages;

const DEFAULT_SCALE: f64 = 1.0;

/// Merged configuration from CLI args and TOML file.
#[derive(Debug, Clone)]
pub struct Config {
    pub device: Option<String>,
    pub by_name: bool,
    pub area: Percentages,
    pub scale: f64,
    pub mode: OutputMode,
    pub side_key: Option<u16>,
    pub grab: bool,
    pub batch_capacity: usize,
    pub verbose: bool,
    /// Config file the values were merged from, if any.
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load configuration by merging TOML file with CLI overrides.
    /// An unreadable or malformed config file is an error, never silently skipped.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let found = match &cli.config {
            Some(path) => Some((path.clone(), file::load_from_path(path)?)),
            None => file::load_from_default_paths()?,
        };

        Ok(match found {
            Some((path, file_config)) => Self {
                file: Some(path),
                ..Self::merge(cli, file_config)
            },
            None => Self::merge(cli, FileConfig::default()),
        })
    }

    fn merge(cli: &Cli, file_config: FileConfig) -> Self {
        Self {
            device: cli.device.clone().or(file_config.device),
            by_name: cli.by_name || file_config.by_name,
            area: cli.area.or(file_config.area).unwrap_or_default(),
            scale: cli.scale.or(file_config.scale).unwrap_or(DEFAULT_SCALE),
            mode: cli.mode.or(file_config.mode).unwrap_or_default(),
            side_key: cli.side_key.or(file_config.side_key),
            grab: !cli.no_grab && file_config.grab,
            batch_capacity: cli
                .batch_capacity
                .or(file_config.batch_capacity)
                .unwrap_or(DEFAULT_CAPACITY),
            verbose: cli.verbose || file_config.verbose,
            file: None,
        }
    }

    /// The touchscreen to open, once validated.
    pub fn device(&self) -> Result<&str, ConfigError> {
        self.device.as_deref().ok_or(ConfigError::MissingDevice)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.device()?;
        self.area.validate()?;
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::InvalidScale(self.scale));
        }
        if self.batch_capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("trackscreen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::merge(&parse(&["/dev/input/event5"]), FileConfig::default());
        assert_eq!(config.device.as_deref(), Some("/dev/input/event5"));
        assert_eq!(config.area, Percentages::default());
        assert_eq!(config.scale, 1.0);
        assert_eq!(config.mode, OutputMode::Passthrough);
        assert_eq!(config.batch_capacity, DEFAULT_CAPACITY);
        assert!(config.grab);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file_config = FileConfig {
            device: Some("/dev/input/event1".into()),
            scale: Some(3.0),
            mode: Some(OutputMode::Relative),
            side_key: Some(100),
            ..FileConfig::default()
        };
        let cli = parse(&["-d", "0,0,50,50", "-s", "0.5", "--no-grab", "-k", "183"]);
        let config = Config::merge(&cli, file_config);

        assert_eq!(config.device.as_deref(), Some("/dev/input/event1"));
        assert_eq!(config.area.to_string(), "0,0,50,50");
        assert_eq!(config.scale, 0.5);
        assert_eq!(config.mode, OutputMode::Relative);
        assert_eq!(config.side_key, Some(183));
        assert!(!config.grab);
    }

    #[test]
    fn test_bad_area_rejected_by_parser() {
        let result = Cli::try_parse_from(["trackscreen", "-d", "1,2,3", "/dev/input/event0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = Config::merge(&parse(&["dev"]), FileConfig::default());

        let overflow = Config {
            area: Percentages {
                left: 90,
                top: 0,
                width: 20,
                height: 10,
            },
            ..base.clone()
        };
        assert!(matches!(overflow.validate(), Err(ConfigError::AreaOverflow { .. })));

        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let bad = Config { scale, ..base.clone() };
            assert!(matches!(bad.validate(), Err(ConfigError::InvalidScale(_))));
        }

        let empty = Config {
            batch_capacity: 0,
            ..base.clone()
        };
        assert_eq!(empty.validate(), Err(ConfigError::InvalidCapacity));

        let missing = Config {
            device: None,
            ..base
        };
        assert_eq!(missing.validate(), Err(ConfigError::MissingDevice));
    }

    #[test]
    fn test_malformed_config_file_fails_load() {
        let path = std::env::temp_dir().join(format!("trackscreen-load-{}.toml", std::process::id()));
        std::fs::write(&path, "area = \"bottom\"\n").unwrap();
        let cli = parse(&["--config", path.to_str().unwrap(), "dev"]);
        let result = Config::load(&cli);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::FileParse { .. })));
    }

    #[test]
    fn test_explicit_config_file_is_merged() {
        let path = std::env::temp_dir().join(format!("trackscreen-good-{}.toml", std::process::id()));
        std::fs::write(&path, "mode = \"relative\"\nverbose = true\n").unwrap();
        let cli = parse(&["--config", path.to_str().unwrap(), "dev"]);
        let result = Config::load(&cli);
        std::fs::remove_file(&path).unwrap();

        let config = result.unwrap();
        assert_eq!(config.mode, OutputMode::Relative);
        assert!(config.verbose);
        assert_eq!(config.file, Some(path));
    }

    #[test]
    fn test_dump_subcommand() {
        let cli = parse(&["dump", "-n", "Touchscreen"]);
        match cli.command {
            Some(Command::Dump { device, by_name }) => {
                assert_eq!(device, "Touchscreen");
                assert!(by_name);
            }
            None => panic!("expected dump subcommand"),
        }
    }
}
