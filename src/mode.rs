//! Output mode selection.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// What the synthetic device presents to the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Multi-touch trackpad whose coordinate space is the mapped area.
    #[default]
    Passthrough,
    /// Relative pointer driven by finger deltas, with tap-to-click.
    Relative,
}

impl OutputMode {
    pub fn device_name(&self) -> &'static str {
        match self {
            OutputMode::Passthrough => "Trackscreen",
            OutputMode::Relative => "Trackscreen Pointer",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Passthrough => write!(f, "passthrough"),
            OutputMode::Relative => write!(f, "relative"),
        }
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "passthrough" | "trackpad" | "absolute" => Ok(OutputMode::Passthrough),
            "relative" | "mouse" | "pointer" => Ok(OutputMode::Relative),
            _ => Err(format!(
                "Invalid mode '{}'. Valid values: passthrough, relative",
                s
            )),
        }
    }
}
