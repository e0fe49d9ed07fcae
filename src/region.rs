//! Mapping of the trackpad area onto the touchscreen's coordinate space.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// Absolute-axis bounds reported by the source device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisBounds {
    pub min: i32,
    pub max: i32,
    pub resolution: i32,
}

impl AxisBounds {
    pub fn new(min: i32, max: i32, resolution: i32) -> Self {
        Self {
            min,
            max,
            resolution,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceBounds {
    pub x: AxisBounds,
    pub y: AxisBounds,
    pub pressure: Option<AxisBounds>,
}

/// Trackpad placement as percentages of the touchscreen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Percentages {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for Percentages {
    /// Bottom-center square of a 3x3 grid.
    fn default() -> Self {
        Self {
            left: 33,
            top: 67,
            width: 33,
            height: 33,
        }
    }
}

impl Percentages {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("left", self.left),
            ("top", self.top),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !(0..=100).contains(&value) {
                return Err(ConfigError::PercentOutOfRange { name, value });
            }
        }

        if self.width <= 0 {
            return Err(ConfigError::EmptyArea { name: "width" });
        }
        if self.height <= 0 {
            return Err(ConfigError::EmptyArea { name: "height" });
        }

        if self.left + self.width > 100 {
            return Err(ConfigError::AreaOverflow {
                offset: "left",
                extent: "width",
                sum: self.left + self.width,
            });
        }
        if self.top + self.height > 100 {
            return Err(ConfigError::AreaOverflow {
                offset: "top",
                extent: "height",
                sum: self.top + self.height,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Percentages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.left, self.top, self.width, self.height)
    }
}

impl FromStr for Percentages {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<i32> = s
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|_| ConfigError::AreaSyntax(s.to_string()))?;

        let &[left, top, width, height] = parts.as_slice() else {
            return Err(ConfigError::AreaSyntax(s.to_string()));
        };

        Ok(Self {
            left,
            top,
            width,
            height,
        })
    }
}

/// Half-open range `[min, max)` on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub min: i32,
    pub max: i32,
}

impl Span {
    pub fn len(&self) -> i32 {
        self.max - self.min
    }

    pub fn contains(&self, value: i32) -> bool {
        value >= self.min && value < self.max
    }

    /// Clamp into `[min, max)` and shift to a zero-based coordinate.
    pub fn clamp_and_shift(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max - 1) - self.min
    }
}

/// The trackpad area in source-device units. Fixed after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub x: Span,
    pub y: Span,
}

impl Rectangle {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x.contains(x) && self.y.contains(y)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X [{} - {}), Y [{} - {})",
            self.x.min, self.x.max, self.y.min, self.y.max
        )
    }
}

pub fn compute_rectangle(
    bounds: &SourceBounds,
    pct: &Percentages,
) -> Result<Rectangle, ConfigError> {
    pct.validate()?;

    Ok(Rectangle {
        x: compute_span('x', &bounds.x, pct.left, pct.width)?,
        y: compute_span('y', &bounds.y, pct.top, pct.height)?,
    })
}

fn compute_span(
    axis: char,
    bounds: &AxisBounds,
    offset_pct: i32,
    extent_pct: i32,
) -> Result<Span, ConfigError> {
    let range = i64::from(bounds.max) - i64::from(bounds.min);
    let min = i64::from(bounds.min) + range * i64::from(offset_pct) / 100;
    let max = min + range * i64::from(extent_pct) / 100;

    if max <= min {
        return Err(ConfigError::CollapsedArea {
            axis,
            range: range.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
        });
    }

    // Both ends stay within [bounds.min, bounds.max] since the percentages sum to at most 100.
    Ok(Span {
        min: min as i32,
        max: max as i32,
    })
}
