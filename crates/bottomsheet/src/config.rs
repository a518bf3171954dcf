#![forbid(unsafe_code)]

//! Sheet configuration: content-height bounds, dismissal thresholds,
//! backdrop and transition timings.
//!
//! All structs use consuming builders:
//!
//! ```
//! use bottomsheet::config::{DismissTriggers, HeightBounds, SheetConfig};
//!
//! let config = SheetConfig::default()
//!     .content_height_bounds(HeightBounds::new(120.0, 2000.0))
//!     .dismiss_triggers(DismissTriggers::SWIPE_DOWN);
//! assert!(config.validate().is_ok());
//! ```
//!
//! With the `policy-config` feature the same struct can be loaded from TOML
//! or JSON; every loaded config is validated before it is returned.

use std::fmt;
use std::time::Duration;

use bitflags::bitflags;
use bottomsheet_core::{Easing, Rgba};

/// Configuration problems, reported when a sheet is presented.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `min` must be finite, non-negative and strictly below `max`.
    InvalidBounds { min: f64, max: f64 },
    /// A threshold was outside its allowed range.
    InvalidThreshold { name: &'static str, value: f64 },
    /// A geometry value (inset, grabber) was negative or not finite.
    InvalidLength { name: &'static str, value: f64 },
    /// A policy document could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBounds { min, max } => {
                write!(f, "invalid content height bounds [{min}, {max})")
            }
            Self::InvalidThreshold { name, value } => {
                write!(f, "threshold '{name}' out of range: {value}")
            }
            Self::InvalidLength { name, value } => {
                write!(f, "length '{name}' must be finite and >= 0: {value}")
            }
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Accepted range for the content's preferred height: `min <= h < max`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(serde::Serialize, serde::Deserialize))]
pub struct HeightBounds {
    pub min: f64,
    pub max: f64,
}

impl HeightBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `height` is accepted (half-open range, NaN rejected).
    pub fn contains(&self, height: f64) -> bool {
        height >= self.min && height < self.max
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.min.is_finite() && self.min >= 0.0 && self.max > self.min;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidBounds {
                min: self.min,
                max: self.max,
            })
        }
    }
}

impl Default for HeightBounds {
    fn default() -> Self {
        Self::new(200.0, 5000.0)
    }
}

bitflags! {
    /// Which user interactions may start a dismissal.
    ///
    /// Every trigger still goes through the dismissal handler, which can
    /// refuse.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "policy-config", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "policy-config", serde(transparent))]
    pub struct DismissTriggers: u8 {
        /// Tapping the dimmed backdrop above the sheet.
        const BACKDROP_TAP = 1 << 0;
        /// Dragging or flinging the sheet down past the thresholds.
        const SWIPE_DOWN = 1 << 1;
    }
}

impl Default for DismissTriggers {
    fn default() -> Self {
        Self::all()
    }
}

/// Backdrop color and peak opacity.
///
/// The rendered opacity scales with how much of the sheet is visible.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(serde::Serialize, serde::Deserialize))]
pub struct BackdropConfig {
    pub color: Rgba,
    /// Opacity in `[0.0, 1.0]` when the sheet rests fully presented.
    pub opacity: f64,
}

impl BackdropConfig {
    pub fn new(color: Rgba, opacity: f64) -> Self {
        Self { color, opacity }
    }

    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            opacity: 0.4,
        }
    }
}

/// Durations of the non-interactive transitions.
///
/// A zero duration applies the change on the spot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionTimings {
    #[cfg_attr(feature = "policy-config", serde(with = "secs"))]
    pub present: Duration,
    #[cfg_attr(feature = "policy-config", serde(with = "secs"))]
    pub dismiss: Duration,
    #[cfg_attr(feature = "policy-config", serde(with = "secs"))]
    pub snap_back: Duration,
    #[cfg_attr(feature = "policy-config", serde(with = "secs"))]
    pub resize: Duration,
    pub easing: Easing,
}

impl TransitionTimings {
    /// All transitions complete immediately.
    pub fn instant() -> Self {
        Self {
            present: Duration::ZERO,
            dismiss: Duration::ZERO,
            snap_back: Duration::ZERO,
            resize: Duration::ZERO,
            easing: Easing::Linear,
        }
    }
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            present: Duration::from_millis(350),
            dismiss: Duration::from_millis(300),
            snap_back: Duration::from_millis(250),
            resize: Duration::from_millis(250),
            easing: Easing::EaseOutCubic,
        }
    }
}

/// Sheet configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct SheetConfig {
    /// Accepted content heights; requests outside are ignored.
    pub content_height_bounds: HeightBounds,
    /// Minimum gap kept between the container top and the sheet.
    pub top_inset: f64,
    /// Height of the drag handle strip above the content.
    pub grabber_height: f64,
    /// Downward release velocity (points/s) that dismisses regardless of offset.
    pub dismiss_velocity: f64,
    /// Fraction of the sheet height that, dragged past, dismisses on release.
    pub dismiss_fraction: f64,
    pub dismiss_triggers: DismissTriggers,
    pub backdrop: BackdropConfig,
    pub timings: TransitionTimings,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            content_height_bounds: HeightBounds::default(),
            top_inset: 44.0,
            grabber_height: 20.0,
            dismiss_velocity: 1000.0,
            dismiss_fraction: 0.5,
            dismiss_triggers: DismissTriggers::default(),
            backdrop: BackdropConfig::default(),
            timings: TransitionTimings::default(),
        }
    }
}

impl SheetConfig {
    pub fn content_height_bounds(mut self, bounds: HeightBounds) -> Self {
        self.content_height_bounds = bounds;
        self
    }

    pub fn top_inset(mut self, inset: f64) -> Self {
        self.top_inset = inset;
        self
    }

    pub fn grabber_height(mut self, height: f64) -> Self {
        self.grabber_height = height;
        self
    }

    pub fn dismiss_velocity(mut self, velocity: f64) -> Self {
        self.dismiss_velocity = velocity;
        self
    }

    pub fn dismiss_fraction(mut self, fraction: f64) -> Self {
        self.dismiss_fraction = fraction;
        self
    }

    pub fn dismiss_triggers(mut self, triggers: DismissTriggers) -> Self {
        self.dismiss_triggers = triggers;
        self
    }

    pub fn backdrop(mut self, backdrop: BackdropConfig) -> Self {
        self.backdrop = backdrop;
        self
    }

    pub fn timings(mut self, timings: TransitionTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Check every field; the first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.content_height_bounds.validate()?;
        check_length("top_inset", self.top_inset)?;
        check_length("grabber_height", self.grabber_height)?;
        if !(self.dismiss_velocity.is_finite() && self.dismiss_velocity > 0.0) {
            return Err(ConfigError::InvalidThreshold {
                name: "dismiss_velocity",
                value: self.dismiss_velocity,
            });
        }
        if !(self.dismiss_fraction > 0.0 && self.dismiss_fraction <= 1.0) {
            return Err(ConfigError::InvalidThreshold {
                name: "dismiss_fraction",
                value: self.dismiss_fraction,
            });
        }
        if !(0.0..=1.0).contains(&self.backdrop.opacity) {
            return Err(ConfigError::InvalidThreshold {
                name: "backdrop.opacity",
                value: self.backdrop.opacity,
            });
        }
        Ok(())
    }
}

fn check_length(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidLength { name, value })
    }
}

#[cfg(feature = "policy-config")]
impl SheetConfig {
    /// Parse and validate a TOML policy document. Missing keys keep defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON policy document. Missing keys keep defaults.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "policy-config")]
mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
