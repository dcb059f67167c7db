#![forbid(unsafe_code)]

//! Tunable timings and placement parameters for the tour engine.
//!
//! Every field defaults to the engine's built-in behavior, so
//! `TourConfig::default()` needs no file at all. Hosts that want to retune
//! pacing load a partial file; missing keys keep their defaults.
//!
//! ```toml
//! # wayfinder.toml
//! [timing]
//! wait_cap_ms = 1000
//! auto_skip_grace_ms = 1000
//!
//! [placement]
//! padding = 16
//! arrow_size = 8
//! ```
//!
//! ```rust,ignore
//! let config = TourConfig::from_toml_file("wayfinder.toml")?;
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wayfinder_core::Size;

use crate::placement::TooltipPlacer;

/// Hard ceiling for any `wait` action, whatever the config or step requests.
pub const MAX_WAIT_MS: u64 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    pub timing: TimingConfig,
    pub placement: PlacementConfig,
}

/// Durations, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause before and after a synthetic click while the target shows as pressed.
    pub press_delay_ms: u64,
    /// How long the surface stays dimmed around a navigation.
    pub navigate_dim_ms: u64,
    /// Settle time after scrolling an action target into view.
    pub scroll_settle_ms: u64,
    /// Ceiling for `wait` actions regardless of the requested time.
    pub wait_cap_ms: u64,
    /// Wait used when a `wait` step has no `waitTime`.
    pub default_wait_ms: u64,
    /// Grace period before an unresolvable skip-eligible step is skipped.
    pub auto_skip_grace_ms: u64,
    /// Entrance and exit dim when a tour starts, completes, or is skipped.
    pub transition_dim_ms: u64,
    pub resize_throttle_ms: u64,
    pub scroll_throttle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            press_delay_ms: 100,
            navigate_dim_ms: 150,
            scroll_settle_ms: 200,
            wait_cap_ms: 1000,
            default_wait_ms: 1000,
            auto_skip_grace_ms: 1000,
            transition_dim_ms: 150,
            resize_throttle_ms: 100,
            scroll_throttle_ms: 50,
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub fn press_delay(&self) -> Duration {
        Duration::from_millis(self.press_delay_ms)
    }

    #[must_use]
    pub fn navigate_dim(&self) -> Duration {
        Duration::from_millis(self.navigate_dim_ms)
    }

    #[must_use]
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    /// Effective pause for a `wait` step that requested `requested` ms.
    #[must_use]
    pub fn capped_wait(&self, requested: Option<u64>) -> Duration {
        let millis = requested.unwrap_or(self.default_wait_ms);
        Duration::from_millis(millis.min(self.wait_cap_ms).min(MAX_WAIT_MS))
    }

    #[must_use]
    pub fn auto_skip_grace(&self) -> Duration {
        Duration::from_millis(self.auto_skip_grace_ms)
    }

    #[must_use]
    pub fn transition_dim(&self) -> Duration {
        Duration::from_millis(self.transition_dim_ms)
    }

    #[must_use]
    pub fn resize_throttle(&self) -> Duration {
        Duration::from_millis(self.resize_throttle_ms)
    }

    #[must_use]
    pub fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub padding: i32,
    pub arrow_size: i32,
    /// Tooltip size assumed until the host reports a measured one.
    pub tooltip_width: i32,
    pub tooltip_height: i32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            padding: 16,
            arrow_size: 8,
            tooltip_width: 320,
            tooltip_height: 180,
        }
    }
}

impl PlacementConfig {
    #[must_use]
    pub fn placer(&self) -> TooltipPlacer {
        TooltipPlacer::new(self.padding, self.arrow_size)
    }

    #[must_use]
    pub fn tooltip_size(&self) -> Size {
        Size::new(self.tooltip_width, self.tooltip_height)
    }
}

impl TourConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let timing = &self.timing;
        let placement = &self.placement;

        if timing.wait_cap_ms == 0 || timing.wait_cap_ms > MAX_WAIT_MS {
            errors.push(format!(
                "timing.wait_cap_ms must be in 1..={MAX_WAIT_MS}, got {}",
                timing.wait_cap_ms
            ));
        }
        // A zero grace turns an unresolvable chain of steps into a tight loop.
        if timing.auto_skip_grace_ms == 0 {
            errors.push("timing.auto_skip_grace_ms must be > 0".into());
        }
        if placement.padding < 0 {
            errors.push(format!(
                "placement.padding must be >= 0, got {}",
                placement.padding
            ));
        }
        if placement.arrow_size < 0 {
            errors.push(format!(
                "placement.arrow_size must be >= 0, got {}",
                placement.arrow_size
            ));
        }
        if placement.tooltip_width <= 0 || placement.tooltip_height <= 0 {
            errors.push(format!(
                "placement tooltip size must be positive, got {}x{}",
                placement.tooltip_width, placement.tooltip_height
            ));
        }

        errors
    }

    /// Replace every out-of-range value with its default.
    ///
    /// Used for configs built in code, which never pass through the loaders.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let timing = TimingConfig::default();
        let placement = PlacementConfig::default();

        if self.timing.wait_cap_ms == 0 || self.timing.wait_cap_ms > MAX_WAIT_MS {
            replaced("timing.wait_cap_ms", self.timing.wait_cap_ms);
            self.timing.wait_cap_ms = timing.wait_cap_ms;
        }
        if self.timing.auto_skip_grace_ms == 0 {
            replaced("timing.auto_skip_grace_ms", 0);
            self.timing.auto_skip_grace_ms = timing.auto_skip_grace_ms;
        }
        if self.placement.padding < 0 {
            replaced("placement.padding", self.placement.padding);
            self.placement.padding = placement.padding;
        }
        if self.placement.arrow_size < 0 {
            replaced("placement.arrow_size", self.placement.arrow_size);
            self.placement.arrow_size = placement.arrow_size;
        }
        if self.placement.tooltip_width <= 0 || self.placement.tooltip_height <= 0 {
            replaced("placement.tooltip_width", self.placement.tooltip_width);
            replaced("placement.tooltip_height", self.placement.tooltip_height);
            self.placement.tooltip_width = placement.tooltip_width;
            self.placement.tooltip_height = placement.tooltip_height;
        }
        self
    }

    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

fn replaced(field: &str, value: impl std::fmt::Display) {
    tracing::warn!(field, %value, "out-of-range config value replaced with default");
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
