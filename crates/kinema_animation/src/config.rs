//! Animation configuration
//!
//! [`AnimeConfig`] mirrors the configuration object accepted by the engine.
//! Every field is optional; missing fields take the documented defaults. The
//! struct deserializes from camelCase JSON so configs can live in data files.
//!
//! ```ignore
//! let config = AnimeConfig::from_json(r##"{
//!     "duration": 800,
//!     "easing": "easeOutQuad",
//!     "loop": 3,
//!     "dataProgress": { "x": [0, 100], "color": ["#000", "#fff"] }
//! }"##)?;
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::{AnimeError, Result};
use crate::tween::TweenTiming;
use crate::value::KeyframeValue;

pub const DEFAULT_DURATION_MS: f64 = 1000.0;
pub const DEFAULT_ELASTICITY: f64 = 500.0;
pub const DEFAULT_EASING: &str = "easeOutElastic";

/// Playback direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Normal,
    /// Start reversed
    Reverse,
    /// Flip direction at every loop boundary
    Alternate,
}

/// Loop setting: `false`, `true` (forever) or a total cycle count
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Loop {
    Forever(bool),
    Count(u32),
}

impl Default for Loop {
    fn default() -> Self {
        Loop::Forever(false)
    }
}

impl Loop {
    pub fn once() -> Self {
        Loop::Forever(false)
    }

    pub fn infinite() -> Self {
        Loop::Forever(true)
    }

    pub fn times(count: u32) -> Self {
        Loop::Count(count)
    }
}

/// Configuration for one animation instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimeConfig {
    /// Length of the keyframe sequence in milliseconds
    pub duration: f64,
    /// Lead-in before the first tween starts
    pub delay: f64,
    /// Hold after the last tween ends
    pub end_delay: f64,
    /// Catalog easing name
    pub easing: String,
    /// Raw elasticity in 1..=999, normalized by [`AnimeConfig::normalized_elasticity`]
    pub elasticity: f64,
    pub direction: Direction,
    #[serde(rename = "loop")]
    pub looping: Loop,
    /// Playback rate multiplier
    pub speed: f64,
    /// Add to the scheduler's active set as soon as the instance is registered
    pub auto_play: bool,
    /// Snap factor for interpolated components; 0 disables rounding
    pub round: f64,
    /// Keyframes per property, in declaration order
    pub data_progress: IndexMap<String, Vec<KeyframeValue>>,
}

impl Default for AnimeConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION_MS,
            delay: 0.0,
            end_delay: 0.0,
            easing: DEFAULT_EASING.to_string(),
            elasticity: DEFAULT_ELASTICITY,
            direction: Direction::Normal,
            looping: Loop::default(),
            speed: 1.0,
            auto_play: true,
            round: 0.0,
            data_progress: IndexMap::new(),
        }
    }
}

impl AnimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder: set duration in milliseconds
    pub fn duration(mut self, duration_ms: f64) -> Self {
        self.duration = duration_ms;
        self
    }

    /// Builder: set delay in milliseconds
    pub fn delay(mut self, delay_ms: f64) -> Self {
        self.delay = delay_ms;
        self
    }

    /// Builder: set end delay in milliseconds
    pub fn end_delay(mut self, end_delay_ms: f64) -> Self {
        self.end_delay = end_delay_ms;
        self
    }

    /// Builder: set the catalog easing name
    pub fn easing(mut self, name: impl Into<String>) -> Self {
        self.easing = name.into();
        self
    }

    /// Builder: set raw elasticity (1..=999)
    pub fn elasticity(mut self, elasticity: f64) -> Self {
        self.elasticity = elasticity;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn looping(mut self, looping: Loop) -> Self {
        self.looping = looping;
        self
    }

    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn auto_play(mut self, auto_play: bool) -> Self {
        self.auto_play = auto_play;
        self
    }

    pub fn round(mut self, round: f64) -> Self {
        self.round = round;
        self
    }

    /// Builder: add a property with its keyframes
    pub fn property<K, V>(mut self, key: K, values: impl IntoIterator<Item = V>) -> Self
    where
        K: Into<String>,
        V: Into<KeyframeValue>,
    {
        self.data_progress
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Elasticity mapped into (0, 1): `(1000 - clamp(raw, 1, 999)) / 1000`
    pub fn normalized_elasticity(&self) -> f64 {
        let raw = if self.elasticity.is_finite() {
            self.elasticity
        } else {
            DEFAULT_ELASTICITY
        };
        (1000.0 - raw.clamp(1.0, 999.0)) / 1000.0
    }

    /// Resolve the easing name against the catalog
    pub fn resolve_easing(&self) -> Result<Easing> {
        Easing::from_name(&self.easing)
    }

    pub fn timing(&self) -> TweenTiming {
        TweenTiming {
            duration: self.duration,
            delay: self.delay,
            end_delay: self.end_delay,
        }
    }

    /// Check timing and playback settings
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("duration", self.duration),
            ("delay", self.delay),
            ("endDelay", self.end_delay),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnimeError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number of milliseconds (got {value})"
                )));
            }
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(AnimeError::InvalidConfig(format!(
                "speed must be positive (got {})",
                self.speed
            )));
        }
        if !self.round.is_finite() || self.round < 0.0 {
            return Err(AnimeError::InvalidConfig(format!(
                "round must be zero or positive (got {})",
                self.round
            )));
        }
        if self.looping == Loop::Count(0) {
            return Err(AnimeError::InvalidConfig(
                "loop count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnimeConfig::default();
        assert_eq!(config.duration, 1000.0);
        assert_eq!(config.delay, 0.0);
        assert_eq!(config.end_delay, 0.0);
        assert_eq!(config.easing, "easeOutElastic");
        assert_eq!(config.direction, Direction::Normal);
        assert_eq!(config.looping, Loop::Forever(false));
        assert_eq!(config.speed, 1.0);
        assert!(config.auto_play);
        assert!((config.normalized_elasticity() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_elasticity_normalization_clamps() {
        let config = AnimeConfig::new().elasticity(1000.0);
        assert!((config.normalized_elasticity() - 0.001).abs() < 1e-12);
        let config = AnimeConfig::new().elasticity(0.0);
        assert!((config.normalized_elasticity() - 0.999).abs() < 1e-12);
        let config = AnimeConfig::new().elasticity(f64::NAN);
        assert!((config.normalized_elasticity() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_from_json() {
        let config = AnimeConfig::from_json(
            r##"{
                "duration": 800,
                "endDelay": 20,
                "easing": "linear",
                "direction": "alternate",
                "loop": 3,
                "autoPlay": false,
                "dataProgress": { "y": [0, 10], "x": [1, 2], "fill": ["#000", "#fff"] }
            }"##,
        )
        .unwrap();
        assert_eq!(config.duration, 800.0);
        assert_eq!(config.end_delay, 20.0);
        assert_eq!(config.direction, Direction::Alternate);
        assert_eq!(config.looping, Loop::Count(3));
        assert!(!config.auto_play);
        let keys: Vec<&str> = config.data_progress.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["y", "x", "fill"]);
    }

    #[test]
    fn test_loop_accepts_bool() {
        let config = AnimeConfig::from_json(r#"{ "loop": true }"#).unwrap();
        assert_eq!(config.looping, Loop::infinite());
    }

    #[test]
    fn test_bad_json_is_reported() {
        let err = AnimeConfig::from_json(r#"{ "direction": "sideways" }"#).unwrap_err();
        assert!(matches!(err, AnimeError::Json(_)));
    }

    #[test]
    fn test_validate() {
        assert!(AnimeConfig::new().validate().is_ok());
        assert!(AnimeConfig::new().speed(0.0).validate().is_err());
        assert!(AnimeConfig::new().duration(-1.0).validate().is_err());
        assert!(AnimeConfig::new().delay(f64::INFINITY).validate().is_err());
        assert!(AnimeConfig::new().looping(Loop::times(0)).validate().is_err());
    }

    #[test]
    fn test_property_builder_keeps_order() {
        let config = AnimeConfig::new()
            .property("b", [0.0, 1.0])
            .property("a", ["#000", "#fff"]);
        let keys: Vec<&str> = config.data_progress.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
