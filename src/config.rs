//! Simulation configuration
//!
//! Loaded from JSON (or built in code), validated before a simulation is
//! constructed.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Tunable parameters of one simulation instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Bounded area ===
    /// Width of the area (x in [0, width])
    pub width: f32,
    /// Height of the area (y in [0, height])
    pub height: f32,

    // === Balls ===
    /// Radius shared by every ball
    pub ball_radius: f32,
    /// Max absolute speed per axis for randomized default velocities
    pub max_speed: f32,
    /// Color for balls added without one
    pub default_color: String,

    // === Explosions ===
    /// Growth phase duration (ms)
    pub grow_ms: f64,
    /// Total lifetime before purge (ms)
    pub lifetime_ms: f64,
    /// Age where the visual fade begins (ms)
    pub fade_start_ms: f64,
    /// Rate limiter window (ms)
    pub rate_limit_window_ms: f64,
    /// Rate limiter only engages above this many active explosions
    pub rate_limit_active: usize,

    /// RNG seed for default ball placement and ids (None = random)
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,

            ball_radius: BALL_RADIUS,
            max_speed: DEFAULT_MAX_SPEED,
            default_color: DEFAULT_COLOR.to_string(),

            grow_ms: EXPLOSION_GROW_MS,
            lifetime_ms: EXPLOSION_LIFETIME_MS,
            fade_start_ms: EXPLOSION_FADE_START_MS,
            rate_limit_window_ms: RATE_LIMIT_WINDOW_MS,
            rate_limit_active: RATE_LIMIT_ACTIVE,

            seed: None,
        }
    }
}

impl SimConfig {
    /// Default config for an area of the given size
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Builder-style seed override
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that the boundary invariant is satisfiable and timings are sane
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min = 2.0 * self.ball_radius;
        let fits = self.width > min && self.height > min && self.ball_radius >= 0.0;
        if !fits {
            return Err(ConfigError::InvalidBounds {
                width: self.width,
                height: self.height,
                radius: self.ball_radius,
            });
        }
        let timing_ok = self.grow_ms > 0.0 && self.lifetime_ms >= self.grow_ms;
        if !timing_ok {
            return Err(ConfigError::InvalidTiming {
                grow_ms: self.grow_ms,
                lifetime_ms: self.lifetime_ms,
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON config (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = SimConfig::from_json(r#"{ "width": 100, "height": 100 }"#).unwrap();
        assert_eq!(config.width, 100.0);
        assert_eq!(config.ball_radius, BALL_RADIUS);
        assert_eq!(config.default_color, "blue");
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_area_too_small() {
        let config = SimConfig::with_size(14.0, 100.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_bad_timing() {
        let config = SimConfig {
            lifetime_ms: 500.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTiming { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
