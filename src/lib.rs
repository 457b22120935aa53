//! Chain Reaction - bouncing balls and expanding explosions
//!
//! Core modules:
//! - `sim`: Simulation core (motion, reflection, explosions, contact, events, snapshots)
//! - `platform`: Clock sources and the browser facade
//! - `persistence`: Versioned save envelope around snapshots
//! - `config`: Simulation configuration

pub mod config;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod sim;

pub use config::SimConfig;
pub use error::{ConfigError, PersistenceError, SnapshotError};
pub use platform::time::{Clock, ManualClock, SystemClock};
pub use sim::{Ball, BallSpec, Commands, Explosion, FrameReport, Simulation, Snapshot, Touch};

/// Engine configuration constants
pub mod consts {
    /// Radius of every ball
    pub const BALL_RADIUS: f32 = 7.0;
    /// Default bounded area
    pub const DEFAULT_WIDTH: f32 = 640.0;
    pub const DEFAULT_HEIGHT: f32 = 480.0;
    /// Randomized default velocity lies in [-max, max) per axis (units/s)
    pub const DEFAULT_MAX_SPEED: f32 = 250.0;
    /// Display color for balls added without one
    pub const DEFAULT_COLOR: &str = "blue";

    /// Time for an explosion to reach its max radius (ms)
    pub const EXPLOSION_GROW_MS: f64 = 1000.0;
    /// Explosions are purged once this old (ms)
    pub const EXPLOSION_LIFETIME_MS: f64 = 2000.0;
    /// Age at which the explosion starts fading out (ms)
    pub const EXPLOSION_FADE_START_MS: f64 = 1800.0;
    /// Opacity before the fade starts
    pub const EXPLOSION_OPACITY: f32 = 0.5;

    /// Triggers closer together than this are candidates for dropping (ms)
    pub const RATE_LIMIT_WINDOW_MS: f64 = 1.0;
    /// ...but only while more than this many explosions are active
    pub const RATE_LIMIT_ACTIVE: usize = 5;
}
