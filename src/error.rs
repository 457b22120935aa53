//! Error types
//!
//! Only restore, configuration and save decoding can fail. Listener failures
//! are not errors of the simulation; they are logged and counted per dispatch.

/// Failure restoring a snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::InvalidSnapshot(err.to_string())
    }
}

/// Invalid simulation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Area {width}x{height} cannot hold a ball of radius {radius}")]
    InvalidBounds { width: f32, height: f32, radius: f32 },
    #[error("Invalid explosion timing: grow {grow_ms}ms, lifetime {lifetime_ms}ms")]
    InvalidTiming { grow_ms: f64, lifetime_ms: f64 },
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure decoding a saved game
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Unsupported save version {0}")]
    UnsupportedVersion(u32),
    #[error("Save parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
