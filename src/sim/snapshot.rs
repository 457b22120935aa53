//! Snapshot codec
//!
//! A snapshot is a value copy of the registries plus the clock reading it
//! was taken at. Absolute timestamps mean nothing to another clock, so a
//! restore re-anchors every explosion so its age is the same as when the
//! snapshot was taken.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::state::{Ball, Explosion};
use crate::error::SnapshotError;

/// Full simulation state at one clock reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Clock reading when taken (ms)
    pub now: f64,
    /// Balls in registry order
    pub balls: Vec<Ball>,
    /// Explosions in trigger order
    pub explosions: Vec<Explosion>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a snapshot; missing or mistyped fields are `InvalidSnapshot`
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Reject state that would poison the physics
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let invalid = |msg: String| Err(SnapshotError::InvalidSnapshot(msg));

        if !self.now.is_finite() {
            return invalid(format!("non-finite timestamp {}", self.now));
        }

        let mut ids = HashSet::new();
        for ball in &self.balls {
            if ball.id.is_empty() {
                return invalid("ball with empty id".to_string());
            }
            if !ids.insert(ball.id.as_str()) {
                return invalid(format!("duplicate ball id {:?}", ball.id));
            }
            if !ball.pos.is_finite() || !ball.vel.is_finite() {
                return invalid(format!("ball {:?} has non-finite motion", ball.id));
            }
        }

        for (i, explosion) in self.explosions.iter().enumerate() {
            if !explosion.pos.is_finite() || !explosion.start.is_finite() {
                return invalid(format!("explosion {} has non-finite fields", i));
            }
            if !explosion.max_radius.is_finite() || explosion.max_radius < 0.0 {
                return invalid(format!(
                    "explosion {} has invalid radius {}",
                    i, explosion.max_radius
                ));
            }
        }

        Ok(())
    }

    /// Explosions re-anchored to clock time `now`, ages preserved
    pub fn explosions_at(&self, now: f64) -> Vec<Explosion> {
        self.explosions
            .iter()
            .map(|e| Explosion {
                start: now - (self.now - e.start),
                ..e.clone()
            })
            .collect()
    }
}
