//! Simulation entities
//!
//! Everything here is plain owned data: cloning a ball or an explosion gives
//! a copy fully decoupled from the live registries.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A moving circular body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: String,
    pub pos: Vec2,
    /// Units per second
    pub vel: Vec2,
    /// Opaque display attribute, passed through to rendering
    pub color: String,
}

/// Overrides for a new ball; absent fields take the simulation defaults
///
/// Each axis is separate, so `pos_x` alone fixes x and leaves y random.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BallSpec {
    pub id: Option<String>,
    pub pos_x: Option<f32>,
    pub pos_y: Option<f32>,
    pub speed_x: Option<f32>,
    pub speed_y: Option<f32>,
    pub color: Option<String>,
}

impl BallSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn pos(self, x: f32, y: f32) -> Self {
        self.pos_x(x).pos_y(y)
    }

    pub fn pos_x(mut self, x: f32) -> Self {
        self.pos_x = Some(x);
        self
    }

    pub fn pos_y(mut self, y: f32) -> Self {
        self.pos_y = Some(y);
        self
    }

    /// Velocity in units per second
    pub fn vel(self, x: f32, y: f32) -> Self {
        self.speed_x(x).speed_y(y)
    }

    pub fn speed_x(mut self, x: f32) -> Self {
        self.speed_x = Some(x);
        self
    }

    pub fn speed_y(mut self, y: f32) -> Self {
        self.speed_y = Some(y);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A stationary, time-limited expanding detection zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub max_radius: f32,
    /// Simulation time of the trigger (ms)
    pub start: f64,
}

impl Explosion {
    pub fn new(pos: Vec2, max_radius: f32, start: f64) -> Self {
        Self {
            pos,
            max_radius,
            start,
        }
    }

    /// Age at simulation time `now` (ms)
    #[inline]
    pub fn age(&self, now: f64) -> f64 {
        now - self.start
    }

    /// Radius grows linearly over `grow_ms`, then holds at `max_radius`
    pub fn radius_at(&self, now: f64, grow_ms: f64) -> f32 {
        let age = self.age(now).max(0.0);
        if age < grow_ms {
            self.max_radius * (age / grow_ms) as f32
        } else {
            self.max_radius
        }
    }

    /// Display opacity: constant until `fade_start_ms`, then linear to zero at `lifetime_ms`
    pub fn opacity_at(&self, now: f64, fade_start_ms: f64, lifetime_ms: f64) -> f32 {
        use crate::consts::EXPLOSION_OPACITY;

        let age = self.age(now);
        if age < fade_start_ms {
            EXPLOSION_OPACITY
        } else {
            let span = (lifetime_ms - fade_start_ms).max(f64::EPSILON);
            EXPLOSION_OPACITY * ((lifetime_ms - age) / span).clamp(0.0, 1.0) as f32
        }
    }
}

/// Read-only explosion data for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExplosionView {
    pub pos: Vec2,
    pub radius: f32,
    pub opacity: f32,
}

/// A ball found inside an explosion during a frame
#[derive(Debug, Clone, PartialEq)]
pub struct Touch {
    /// Ball position at detection time
    pub pos: Vec2,
    pub ball_id: String,
}
