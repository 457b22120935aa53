//! Explosion registry: triggering, rate limiting and expiry

use glam::Vec2;

use super::state::{Explosion, ExplosionView};
use crate::config::SimConfig;

/// Timing rules shared by every explosion of a simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionTiming {
    pub grow_ms: f64,
    pub lifetime_ms: f64,
    pub fade_start_ms: f64,
    pub rate_limit_window_ms: f64,
    pub rate_limit_active: usize,
}

impl From<&SimConfig> for ExplosionTiming {
    fn from(config: &SimConfig) -> Self {
        Self {
            grow_ms: config.grow_ms,
            lifetime_ms: config.lifetime_ms,
            fade_start_ms: config.fade_start_ms,
            rate_limit_window_ms: config.rate_limit_window_ms,
            rate_limit_active: config.rate_limit_active,
        }
    }
}

/// Ordered collection of active explosions (trigger order)
#[derive(Debug, Clone)]
pub struct ExplosionRegistry {
    timing: ExplosionTiming,
    explosions: Vec<Explosion>,
    /// Simulation time of the last accepted trigger
    last_trigger: Option<f64>,
}

impl ExplosionRegistry {
    pub fn new(timing: ExplosionTiming) -> Self {
        Self {
            timing,
            explosions: Vec::new(),
            last_trigger: None,
        }
    }

    /// Start an explosion at simulation time `now`
    ///
    /// Dropped (returns false) when the previous trigger was less than one
    /// rate-limit window ago while more than `rate_limit_active` explosions
    /// are already running. A non-finite position or a radius that is not a
    /// finite non-negative number is dropped too, without touching the limiter.
    pub fn trigger(&mut self, pos: Vec2, max_radius: f32, now: f64) -> bool {
        if !pos.is_finite() || !max_radius.is_finite() || max_radius < 0.0 {
            log::debug!(
                "Explosion at ({}, {}) with radius {} dropped: invalid input",
                pos.x,
                pos.y,
                max_radius
            );
            return false;
        }

        let recent = self
            .last_trigger
            .is_some_and(|last| now - last < self.timing.rate_limit_window_ms);
        if recent && self.explosions.len() > self.timing.rate_limit_active {
            log::debug!(
                "Explosion at ({:.1}, {:.1}) dropped: {} active",
                pos.x,
                pos.y,
                self.explosions.len()
            );
            return false;
        }

        self.explosions.push(Explosion::new(pos, max_radius, now));
        self.last_trigger = Some(now);
        true
    }

    /// Remove explosions whose age reached the lifetime; returns how many
    pub fn purge_expired(&mut self, now: f64) -> usize {
        let before = self.explosions.len();
        let lifetime = self.timing.lifetime_ms;
        self.explosions.retain(|e| e.age(now) < lifetime);
        before - self.explosions.len()
    }

    /// Current radius of an explosion under this registry's timing
    #[inline]
    pub fn radius_of(&self, explosion: &Explosion, now: f64) -> f32 {
        explosion.radius_at(now, self.timing.grow_ms)
    }

    /// Render data for every active explosion
    pub fn views(&self, now: f64) -> impl Iterator<Item = ExplosionView> + '_ {
        self.explosions.iter().map(move |e| ExplosionView {
            pos: e.pos,
            radius: self.radius_of(e, now),
            opacity: e.opacity_at(now, self.timing.fade_start_ms, self.timing.lifetime_ms),
        })
    }

    pub fn as_slice(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn len(&self) -> usize {
        self.explosions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explosions.is_empty()
    }

    /// Replace the contents (snapshot restore); the rate limiter state is kept
    pub fn replace(&mut self, explosions: Vec<Explosion>) {
        self.explosions = explosions;
    }

    pub fn clear(&mut self) {
        self.explosions.clear();
    }
}
