//! Ball/explosion contact detection
//!
//! Plain radius-sum overlap test at the frame's positions. There is no
//! sub-stepping, so a fast ball can pass through the rim of an explosion
//! between two frames without being seen.

use std::collections::HashSet;

use super::explosion::ExplosionRegistry;
use super::state::{Ball, Touch};

/// True if a ball of `ball_radius` at `ball` overlaps a circle of `radius` at `center`
#[inline]
pub fn overlaps(ball: glam::Vec2, ball_radius: f32, center: glam::Vec2, radius: f32) -> bool {
    radius + ball_radius > ball.distance(center)
}

/// Collect the balls touched by any active explosion at clock time `now`
///
/// Explosions are checked in trigger order and balls in registry order. A
/// ball is reported at most once, for the first explosion that reaches it.
pub fn detect(
    balls: &[Ball],
    ball_radius: f32,
    explosions: &ExplosionRegistry,
    now: f64,
) -> Vec<Touch> {
    let mut touched = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for explosion in explosions.as_slice() {
        let radius = explosions.radius_of(explosion, now);

        for ball in balls {
            if seen.contains(ball.id.as_str()) {
                continue;
            }
            if overlaps(ball.pos, ball_radius, explosion.pos, radius) {
                seen.insert(ball.id.as_str());
                touched.push(Touch {
                    pos: ball.pos,
                    ball_id: ball.id.clone(),
                });
            }
        }
    }

    touched
}
