//! Motion integration and boundary reflection
//!
//! Balls move in a straight line each frame and bounce elastically off the
//! edges of the area. Reflection mirrors the overshoot back inside instead of
//! clamping, so a ball that crossed a wall mid-frame ends up where it would
//! have been had it bounced exactly at the wall.

use glam::Vec2;

use super::state::Ball;

/// Valid range for ball centers: `[radius, dimension - radius]` on each axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn for_area(width: f32, height: f32, radius: f32) -> Self {
        Self {
            min: Vec2::splat(radius),
            max: Vec2::new(width - radius, height - radius),
        }
    }

    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }
}

/// Reflect one axis back into `[lo, hi]`
///
/// Returns the corrected position and velocity. A single crossing is the
/// plain mirror `2*lo - pos` / `2*hi - pos` with the velocity negated.
/// An overshoot longer than the whole span (huge frame gaps) is folded
/// back as many times as needed, flipping velocity once per bounce.
pub fn reflect_axis(pos: f32, vel: f32, lo: f32, hi: f32) -> (f32, f32) {
    let (pos, vel) = if pos < lo {
        (2.0 * lo - pos, -vel)
    } else if pos > hi {
        (2.0 * hi - pos, -vel)
    } else {
        return (pos, vel);
    };

    if pos >= lo && pos <= hi {
        return (pos, vel);
    }
    fold_axis(pos, vel, lo, hi)
}

/// Triangle-wave fold for overshoots spanning multiple bounces
fn fold_axis(pos: f32, vel: f32, lo: f32, hi: f32) -> (f32, f32) {
    let span = hi - lo;
    if span <= 0.0 || !pos.is_finite() {
        return ((lo + hi) / 2.0, vel);
    }

    let t = pos - lo;
    let bounces = (t / span).floor();
    let rem = t - bounces * span;
    let odd = (bounces as i64).rem_euclid(2) == 1;

    let pos = if odd { hi - rem } else { lo + rem };
    let vel = if odd { -vel } else { vel };
    (pos.clamp(lo, hi), vel)
}

/// Reflect a ball on both axes independently; true if it bounced
pub fn reflect(ball: &mut Ball, bounds: &Bounds) -> bool {
    let before = ball.vel;
    let (x, vx) = reflect_axis(ball.pos.x, ball.vel.x, bounds.min.x, bounds.max.x);
    let (y, vy) = reflect_axis(ball.pos.y, ball.vel.y, bounds.min.y, bounds.max.y);
    ball.pos = Vec2::new(x, y);
    ball.vel = Vec2::new(vx, vy);
    ball.vel != before
}

/// Advance every ball by `dt` seconds, then resolve boundary crossings
pub fn integrate(balls: &mut [Ball], dt: f32, bounds: &Bounds) -> usize {
    let mut bounced = 0;
    for ball in balls.iter_mut() {
        ball.pos += ball.vel * dt;
        if reflect(ball, bounds) {
            bounced += 1;
        }
    }
    bounced
}
