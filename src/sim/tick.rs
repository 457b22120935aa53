//! Per-frame update
//!
//! One frame runs to completion: integrate and reflect, purge expired
//! explosions, detect contacts, dispatch touches, then apply whatever the
//! listeners queued. The touched set is fixed before any listener runs.

use super::contact;
use super::events::{Commands, DispatchReport};
use super::motion;
use super::simulation::Simulation;
use super::state::Touch;

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Frame counter (1-based)
    pub frame: u64,
    /// Simulation time at the end of the frame (ms)
    pub now: f64,
    /// Elapsed time integrated this frame (ms)
    pub elapsed_ms: f64,
    /// Balls that bounced off a wall
    pub bounced: usize,
    /// Explosions purged this frame
    pub expired: usize,
    /// Touched balls, in detection order
    pub touched: Vec<Touch>,
    /// Touch listener calls and failures
    pub dispatch: DispatchReport,
    /// Listener commands applied after dispatch
    pub commands: usize,
}

impl Simulation {
    /// Advance the simulation by `elapsed_ms`
    ///
    /// Moves the balls and the simulation time together, so explosions age
    /// by exactly the elapsed time. Negative or non-finite elapsed times
    /// change nothing but the frame counter.
    pub fn advance(&mut self, elapsed_ms: f64) -> FrameReport {
        let elapsed_ms = if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            elapsed_ms
        } else {
            if elapsed_ms != 0.0 {
                log::warn!("Ignoring invalid frame delta {}ms", elapsed_ms);
            }
            0.0
        };
        self.time_ms += elapsed_ms;
        let now = self.time_ms;
        self.frame += 1;

        let dt = (elapsed_ms / 1000.0) as f32;
        let bounced = motion::integrate(&mut self.balls, dt, &self.bounds);

        let expired = self.explosions.purge_expired(now);

        let touched = contact::detect(&self.balls, self.config.ball_radius, &self.explosions, now);

        let mut commands = Commands::new();
        let dispatch = self.dispatcher.dispatch_touches(&touched, &mut commands);
        let applied = self.apply_commands(commands.take());

        log::trace!(
            "Frame {}: {} balls, {} explosions, {} touched, {} bounced",
            self.frame,
            self.balls.len(),
            self.explosions.len(),
            touched.len(),
            bounced
        );

        FrameReport {
            frame: self.frame,
            now,
            elapsed_ms,
            bounced,
            expired,
            touched,
            dispatch,
            commands: applied,
        }
    }

    /// Driver entry point: advance by the clock time since the previous tick
    ///
    /// The first tick advances nothing. A clock that steps backwards is
    /// treated like any other invalid delta.
    pub fn tick(&mut self) -> FrameReport {
        let now = self.clock.now_ms();
        let elapsed = self.last_tick.map_or(0.0, |last| now - last);
        self.last_tick = Some(now);
        self.advance(elapsed)
    }
}
