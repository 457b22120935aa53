//! The simulation instance
//!
//! Owns the ball and explosion registries, the listener lists, the clock and
//! the RNG. Simulation time is its own: only `advance` moves it, and the clock
//! just feeds `tick` its deltas. Several independent simulations can coexist;
//! there is no global state.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::events::{Command, Commands, DispatchReport, Dispatcher, ListenerId};
use super::explosion::{ExplosionRegistry, ExplosionTiming};
use super::motion::Bounds;
use super::snapshot::Snapshot;
use super::state::{Ball, BallSpec, Explosion, ExplosionView, Touch};
use crate::config::SimConfig;
use crate::error::{ConfigError, SnapshotError};
use crate::platform::time::{Clock, SystemClock};

/// A bounded area of bouncing balls and expanding explosions
pub struct Simulation {
    pub(super) config: SimConfig,
    pub(super) bounds: Bounds,
    pub(super) clock: Box<dyn Clock>,
    rng: Pcg32,
    pub(super) balls: Vec<Ball>,
    pub(super) explosions: ExplosionRegistry,
    pub(super) dispatcher: Dispatcher,
    /// Simulation time (ms); explosion ages and snapshots are anchored to it
    pub(super) time_ms: f64,
    /// Clock reading of the previous `tick`
    pub(super) last_tick: Option<f64>,
    pub(super) frame: u64,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("balls", &self.balls.len())
            .field("explosions", &self.explosions.len())
            .field("dispatcher", &self.dispatcher)
            .field("time_ms", &self.time_ms)
            .field("frame", &self.frame)
            .finish()
    }
}

impl Simulation {
    /// Create a simulation driven by the system clock
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Box::new(SystemClock::new()))
    }

    /// Create a simulation reading time from `clock`
    pub fn with_clock(config: SimConfig, clock: Box<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!(
            "Simulation {}x{} created (seed {})",
            config.width,
            config.height,
            seed
        );

        Ok(Self {
            bounds: Bounds::for_area(config.width, config.height, config.ball_radius),
            explosions: ExplosionRegistry::new(ExplosionTiming::from(&config)),
            config,
            clock,
            rng: Pcg32::seed_from_u64(seed),
            balls: Vec::new(),
            dispatcher: Dispatcher::new(),
            time_ms: 0.0,
            last_tick: None,
            frame: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Simulation time (ms): the sum of every frame's elapsed time
    pub fn now_ms(&self) -> f64 {
        self.time_ms
    }

    // === Body registry ===

    /// Add a ball, filling unset fields with defaults; returns its id
    ///
    /// Each axis defaults on its own. An empty id or a non-finite coordinate
    /// counts as unset. An existing ball with the same id is replaced in
    /// place.
    pub fn add_ball(&mut self, spec: BallSpec) -> String {
        let id = match spec.id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => self.generate_id(),
        };
        let (min, max) = (self.bounds.min, self.bounds.max);
        let pos = Vec2::new(
            self.axis_or(spec.pos_x, |rng| random_between(rng, min.x, max.x)),
            self.axis_or(spec.pos_y, |rng| random_between(rng, min.y, max.y)),
        );
        let max_speed = self.config.max_speed;
        let vel = Vec2::new(
            self.axis_or(spec.speed_x, |rng| random_speed(rng, max_speed)),
            self.axis_or(spec.speed_y, |rng| random_speed(rng, max_speed)),
        );
        let ball = Ball {
            id: id.clone(),
            pos,
            vel,
            color: spec.color.unwrap_or_else(|| self.config.default_color.clone()),
        };

        match self.balls.iter().position(|b| b.id == id) {
            Some(index) => self.balls[index] = ball,
            None => self.balls.push(ball),
        }
        id
    }

    /// Remove a ball by id; `None` if there was none
    pub fn remove_ball(&mut self, id: &str) -> Option<Ball> {
        let index = self.balls.iter().position(|b| b.id == id)?;
        Some(self.balls.remove(index))
    }

    pub fn ball(&self, id: &str) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    /// Balls in registry order
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn ball_count(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// Random 64-bit token as hex, unique within this simulation
    fn generate_id(&mut self) -> String {
        loop {
            let id = format!("{:016x}", self.rng.random::<u64>());
            if self.ball(&id).is_none() {
                return id;
            }
        }
    }

    fn axis_or(&mut self, value: Option<f32>, default: impl FnOnce(&mut Pcg32) -> f32) -> f32 {
        match value {
            Some(v) if v.is_finite() => v,
            Some(v) => {
                log::debug!("Ignoring non-finite ball coordinate {}", v);
                default(&mut self.rng)
            }
            None => default(&mut self.rng),
        }
    }

    // === Explosion registry ===

    /// Trigger an explosion at the current simulation time
    ///
    /// False if rate-limited, or if the position is not finite or the radius
    /// is not a finite non-negative number.
    pub fn explode(&mut self, x: f32, y: f32, max_radius: f32) -> bool {
        self.explosions.trigger(Vec2::new(x, y), max_radius, self.time_ms)
    }

    /// Explosions in trigger order
    pub fn explosions(&self) -> &[Explosion] {
        self.explosions.as_slice()
    }

    pub fn explosion_count(&self) -> usize {
        self.explosions.len()
    }

    /// Current radius of an explosion
    pub fn explosion_radius(&self, explosion: &Explosion) -> f32 {
        self.explosions.radius_of(explosion, self.time_ms)
    }

    /// Position, radius and opacity of each explosion for drawing
    pub fn render_explosions(&self) -> Vec<ExplosionView> {
        self.explosions.views(self.time_ms).collect()
    }

    // === Events ===

    /// Register a click listener
    pub fn on_click<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(Vec2, &mut Commands) -> anyhow::Result<()> + 'static,
    {
        self.dispatcher.on_click(listener)
    }

    /// Register a listener called once per touched ball per frame
    pub fn on_touch_explosion<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Touch, &mut Commands) -> anyhow::Result<()> + 'static,
    {
        self.dispatcher.on_touch(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.dispatcher.remove(id)
    }

    /// Route a canvas-relative click to the click listeners
    pub fn click(&mut self, x: f32, y: f32) -> DispatchReport {
        let mut commands = Commands::new();
        let report = self.dispatcher.dispatch_click(Vec2::new(x, y), &mut commands);
        self.apply_commands(commands.take());
        report
    }

    /// Apply listener commands in order; returns how many ran
    pub(super) fn apply_commands(&mut self, commands: Vec<Command>) -> usize {
        let count = commands.len();
        for command in commands {
            match command {
                Command::Explode { pos, max_radius } => {
                    self.explode(pos.x, pos.y, max_radius);
                }
                Command::AddBall(spec) => {
                    self.add_ball(spec);
                }
                Command::RemoveBall(id) => {
                    self.remove_ball(&id);
                }
            }
        }
        count
    }

    // === Snapshots ===

    /// Value copy of the whole state at the current simulation time
    pub fn serialize(&self) -> Snapshot {
        Snapshot {
            now: self.time_ms,
            balls: self.balls.clone(),
            explosions: self.explosions.as_slice().to_vec(),
        }
    }

    /// Restore a snapshot, preserving each explosion's age
    ///
    /// State is left untouched when the snapshot is invalid.
    pub fn deserialize(&mut self, snapshot: Snapshot) -> Result<(), SnapshotError> {
        snapshot.validate()?;

        let now = self.time_ms;
        let explosions = snapshot.explosions_at(now);
        log::debug!(
            "Restored {} balls, {} explosions (snapshot taken at {:.1}ms, now {:.1}ms)",
            snapshot.balls.len(),
            explosions.len(),
            snapshot.now,
            now
        );

        self.balls = snapshot.balls;
        self.explosions.replace(explosions);
        Ok(())
    }

    /// Remove every ball and explosion
    pub fn reset(&mut self) {
        self.balls.clear();
        self.explosions.clear();
    }
}

/// Uniform in `[min, max]`
fn random_between(rng: &mut Pcg32, min: f32, max: f32) -> f32 {
    min + (max - min) * rng.random::<f32>()
}

fn random_speed(rng: &mut Pcg32, max: f32) -> f32 {
    if max <= 0.0 {
        return 0.0;
    }
    rng.random_range(-max..max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::time::ManualClock;

    fn sim() -> (Simulation, ManualClock) {
        let clock = ManualClock::new(0.0);
        let config = SimConfig::with_size(100.0, 100.0).seeded(7);
        let sim = Simulation::with_clock(config, Box::new(clock.clone())).unwrap();
        (sim, clock)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimConfig::with_size(10.0, 10.0);
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_add_ball_defaults() {
        let (mut sim, _) = sim();
        let id = sim.add_ball(BallSpec::new());
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

        let ball = sim.ball(&id).unwrap();
        assert_eq!(ball.color, "blue");
        assert!(sim.bounds().contains(ball.pos));
        assert!(ball.vel.x >= -250.0 && ball.vel.x < 250.0);
        assert!(ball.vel.y >= -250.0 && ball.vel.y < 250.0);
    }

    #[test]
    fn test_add_ball_overrides() {
        let (mut sim, _) = sim();
        let id = sim.add_ball(BallSpec::new().id("x").pos(20.0, 30.0).color("red"));
        assert_eq!(id, "x");
        let ball = sim.ball("x").unwrap();
        assert_eq!(ball.pos, Vec2::new(20.0, 30.0));
        assert_eq!(ball.color, "red");
    }

    #[test]
    fn test_single_axis_override() {
        let (mut sim, _) = sim();
        for _ in 0..50 {
            let id = sim.add_ball(BallSpec::new().pos_x(10.0).speed_y(-3.0));
            let ball = sim.ball(&id).unwrap();
            assert_eq!(ball.pos.x, 10.0);
            assert_eq!(ball.vel.y, -3.0);
            assert!(ball.pos.y >= 7.0 && ball.pos.y <= 93.0);
            assert!(ball.vel.x >= -250.0 && ball.vel.x < 250.0);
        }
        let ys: Vec<f32> = sim.balls().iter().map(|b| b.pos.y).collect();
        assert!(ys.iter().any(|&y| y != ys[0]));
    }

    #[test]
    fn test_empty_id_generates_one() {
        let (mut sim, _) = sim();
        let id = sim.add_ball(BallSpec::new().id(""));
        assert_eq!(id.len(), 16);
        assert!(sim.ball("").is_none());
    }

    #[test]
    fn test_non_finite_coordinates_default() {
        let (mut sim, _) = sim();
        let id = sim.add_ball(BallSpec::new().pos(f32::NAN, 40.0).vel(f32::INFINITY, 1.0));
        let ball = sim.ball(&id).unwrap();
        assert!(sim.bounds().contains(ball.pos));
        assert_eq!(ball.pos.y, 40.0);
        assert!(ball.vel.x.is_finite());
        assert_eq!(ball.vel.y, 1.0);
    }

    #[test]
    fn test_explode_rejects_bad_input() {
        let (mut sim, _) = sim();
        assert!(!sim.explode(50.0, 50.0, -5.0));
        assert!(!sim.explode(50.0, 50.0, f32::NAN));
        assert!(!sim.explode(50.0, 50.0, f32::INFINITY));
        assert!(!sim.explode(f32::NAN, 50.0, 10.0));
        assert!(!sim.explode(50.0, f32::NEG_INFINITY, 10.0));
        assert_eq!(sim.explosion_count(), 0);
        assert!(sim.explode(50.0, 50.0, 0.0));
    }

    #[test]
    fn test_edge_case_state_round_trips() {
        let (mut sim, _) = sim();
        sim.add_ball(BallSpec::new().id("").pos(50.0, 50.0));
        sim.add_ball(BallSpec::new().pos(f32::NAN, f32::NAN));
        sim.explode(50.0, 50.0, -5.0);
        sim.explode(50.0, 50.0, f32::NAN);
        sim.explode(50.0, 50.0, 0.0);
        sim.advance(120.0);

        let before = sim.serialize();
        sim.deserialize(before.clone()).unwrap();
        assert_eq!(sim.serialize(), before);

        let json = before.to_json().unwrap();
        assert_eq!(Snapshot::from_json(&json).unwrap(), before);
    }

    #[test]
    fn test_add_existing_id_replaces_in_place() {
        let (mut sim, _) = sim();
        sim.add_ball(BallSpec::new().id("a"));
        sim.add_ball(BallSpec::new().id("b"));
        sim.add_ball(BallSpec::new().id("a").color("green"));
        assert_eq!(sim.ball_count(), 2);
        assert_eq!(sim.balls()[0].id, "a");
        assert_eq!(sim.balls()[0].color, "green");
    }

    #[test]
    fn test_generated_ids_unique() {
        let (mut sim, _) = sim();
        for _ in 0..200 {
            sim.add_ball(BallSpec::new());
        }
        let mut ids: Vec<_> = sim.balls().iter().map(|b| b.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_same_seed_same_defaults() {
        let (mut a, _) = sim();
        let (mut b, _) = sim();
        let id_a = a.add_ball(BallSpec::new());
        let id_b = b.add_ball(BallSpec::new());
        assert_eq!(id_a, id_b);
        assert_eq!(a.balls(), b.balls());
    }

    #[test]
    fn test_remove_ball() {
        let (mut sim, _) = sim();
        sim.add_ball(BallSpec::new().id("a"));
        assert!(sim.remove_ball("missing").is_none());
        assert_eq!(sim.remove_ball("a").map(|b| b.id), Some("a".to_string()));
        assert!(sim.is_empty());
    }

    #[test]
    fn test_click_routes_to_listeners() {
        let (mut sim, _) = sim();
        sim.on_click(|pos, cmds| {
            cmds.explode(pos.x, pos.y, 25.0);
            Ok(())
        });
        let report = sim.click(40.0, 60.0);
        assert_eq!(report.calls, 1);
        assert_eq!(sim.explosion_count(), 1);
        assert_eq!(sim.explosions()[0].pos, Vec2::new(40.0, 60.0));
    }

    #[test]
    fn test_reset() {
        let (mut sim, _) = sim();
        sim.add_ball(BallSpec::new());
        sim.explode(10.0, 10.0, 10.0);
        sim.reset();
        assert!(sim.is_empty());
        assert_eq!(sim.explosion_count(), 0);
    }

    #[test]
    fn test_deserialize_invalid_leaves_state() {
        let (mut sim, _) = sim();
        sim.add_ball(BallSpec::new().id("keep"));
        let mut snap = sim.serialize();
        snap.balls.push(snap.balls[0].clone());
        assert!(sim.deserialize(snap).is_err());
        assert_eq!(sim.ball_count(), 1);
    }

    #[test]
    fn test_snapshot_is_decoupled() {
        let (mut sim, _) = sim();
        sim.add_ball(BallSpec::new().id("a").pos(50.0, 50.0));
        let snap = sim.serialize();
        sim.remove_ball("a");
        sim.add_ball(BallSpec::new().id("b"));
        assert_eq!(snap.balls.len(), 1);
        assert_eq!(snap.balls[0].id, "a");
    }

    #[test]
    fn test_independent_simulations() {
        let (mut a, _) = sim();
        let (b, _) = sim();
        a.add_ball(BallSpec::new());
        a.explode(1.0, 1.0, 1.0);
        assert!(b.is_empty());
        assert_eq!(b.explosion_count(), 0);
    }
}
