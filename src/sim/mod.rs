//! Simulation core
//!
//! All physics and event logic lives here. This module knows nothing about
//! drawing or input capture:
//! - Time comes from an injected clock
//! - Randomized defaults come from a seeded RNG
//! - Iteration order is registry order (balls) and trigger order (explosions)

pub mod contact;
pub mod events;
pub mod explosion;
pub mod motion;
pub mod simulation;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use contact::detect;
pub use events::{Command, Commands, DispatchReport, ListenerId};
pub use explosion::{ExplosionRegistry, ExplosionTiming};
pub use motion::{Bounds, integrate, reflect, reflect_axis};
pub use simulation::Simulation;
pub use snapshot::Snapshot;
pub use state::{Ball, BallSpec, Explosion, ExplosionView, Touch};
pub use tick::FrameReport;
