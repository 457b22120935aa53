//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (monotonic clock for explosion ages and frame deltas)
//! - The JS-facing facade (wasm32 only)

pub mod time;

#[cfg(target_arch = "wasm32")]
pub mod web;
