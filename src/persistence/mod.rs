//! Save/load persistence
//!
//! Snapshots are wrapped in a versioned JSON envelope so future format
//! changes can be detected instead of misread.

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::sim::Snapshot;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

/// Versioned wrapper around a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    /// Clock reading of the saving simulation (ms)
    pub saved_at_ms: f64,
    pub snapshot: Snapshot,
}

/// Encode a snapshot as an envelope JSON string
pub fn encode(snapshot: &Snapshot) -> Result<String, PersistenceError> {
    let envelope = SaveEnvelope {
        version: SAVE_VERSION,
        saved_at_ms: snapshot.now,
        snapshot: snapshot.clone(),
    };
    let json = serde_json::to_string(&envelope)?;
    log::debug!("Encoded save ({} bytes)", json.len());
    Ok(json)
}

/// Decode and validate an envelope JSON string
pub fn decode(json: &str) -> Result<Snapshot, PersistenceError> {
    let envelope: SaveEnvelope = serde_json::from_str(json)?;
    if envelope.version != SAVE_VERSION {
        return Err(PersistenceError::UnsupportedVersion(envelope.version));
    }
    envelope.snapshot.validate()?;
    Ok(envelope.snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Ball, Explosion};
    use glam::Vec2;

    fn snapshot() -> Snapshot {
        Snapshot {
            now: 250.0,
            balls: vec![Ball {
                id: "a".to_string(),
                pos: Vec2::new(10.0, 10.0),
                vel: Vec2::new(1.0, 1.0),
                color: "blue".to_string(),
            }],
            explosions: vec![Explosion::new(Vec2::ZERO, 20.0, 100.0)],
        }
    }

    #[test]
    fn test_encode_decode() {
        let json = encode(&snapshot()).unwrap();
        assert!(json.contains("\"version\":1"));
        assert_eq!(decode(&json).unwrap(), snapshot());
    }

    #[test]
    fn test_unknown_version() {
        let json = encode(&snapshot()).unwrap().replace("\"version\":1", "\"version\":9");
        assert!(matches!(
            decode(&json),
            Err(PersistenceError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_invalid_snapshot_inside_envelope() {
        let mut snap = snapshot();
        snap.balls.push(snap.balls[0].clone());
        let json = encode(&snap).unwrap();
        assert!(matches!(decode(&json), Err(PersistenceError::Snapshot(_))));
    }

    #[test]
    fn test_garbage() {
        assert!(matches!(decode("nope"), Err(PersistenceError::Json(_))));
    }
}
