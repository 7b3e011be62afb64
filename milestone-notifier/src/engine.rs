//! Threshold crossing detection.
//!
//! The engine is a pure function of the previous high-water cursor, the newly
//! observed value and the threshold list. The cursor is the only record of
//! which thresholds were already announced: every threshold at or below it is
//! considered notified, so persisting the advanced cursor makes a run
//! idempotent.

use serde::{Deserialize, Serialize};

use crate::domain::ThresholdSet;

/// Lifecycle phase of a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// First observation; nothing is announced.
    Baseline,
    /// A persisted record exists.
    SteadyState,
}

impl Phase {
    pub fn of(previous: Option<u64>) -> Self {
        match previous {
            None => Self::Baseline,
            Some(_) => Self::SteadyState,
        }
    }
}

/// Thresholds crossed between `previous` and `current`, ascending.
///
/// Returns every `t` with `previous < t <= current`. A missing `previous`
/// (first observation) never yields crossings.
pub fn evaluate(previous: Option<u64>, current: u64, thresholds: &ThresholdSet) -> Vec<u64> {
    match previous {
        None => Vec::new(),
        Some(previous) => thresholds.between(previous, current).to_vec(),
    }
}

/// Result of feeding one observation through the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub phase: Phase,
    pub crossed: Vec<u64>,
    /// High-water cursor to persist. Never decreases.
    pub cursor: u64,
}

/// Evaluate `current` against the stored cursor and compute the next cursor.
pub fn advance(previous: Option<u64>, current: u64, thresholds: &ThresholdSet) -> Observation {
    Observation {
        phase: Phase::of(previous),
        crossed: evaluate(previous, current, thresholds),
        cursor: previous.map_or(current, |p| p.max(current)),
    }
}
