//! Core domain types shared by the engine, the state store and the notifiers.

pub mod entity;
pub mod threshold;

pub use entity::{EntityKey, EntityKind, MetricKind, TrackedEntity};
pub use threshold::ThresholdSet;
