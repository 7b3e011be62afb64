use crate::domain::{MetricKind, ThresholdSet, TrackedEntity};

/// Validated monitoring work: which entities to observe and the milestones
/// that apply to each metric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorPlan {
    /// Channels first, then playlists, each in configuration order.
    pub entities: Vec<TrackedEntity>,
    pub subscriber_thresholds: ThresholdSet,
    pub view_thresholds: ThresholdSet,
}

impl MonitorPlan {
    pub fn thresholds_for(&self, metric: MetricKind) -> &ThresholdSet {
        match metric {
            MetricKind::Subscribers => &self.subscriber_thresholds,
            MetricKind::Views => &self.view_thresholds,
        }
    }

    pub fn channels(&self) -> impl Iterator<Item = &TrackedEntity> {
        self.entities.iter().filter(|e| e.metric() == MetricKind::Subscribers)
    }

    pub fn playlists(&self) -> impl Iterator<Item = &TrackedEntity> {
        self.entities.iter().filter(|e| e.metric() == MetricKind::Views)
    }
}
