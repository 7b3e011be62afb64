//! Fan-out of events to sinks.
//!
//! Delivery is at-most-once: each sink gets one attempt per event, a failing
//! sink never prevents the others from being tried, and failures are only
//! reported back, never queued for retry.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::events::NotificationEvent;
use super::sinks::NotificationSink;
use crate::domain::TrackedEntity;

/// One sink that failed for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkFailure {
    pub sink: &'static str,
    pub error: String,
}

/// Outcome of dispatching one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: Vec<&'static str>,
    /// Sinks that were targeted but lack configuration.
    pub skipped: Vec<&'static str>,
    pub failures: Vec<SinkFailure>,
}

/// Routes events to Discord and, for opted-in entities, to Twitter.
pub struct NotificationDispatcher {
    discord: Arc<dyn NotificationSink>,
    twitter: Option<Arc<dyn NotificationSink>>,
    /// Minimum spacing between two consecutive sends.
    interval: Duration,
    last_send: Mutex<Option<Instant>>,
}

impl NotificationDispatcher {
    pub fn new(discord: Arc<dyn NotificationSink>) -> Self {
        Self {
            discord,
            twitter: None,
            interval: Duration::ZERO,
            last_send: Mutex::new(None),
        }
    }

    pub fn with_twitter(mut self, twitter: Arc<dyn NotificationSink>) -> Self {
        self.twitter = Some(twitter);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sinks an event for `entity` goes to.
    fn targets(
        &self,
        event: &NotificationEvent,
        entity: &TrackedEntity,
    ) -> Vec<&Arc<dyn NotificationSink>> {
        let mut targets = vec![&self.discord];
        if entity.twitter_enabled
            && event.is_milestone()
            && let Some(twitter) = &self.twitter
        {
            targets.push(twitter);
        }
        targets
    }

    async fn pace(&self) {
        if self.interval.is_zero() {
            return;
        }
        let last = *self.last_send.lock();
        if let Some(last) = last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *self.last_send.lock() = Some(Instant::now());
    }

    /// Send `event` to every sink it is routed to, independently.
    pub async fn send(&self, event: &NotificationEvent, entity: &TrackedEntity) -> DispatchReport {
        let mut report = DispatchReport::default();

        for sink in self.targets(event, entity) {
            let sink_type = sink.sink_type();

            if !sink.is_enabled() {
                warn!(
                    sink = sink_type,
                    event_type = event.event_type(),
                    "Sink not configured, skipping notification"
                );
                report.skipped.push(sink_type);
                continue;
            }

            self.pace().await;

            match sink.send(event).await {
                Ok(()) => {
                    debug!(sink = sink_type, event_type = event.event_type(), "Notification delivered");
                    report.delivered.push(sink_type);
                }
                Err(e) => {
                    warn!(
                        sink = sink_type,
                        entity = %entity.key(),
                        event_type = event.event_type(),
                        error = %e,
                        "Notification failed"
                    );
                    report.failures.push(SinkFailure {
                        sink: sink_type,
                        error: e.to_string(),
                    });
                }
            }
        }

        if !report.delivered.is_empty() {
            info!(
                entity = %entity.key(),
                sinks = ?report.delivered,
                "{}",
                event.title()
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricKind;
    use crate::notification::events::CrossingEvent;
    use crate::notification::sinks::{MockNotificationSink, SinkError};
    use chrono::Utc;

    fn milestone(entity: &TrackedEntity) -> NotificationEvent {
        NotificationEvent::MilestoneReached(CrossingEvent {
            entity: entity.clone(),
            metric: MetricKind::Subscribers,
            threshold: 1000,
            previous_value: 900,
            new_value: 1100,
            timestamp: Utc::now(),
        })
    }

    fn mock_sink(name: &'static str, enabled: bool, calls: usize, ok: bool) -> MockNotificationSink {
        let mut sink = MockNotificationSink::new();
        sink.expect_sink_type().return_const(name);
        sink.expect_is_enabled().return_const(enabled);
        sink.expect_send().times(calls).returning(move |_| {
            if ok {
                Ok(())
            } else {
                Err(SinkError::Request {
                    sink: name,
                    message: "connection refused".to_string(),
                })
            }
        });
        sink
    }

    #[tokio::test]
    async fn test_discord_failure_still_tries_twitter() {
        let entity = TrackedEntity::channel("UC1", "Main").with_twitter(true);
        let dispatcher = NotificationDispatcher::new(Arc::new(mock_sink("discord", true, 1, false)))
            .with_twitter(Arc::new(mock_sink("twitter", true, 1, true)));

        let report = dispatcher.send(&milestone(&entity), &entity).await;

        assert_eq!(report.delivered, vec!["twitter"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].sink, "discord");
        assert!(!report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_twitter_failure_does_not_affect_discord() {
        let entity = TrackedEntity::channel("UC1", "Main").with_twitter(true);
        let dispatcher = NotificationDispatcher::new(Arc::new(mock_sink("discord", true, 1, true)))
            .with_twitter(Arc::new(mock_sink("twitter", true, 1, false)));

        let report = dispatcher.send(&milestone(&entity), &entity).await;

        assert_eq!(report.delivered, vec!["discord"]);
        assert_eq!(report.failures[0].sink, "twitter");
    }

    #[tokio::test]
    async fn test_twitter_only_for_opted_in_entities() {
        let entity = TrackedEntity::channel("UC1", "Main");
        let dispatcher = NotificationDispatcher::new(Arc::new(mock_sink("discord", true, 1, true)))
            .with_twitter(Arc::new(mock_sink("twitter", true, 0, true)));

        let report = dispatcher.send(&milestone(&entity), &entity).await;

        assert_eq!(report.delivered, vec!["discord"]);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_membership_events_skip_twitter() {
        let playlist = TrackedEntity::playlist("PL1", "Series").with_twitter(true);
        let dispatcher = NotificationDispatcher::new(Arc::new(mock_sink("discord", true, 1, true)))
            .with_twitter(Arc::new(mock_sink("twitter", true, 0, true)));

        let event = NotificationEvent::PlaylistVideoRemoved {
            playlist: playlist.clone(),
            video_id: "vid".to_string(),
            title: "Old".to_string(),
            timestamp: Utc::now(),
        };
        let report = dispatcher.send(&event, &playlist).await;

        assert_eq!(report.delivered, vec!["discord"]);
    }

    #[tokio::test]
    async fn test_unconfigured_sink_is_skipped_not_failed() {
        let entity = TrackedEntity::channel("UC1", "Main").with_twitter(true);
        let dispatcher = NotificationDispatcher::new(Arc::new(mock_sink("discord", false, 0, true)))
            .with_twitter(Arc::new(mock_sink("twitter", true, 1, true)));

        let report = dispatcher.send(&milestone(&entity), &entity).await;

        assert_eq!(report.skipped, vec!["discord"]);
        assert_eq!(report.delivered, vec!["twitter"]);
        assert!(report.failures.is_empty());
    }
}
