//! One monitoring pass over every configured entity.
//!
//! For each entity, in plan order: fetch the current value, evaluate it
//! against the stored high-water cursor, announce each crossed threshold in
//! ascending order, then stage the new observation. A failed fetch leaves the
//! entity's record untouched and the pass continues. All staged observations
//! are written with a single [`StateStore::persist_all`] at the end.
//!
//! Notification failures do not hold back the state advance: a milestone that
//! could not be delivered is not announced again on the next run.

mod clock;
mod membership;
mod report;

pub use clock::{Clock, FixedClock, SystemClock};
pub use report::{EntityOutcome, RunReport, RunStatus};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::Result;
use crate::config::MonitorPlan;
use crate::domain::{EntityKind, ThresholdSet, TrackedEntity};
use crate::engine::{self, Phase};
use crate::notification::{CrossingEvent, NotificationDispatcher, NotificationEvent};
use crate::source::{FetchError, MetricSource};
use crate::state::StateStore;

/// Knobs for a single run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Log what would be announced, call no sink, persist nothing.
    pub dry_run: bool,
    /// Upper bound for fetching one entity.
    pub fetch_timeout: Duration,
    /// Announce videos added to or removed from playlists. When off, playlist
    /// members are not recorded either.
    pub track_playlist_membership: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            fetch_timeout: Duration::from_secs(120),
            track_playlist_membership: true,
        }
    }
}

/// Current reading of one entity.
struct Sample {
    value: u64,
    videos: Option<BTreeMap<String, String>>,
}

/// Drives fetch, evaluation, notification and staging for one run.
pub struct RunCoordinator {
    source: Arc<dyn MetricSource>,
    dispatcher: NotificationDispatcher,
    clock: Arc<dyn Clock>,
    options: RunOptions,
}

impl RunCoordinator {
    pub fn new(source: Arc<dyn MetricSource>, dispatcher: NotificationDispatcher) -> Self {
        Self {
            source,
            dispatcher,
            clock: Arc::new(SystemClock),
            options: RunOptions::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one pass over `plan`.
    ///
    /// Only fatal errors are returned (the final persist failing). Fetch and
    /// sink failures are recorded in the report.
    pub async fn run(&self, plan: &MonitorPlan, store: &mut StateStore) -> Result<RunReport> {
        let mut report = RunReport {
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        info!(
            entities = plan.entities.len(),
            dry_run = self.options.dry_run,
            "Starting milestone check"
        );

        for entity in &plan.entities {
            let thresholds = plan.thresholds_for(entity.metric());
            let outcome = self.observe(entity, thresholds, store, &mut report).await;
            report.entities.push(outcome);
        }

        if self.options.dry_run {
            info!(staged = store.staged_len(), "Dry run, state not persisted");
        } else {
            report.persisted = store.persist_all()?;
        }

        info!(
            entities = report.entities.len(),
            fetch_failures = report.fetch_failures(),
            notifications = report.notifications_sent,
            sink_failures = report.sink_failures,
            persisted = report.persisted,
            "Milestone check finished"
        );

        Ok(report)
    }

    async fn observe(
        &self,
        entity: &TrackedEntity,
        thresholds: &ThresholdSet,
        store: &mut StateStore,
        report: &mut RunReport,
    ) -> EntityOutcome {
        let key = entity.key();

        let sample = match self.fetch(entity).await {
            Ok(sample) => sample,
            Err(e) => {
                warn!(entity = %key, error = %e, "Fetch failed, keeping previous state");
                return EntityOutcome::fetch_failed(&key, e);
            }
        };

        let now = self.clock.now();
        let previous = store.get(&key);
        let previous_value = previous.map(|r| r.last_value);
        let previous_videos = previous.and_then(|r| r.videos.clone());
        let observation = engine::advance(previous.map(|r| r.cursor()), sample.value, thresholds);

        match observation.phase {
            Phase::Baseline => info!(
                entity = %key,
                value = sample.value,
                "Baseline recorded, no notifications on first observation"
            ),
            Phase::SteadyState => debug!(
                entity = %key,
                value = sample.value,
                cursor = observation.cursor,
                crossed = ?observation.crossed,
                next = ?thresholds.next_above(observation.cursor),
                "Observed"
            ),
        }

        let mut events: Vec<NotificationEvent> = observation
            .crossed
            .iter()
            .map(|&threshold| {
                NotificationEvent::MilestoneReached(CrossingEvent {
                    entity: entity.clone(),
                    metric: entity.metric(),
                    threshold,
                    previous_value: previous_value.unwrap_or_default(),
                    new_value: sample.value,
                    timestamp: now,
                })
            })
            .collect();

        if self.options.track_playlist_membership
            && observation.phase == Phase::SteadyState
            && let (Some(before), Some(after)) = (&previous_videos, &sample.videos)
        {
            events.extend(membership_events(entity, before, after, sample.value, now));
        }

        let mut notifications = 0;
        let mut sink_failures = 0;
        for event in &events {
            if self.options.dry_run {
                info!(
                    entity = %key,
                    event_type = event.event_type(),
                    "Dry run, would notify: {}",
                    event.title()
                );
                continue;
            }
            let dispatch = self.dispatcher.send(event, entity).await;
            if !dispatch.delivered.is_empty() {
                notifications += 1;
            }
            sink_failures += dispatch.failures.len();
        }
        report.notifications_sent += notifications;
        report.sink_failures += sink_failures;

        let record = store.update(&key, sample.value, now);
        if entity.kind == EntityKind::Playlist {
            record.videos = sample.videos;
        }

        EntityOutcome::Observed {
            key: key.to_string(),
            phase: observation.phase,
            value: sample.value,
            crossed: observation.crossed,
            notifications,
            sink_failures,
        }
    }

    async fn fetch(&self, entity: &TrackedEntity) -> std::result::Result<Sample, FetchError> {
        let fetch = async {
            match entity.kind {
                EntityKind::Channel => {
                    let value = self.source.fetch_subscriber_count(&entity.id).await?;
                    Ok::<_, FetchError>(Sample { value, videos: None })
                }
                EntityKind::Playlist if !self.options.track_playlist_membership => {
                    let value = self.source.fetch_playlist_view_total(&entity.id).await?;
                    Ok(Sample { value, videos: None })
                }
                EntityKind::Playlist => {
                    let playlist = self.source.fetch_playlist(&entity.id).await?;
                    Ok::<_, FetchError>(Sample {
                        value: playlist.total_views,
                        videos: Some(playlist.videos),
                    })
                }
            }
        };

        match tokio::time::timeout(self.options.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.options.fetch_timeout)),
        }
    }
}

fn membership_events(
    playlist: &TrackedEntity,
    before: &BTreeMap<String, String>,
    after: &BTreeMap<String, String>,
    playlist_views: u64,
    timestamp: DateTime<Utc>,
) -> Vec<NotificationEvent> {
    let change = membership::diff(before, after);
    if !change.is_empty() {
        info!(
            entity = %playlist.key(),
            added = change.added.len(),
            removed = change.removed.len(),
            "Playlist membership changed"
        );
    }

    let added = change
        .added
        .iter()
        .map(|&(video_id, title)| NotificationEvent::PlaylistVideoAdded {
            playlist: playlist.clone(),
            video_id: video_id.to_string(),
            title: title.to_string(),
            playlist_views,
            timestamp,
        });
    let removed = change
        .removed
        .iter()
        .map(|&(video_id, title)| NotificationEvent::PlaylistVideoRemoved {
            playlist: playlist.clone(),
            video_id: video_id.to_string(),
            title: title.to_string(),
            timestamp,
        });
    added.chain(removed).collect()
}
