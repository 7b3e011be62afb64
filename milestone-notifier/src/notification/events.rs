//! Notification events.
//!
//! Defines what can be announced and how each event reads as text.

use chrono::{DateTime, Utc};

use crate::domain::{EntityKind, MetricKind, TrackedEntity};

/// A threshold crossed by one entity during a run. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossingEvent {
    pub entity: TrackedEntity,
    pub metric: MetricKind,
    pub threshold: u64,
    pub previous_value: u64,
    pub new_value: u64,
    pub timestamp: DateTime<Utc>,
}

/// Events that can trigger notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A metric reached a configured milestone.
    MilestoneReached(CrossingEvent),
    /// A video appeared in a tracked playlist.
    PlaylistVideoAdded {
        playlist: TrackedEntity,
        video_id: String,
        title: String,
        playlist_views: u64,
        timestamp: DateTime<Utc>,
    },
    /// A video left a tracked playlist.
    PlaylistVideoRemoved {
        playlist: TrackedEntity,
        video_id: String,
        title: String,
        timestamp: DateTime<Utc>,
    },
}

impl NotificationEvent {
    /// Get the event type as a string.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MilestoneReached(_) => "milestone_reached",
            Self::PlaylistVideoAdded { .. } => "playlist_video_added",
            Self::PlaylistVideoRemoved { .. } => "playlist_video_removed",
        }
    }

    pub fn is_milestone(&self) -> bool {
        matches!(self, Self::MilestoneReached(_))
    }

    /// The entity the event is about.
    pub fn entity(&self) -> &TrackedEntity {
        match self {
            Self::MilestoneReached(crossing) => &crossing.entity,
            Self::PlaylistVideoAdded { playlist, .. } => playlist,
            Self::PlaylistVideoRemoved { playlist, .. } => playlist,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::MilestoneReached(crossing) => crossing.timestamp,
            Self::PlaylistVideoAdded { timestamp, .. } => *timestamp,
            Self::PlaylistVideoRemoved { timestamp, .. } => *timestamp,
        }
    }

    /// Get a human-readable title for this event.
    pub fn title(&self) -> String {
        match self {
            Self::MilestoneReached(crossing) => format!(
                "🎉 {} reached {} {}!",
                crossing.entity.description,
                format_count(crossing.threshold),
                crossing.metric
            ),
            Self::PlaylistVideoAdded { playlist, .. } => {
                format!("➕ New video in {}", playlist.description)
            }
            Self::PlaylistVideoRemoved { playlist, .. } => {
                format!("🗑️ Video removed from {}", playlist.description)
            }
        }
    }

    /// Get a detailed description of this event.
    pub fn description(&self) -> String {
        match self {
            Self::MilestoneReached(crossing) => {
                let noun = match crossing.entity.kind {
                    EntityKind::Channel => "Channel",
                    EntityKind::Playlist => "Playlist",
                };
                format!(
                    "{} '{}' ({}) surpassed {} {}. Current: {}.",
                    noun,
                    crossing.entity.description,
                    crossing.entity.id,
                    format_count(crossing.threshold),
                    crossing.metric,
                    format_count(crossing.new_value)
                )
            }
            Self::PlaylistVideoAdded {
                video_id,
                title,
                playlist_views,
                ..
            } => format!(
                "'{}' ({}) is now monitored. Playlist views: {}.",
                title,
                video_id,
                format_count(*playlist_views)
            ),
            Self::PlaylistVideoRemoved { video_id, title, .. } => {
                if title.is_empty() {
                    format!("Video {} is no longer in the playlist.", video_id)
                } else {
                    format!("'{}' ({}) is no longer in the playlist.", title, video_id)
                }
            }
        }
    }

    /// Link shown with the notification.
    pub fn url(&self) -> String {
        match self {
            Self::PlaylistVideoAdded { video_id, .. } => format!("https://youtu.be/{}", video_id),
            _ => self.entity().url(),
        }
    }

    /// Single plain-text message for sinks without rich formatting.
    pub fn message(&self) -> String {
        format!("{}\n{}\n{}", self.title(), self.description(), self.url())
    }
}

/// Format a count with thousands separators.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
