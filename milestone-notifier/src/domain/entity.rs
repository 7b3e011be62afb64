//! Tracked entities and their identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of YouTube object is being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Channel,
    Playlist,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Playlist => "playlist",
        }
    }

    /// The metric sampled for this kind of entity.
    pub fn metric(&self) -> MetricKind {
        match self {
            Self::Channel => MetricKind::Subscribers,
            Self::Playlist => MetricKind::Views,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The metric a threshold applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Subscribers,
    Views,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscribers => "subscribers",
            Self::Views => "views",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State key of an entity, rendered as `"<kind>:<id>"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityKey {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A channel or playlist being watched for milestones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedEntity {
    pub kind: EntityKind,
    pub id: String,
    pub description: String,
    pub twitter_enabled: bool,
}

impl TrackedEntity {
    pub fn channel(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Channel,
            id: id.into(),
            description: description.into(),
            twitter_enabled: false,
        }
    }

    pub fn playlist(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Playlist,
            id: id.into(),
            description: description.into(),
            twitter_enabled: false,
        }
    }

    pub fn with_twitter(mut self, enabled: bool) -> Self {
        self.twitter_enabled = enabled;
        self
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind, self.id.clone())
    }

    pub fn metric(&self) -> MetricKind {
        self.kind.metric()
    }

    /// Public URL of the entity.
    pub fn url(&self) -> String {
        match self.kind {
            EntityKind::Channel => format!("https://www.youtube.com/channel/{}", self.id),
            EntityKind::Playlist => format!("https://www.youtube.com/playlist?list={}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key_display() {
        assert_eq!(
            EntityKey::new(EntityKind::Playlist, "PLabc").to_string(),
            "playlist:PLabc"
        );
        assert_eq!(
            TrackedEntity::channel("UC1", "Main").key().to_string(),
            "channel:UC1"
        );
    }

    #[test]
    fn test_metric_follows_kind() {
        assert_eq!(
            TrackedEntity::channel("UC1", "c").metric(),
            MetricKind::Subscribers
        );
        assert_eq!(TrackedEntity::playlist("PL1", "p").metric(), MetricKind::Views);
    }
}
