//! Run outcome reporting.

use serde::Serialize;

use crate::domain::EntityKey;
use crate::engine::Phase;

/// What happened to one entity during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntityOutcome {
    /// Value fetched and staged.
    Observed {
        key: String,
        phase: Phase,
        value: u64,
        crossed: Vec<u64>,
        notifications: usize,
        sink_failures: usize,
    },
    /// Fetch failed; the stored record was left untouched.
    FetchFailed { key: String, error: String },
}

impl EntityOutcome {
    pub fn key(&self) -> &str {
        match self {
            Self::Observed { key, .. } | Self::FetchFailed { key, .. } => key,
        }
    }

    pub(crate) fn fetch_failed(key: &EntityKey, error: impl ToString) -> Self {
        Self::FetchFailed {
            key: key.to_string(),
            error: error.to_string(),
        }
    }
}

/// Overall run status, mapped to the process exit code by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every fetch and every send succeeded.
    Success,
    /// At least one fetch or sink failed; the rest of the run completed.
    PartialFailure,
}

impl RunStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::PartialFailure => 2,
        }
    }
}

/// Summary of one pass over every configured entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub entities: Vec<EntityOutcome>,
    /// Events with at least one successful delivery.
    pub notifications_sent: usize,
    pub sink_failures: usize,
    /// Records committed to the state backend.
    pub persisted: usize,
    pub dry_run: bool,
}

impl RunReport {
    pub fn fetch_failures(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| matches!(e, EntityOutcome::FetchFailed { .. }))
            .count()
    }

    pub fn status(&self) -> RunStatus {
        if self.fetch_failures() > 0 || self.sink_failures > 0 {
            RunStatus::PartialFailure
        } else {
            RunStatus::Success
        }
    }

    pub fn outcome(&self, key: &EntityKey) -> Option<&EntityOutcome> {
        let key = key.to_string();
        self.entities.iter().find(|e| e.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityKind;

    #[test]
    fn test_status_from_failures() {
        let mut report = RunReport::default();
        assert_eq!(report.status(), RunStatus::Success);
        assert_eq!(report.status().exit_code(), 0);

        report.sink_failures = 1;
        assert_eq!(report.status(), RunStatus::PartialFailure);

        report.sink_failures = 0;
        report.entities.push(EntityOutcome::fetch_failed(
            &EntityKey::new(EntityKind::Channel, "UC1"),
            "timeout",
        ));
        assert_eq!(report.status(), RunStatus::PartialFailure);
        assert_eq!(report.status().exit_code(), 2);
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let key = EntityKey::new(EntityKind::Playlist, "PL1");
        let outcome = EntityOutcome::fetch_failed(&key, "boom");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "fetch_failed");
        assert_eq!(json["key"], "playlist:PL1");
    }
}
