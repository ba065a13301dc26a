//! Quota identifiers, quota rows and progress values.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::training::TrainingType;
use crate::error::{Result, RotorError};

/// Dashboard user identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u32")]
pub struct UserId(u32);

impl UserId {
    /// Create a user id; ids start at 1.
    pub fn new(raw: u32) -> Result<Self> {
        if raw == 0 {
            return Err(RotorError::InvalidInput("user id must be positive".to_string()));
        }
        Ok(Self(raw))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u32> for UserId {
    type Error = RotorError;

    fn try_from(raw: u32) -> Result<Self> {
        Self::new(raw)
    }
}

impl FromStr for UserId {
    type Err = RotorError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s
            .trim()
            .parse::<u32>()
            .map_err(|_| RotorError::InvalidInput(format!("invalid user id '{}'", s)))?;
        Self::new(raw)
    }
}

/// Content source identifier. Lower ids are serviced first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u32")]
pub struct SourceId(u32);

impl SourceId {
    /// Create a source id; ids start at 1.
    pub fn new(raw: u32) -> Result<Self> {
        if raw == 0 {
            return Err(RotorError::InvalidInput("source id must be positive".to_string()));
        }
        Ok(Self(raw))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u32> for SourceId {
    type Error = RotorError;

    fn try_from(raw: u32) -> Result<Self> {
        Self::new(raw)
    }
}

impl FromStr for SourceId {
    type Err = RotorError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s
            .trim()
            .parse::<u32>()
            .map_err(|_| RotorError::InvalidInput(format!("invalid source id '{}'", s)))?;
        Self::new(raw)
    }
}

/// A configured weekly limit, keyed by `(user_id, training_type, source_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyQuota {
    pub user_id: UserId,
    pub training_type: TrainingType,
    pub source_id: SourceId,
    pub weekly_limit: u32,
}

impl WeeklyQuota {
    pub fn new(user_id: UserId, training_type: TrainingType, source_id: SourceId, weekly_limit: u32) -> Self {
        Self {
            user_id,
            training_type,
            source_id,
            weekly_limit,
        }
    }

    /// The rotation view of this quota.
    pub fn target(&self) -> QuotaTarget {
        QuotaTarget {
            source_id: self.source_id,
            weekly_limit: self.weekly_limit,
        }
    }
}

/// A source a user is expected to work on, with its limit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuotaTarget {
    pub source_id: SourceId,
    pub weekly_limit: u32,
}

/// Completion state of one quota.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed: u64,
    pub total: u32,
    pub is_completed: bool,
}

impl Progress {
    /// Progress for a quota with no limit or no source: never satisfied.
    pub fn unbounded() -> Self {
        Self {
            completed: 0,
            total: 0,
            is_completed: false,
        }
    }

    pub fn counted(completed: u64, total: u32) -> Self {
        Self {
            completed,
            total,
            is_completed: completed >= u64::from(total),
        }
    }

    /// Work left before the quota is met.
    pub fn remaining(&self) -> u64 {
        u64::from(self.total).saturating_sub(self.completed)
    }
}

/// One row of a user's progress report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceProgress {
    pub target: QuotaTarget,
    pub progress: Progress,
    /// Whether this is the source the user is currently served from
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_reject_zero() {
        assert!(UserId::new(0).is_err());
        assert!(SourceId::new(0).is_err());
        assert_eq!(UserId::new(7).unwrap().get(), 7);
        assert_eq!(SourceId::new(3).unwrap().get(), 3);
    }

    #[test]
    fn test_ids_from_str() {
        assert_eq!("12".parse::<SourceId>().unwrap().get(), 12);
        assert!("0".parse::<SourceId>().is_err());
        assert!("-4".parse::<UserId>().is_err());
        assert!("abc".parse::<UserId>().is_err());
    }

    #[test]
    fn test_source_ordering() {
        let low = SourceId::new(1).unwrap();
        let high = SourceId::new(3).unwrap();
        assert!(low < high);
    }

    #[test]
    fn test_progress_unbounded() {
        let progress = Progress::unbounded();
        assert_eq!(progress.completed, 0);
        assert_eq!(progress.total, 0);
        assert!(!progress.is_completed);
    }

    #[test]
    fn test_progress_counted() {
        assert!(!Progress::counted(1, 5).is_completed);
        assert!(Progress::counted(5, 5).is_completed);
        assert!(Progress::counted(6, 5).is_completed);
        assert!(Progress::counted(0, 0).is_completed);
    }

    #[test]
    fn test_progress_remaining() {
        assert_eq!(Progress::counted(1, 5).remaining(), 4);
        assert_eq!(Progress::counted(9, 5).remaining(), 0);
    }

    #[test]
    fn test_quota_target_json_shape() {
        let target = QuotaTarget {
            source_id: SourceId::new(3).unwrap(),
            weekly_limit: 5,
        };
        let json = serde_json::to_value(target).unwrap();
        assert_eq!(json, serde_json::json!({"sourceId": 3, "weeklyLimit": 5}));
    }
}
