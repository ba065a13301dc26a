//! Training types, content items and training records.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::quota::{SourceId, UserId};
use crate::error::RotorError;

/// Content-review mode a quota and a training record belong to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TrainingType {
    /// Binary accept/reject marking
    Cleaning,
    /// Category assignment
    Classifying,
}

impl TrainingType {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingType::Cleaning => "cleaning",
            TrainingType::Classifying => "classifying",
        }
    }

    /// Column of `news_training` holding the completion marker for this type.
    pub fn marker_column(&self) -> &'static str {
        match self {
            TrainingType::Cleaning => "\"like\"",
            TrainingType::Classifying => "category",
        }
    }

    pub fn all() -> [TrainingType; 2] {
        [TrainingType::Cleaning, TrainingType::Classifying]
    }
}

impl std::fmt::Display for TrainingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TrainingType {
    type Err = RotorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cleaning" => Ok(TrainingType::Cleaning),
            "classifying" => Ok(TrainingType::Classifying),
            other => Err(RotorError::InvalidInput(format!(
                "unknown training type '{}' (expected cleaning or classifying)",
                other
            ))),
        }
    }
}

/// A news item that training actions are recorded against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentItem {
    pub id: i64,
    pub source_id: SourceId,
    /// Items flagged invalid never count toward a quota
    pub invalid: bool,
}

/// Completion markers set by a training action.
///
/// A record can carry both; each training type only looks at its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingMarks {
    /// Cleaning verdict
    pub like: Option<i64>,
    /// Classifying category id
    pub category: Option<i64>,
}

impl TrainingMarks {
    pub fn liked(value: i64) -> Self {
        Self {
            like: Some(value),
            category: None,
        }
    }

    pub fn categorized(category: i64) -> Self {
        Self {
            like: None,
            category: Some(category),
        }
    }

    /// Check whether the marker for `training_type` is present.
    pub fn is_marked(&self, training_type: TrainingType) -> bool {
        match training_type {
            TrainingType::Cleaning => self.like.is_some(),
            TrainingType::Classifying => self.category.is_some(),
        }
    }
}

/// One training action by one user on one content item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingRecord {
    pub id: i64,
    pub user_id: UserId,
    pub item_id: i64,
    pub marks: TrainingMarks,
    /// Unix timestamp in milliseconds
    pub time_stamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_type_as_str() {
        assert_eq!(TrainingType::Cleaning.as_str(), "cleaning");
        assert_eq!(TrainingType::Classifying.as_str(), "classifying");
    }

    #[test]
    fn test_training_type_from_str() {
        assert_eq!("cleaning".parse::<TrainingType>().unwrap(), TrainingType::Cleaning);
        assert_eq!(" Classifying ".parse::<TrainingType>().unwrap(), TrainingType::Classifying);
        assert!("sorting".parse::<TrainingType>().is_err());
    }

    #[test]
    fn test_marker_column() {
        assert_eq!(TrainingType::Cleaning.marker_column(), "\"like\"");
        assert_eq!(TrainingType::Classifying.marker_column(), "category");
    }

    #[test]
    fn test_training_type_serde() {
        let json = serde_json::to_string(&TrainingType::Classifying).unwrap();
        assert_eq!(json, "\"classifying\"");
    }

    #[test]
    fn test_marks_per_type() {
        let liked = TrainingMarks::liked(1);
        assert!(liked.is_marked(TrainingType::Cleaning));
        assert!(!liked.is_marked(TrainingType::Classifying));

        let categorized = TrainingMarks::categorized(4);
        assert!(!categorized.is_marked(TrainingType::Cleaning));
        assert!(categorized.is_marked(TrainingType::Classifying));

        assert!(!TrainingMarks::default().is_marked(TrainingType::Cleaning));
    }
}
