//! Legacy string-tagged target definitions.
//!
//! Before quotas had their own table, each one was stored as a definition row
//! whose name packed the key into semicolon-delimited tags:
//!
//! ```text
//! name:  target:training-cleaning;user:7;sourceid:3
//! value: 5
//! ```
//!
//! These rows are only read when importing old data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::quota::{SourceId, UserId, WeeklyQuota};
use crate::domain::training::TrainingType;

const TARGET_PREFIX: &str = "target:training-";
const USER_TAG: &str = "user:";
const SOURCE_TAG: &str = "sourceid:";

/// Why a definition row could not be turned into a quota.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("not a training target definition")]
    NotATarget,

    #[error("unknown training type '{0}'")]
    UnknownType(String),

    #[error("missing or malformed user tag")]
    MissingUser,

    #[error("missing or malformed sourceid tag")]
    MissingSource,

    #[error("negative weekly limit {0}")]
    NegativeLimit(i64),
}

/// A raw definition row as exported from the dashboard database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LegacyDefinition {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl LegacyDefinition {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.map(str::to_string),
        }
    }

    /// Render a quota back into the legacy encoding.
    pub fn from_quota(quota: &WeeklyQuota) -> Self {
        Self {
            name: format!(
                "{}{};{}{};{}{}",
                TARGET_PREFIX, quota.training_type, USER_TAG, quota.user_id, SOURCE_TAG, quota.source_id
            ),
            value: Some(quota.weekly_limit.to_string()),
        }
    }

    /// Decode the row into a quota.
    ///
    /// A missing or unparseable value yields a limit of 0; the row is kept.
    pub fn to_quota(&self) -> Result<WeeklyQuota, DefinitionError> {
        let mut segments = self.name.split(';').map(str::trim);

        let type_name = segments
            .next()
            .and_then(|head| head.strip_prefix(TARGET_PREFIX))
            .ok_or(DefinitionError::NotATarget)?;
        let training_type = type_name
            .parse::<TrainingType>()
            .map_err(|_| DefinitionError::UnknownType(type_name.to_string()))?;

        let rest: Vec<&str> = segments.collect();

        let user_id = tag_value(&rest, USER_TAG)
            .and_then(|raw| raw.parse::<UserId>().ok())
            .ok_or(DefinitionError::MissingUser)?;

        let source_id = tag_value(&rest, SOURCE_TAG)
            .and_then(|raw| raw.parse::<SourceId>().ok())
            .ok_or(DefinitionError::MissingSource)?;

        let limit = self.value.as_deref().and_then(parse_leading_int).unwrap_or(0);
        if limit < 0 {
            return Err(DefinitionError::NegativeLimit(limit));
        }
        let weekly_limit = u32::try_from(limit).unwrap_or(u32::MAX);

        Ok(WeeklyQuota::new(user_id, training_type, source_id, weekly_limit))
    }
}

/// Text after `tag` in the first segment that starts with it, up to the next `:`.
fn tag_value<'a>(segments: &[&'a str], tag: &str) -> Option<&'a str> {
    segments
        .iter()
        .copied()
        .find_map(|segment| segment.strip_prefix(tag))
        .map(|value| value.split(':').next().unwrap_or(value).trim())
}

/// Parse an optionally signed integer from the start of `raw`, ignoring trailing text.
///
/// `"12"` and `" 12 per week"` both give 12; `"abc"` gives `None`. Digit runs
/// too large for `i64` saturate.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(value.saturating_mul(sign))
}
