//! Which training records count toward a quota.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Time range completion counts are taken over.
///
/// Quotas are called weekly, but the dashboard has been counting every
/// record ever made. `AllTime` keeps that behavior; `Weekly` resets the
/// count each Monday 00:00 UTC.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CountWindow {
    #[default]
    AllTime,
    Weekly,
}

impl CountWindow {
    /// Earliest timestamp that counts at `now`, or `None` for no bound.
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            CountWindow::AllTime => None,
            CountWindow::Weekly => Some(week_start(now)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CountWindow::AllTime => "all_time",
            CountWindow::Weekly => "weekly",
        }
    }
}

impl std::fmt::Display for CountWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Monday 00:00 UTC of the week containing `now`.
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_since_monday = i64::from(now.weekday().num_days_from_monday());
    let monday = now.date_naive() - Duration::days(days_since_monday);
    monday.and_time(NaiveTime::MIN).and_utc()
}
