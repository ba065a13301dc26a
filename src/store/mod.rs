//! Storage layer for rotor.
//!
//! The resolver only needs two reads, captured by [`QuotaStore`]:
//! - the quotas configured for a user and training type
//! - how many valid training records a user completed for one source
//!
//! [`SqliteStore`] implements them on a SQLite database and adds the
//! administrative writes used to configure quotas and seed training data.
//!
//! # Example
//!
//! ```ignore
//! use rotor::store::{QuotaStore, SqliteStore};
//!
//! let store = SqliteStore::open("/var/lib/rotor/rotor.db")?;
//! store.set_quota(&admin, &WeeklyQuota::new(user, TrainingType::Cleaning, source, 5))?;
//! let quotas = store.list_quotas(user, TrainingType::Cleaning)?;
//! ```

mod sqlite;

use chrono::{DateTime, Utc};

use crate::domain::{SourceId, TrainingType, UserId, WeeklyQuota};
use crate::error::Result;

pub use sqlite::{ImportReport, SkippedDefinition, SqliteStore};

/// Read access to quotas and completion counts.
pub trait QuotaStore: Send + Sync {
    /// All quotas configured for `user_id` and `training_type`, in any order.
    fn list_quotas(&self, user_id: UserId, training_type: TrainingType) -> Result<Vec<WeeklyQuota>>;

    /// Count training records by `user_id` that carry the marker for
    /// `training_type` on valid items of `source_id`.
    ///
    /// With `since`, only records stamped at or after it are counted.
    fn count_completed(
        &self,
        user_id: UserId,
        training_type: TrainingType,
        source_id: SourceId,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64>;
}

impl<T: QuotaStore + ?Sized> QuotaStore for &T {
    fn list_quotas(&self, user_id: UserId, training_type: TrainingType) -> Result<Vec<WeeklyQuota>> {
        (**self).list_quotas(user_id, training_type)
    }

    fn count_completed(
        &self,
        user_id: UserId,
        training_type: TrainingType,
        source_id: SourceId,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64> {
        (**self).count_completed(user_id, training_type, source_id, since)
    }
}
