//! Target rotation: which source a user should be served next.
//!
//! Each user has per-source quotas for a training type. Sources are worked in
//! ascending id order; the active source is the first one whose completed
//! count is still below its limit. When all are met (or none exist) there is
//! no active source.

use chrono::{DateTime, Utc};
use log::debug;

use crate::domain::{AuthContext, Progress, QuotaTarget, SourceId, SourceProgress, TrainingType, UserId};
use crate::error::Result;
use crate::rotation::window::CountWindow;
use crate::store::QuotaStore;

/// Resolves active sources against a [`QuotaStore`].
///
/// Holds no state between calls; every call re-reads the store.
pub struct Resolver<S> {
    store: S,
    window: CountWindow,
    clock: fn() -> DateTime<Utc>,
}

impl<S: QuotaStore> Resolver<S> {
    /// Create a resolver counting over all time.
    pub fn new(store: S) -> Self {
        Self {
            store,
            window: CountWindow::default(),
            clock: Utc::now,
        }
    }

    /// Set the count window.
    pub fn with_window(mut self, window: CountWindow) -> Self {
        self.window = window;
        self
    }

    /// Replace the clock used to place the weekly window.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn window(&self) -> CountWindow {
        self.window
    }

    /// The user's quotas for `training_type`, ascending by source id.
    pub fn list_ordered_quotas(&self, user_id: UserId, training_type: TrainingType) -> Result<Vec<QuotaTarget>> {
        let mut targets: Vec<QuotaTarget> = self
            .store
            .list_quotas(user_id, training_type)?
            .iter()
            .map(|quota| quota.target())
            .collect();
        targets.sort_by_key(|target| target.source_id);
        Ok(targets)
    }

    /// Progress of the caller toward `weekly_limit` on `source_id`.
    ///
    /// Without a limit or a source the quota is unbounded: `{0, 0, false}`,
    /// and the store is not queried. A limit of 0 is always completed.
    pub fn completion_progress(
        &self,
        auth: &AuthContext,
        training_type: TrainingType,
        weekly_limit: Option<u32>,
        source_id: Option<SourceId>,
    ) -> Result<Progress> {
        let identity = auth.require()?;
        self.progress_for(identity.user_id, training_type, weekly_limit, source_id)
    }

    /// The caller's active source, or `None` when nothing is outstanding.
    pub fn next_active_source(&self, auth: &AuthContext, training_type: TrainingType) -> Result<Option<QuotaTarget>> {
        let identity = auth.require()?;
        self.next_for(identity.user_id, training_type)
    }

    /// Active source of another user. Admins only, unless `user_id` is the caller.
    pub fn next_active_source_for(
        &self,
        auth: &AuthContext,
        user_id: UserId,
        training_type: TrainingType,
    ) -> Result<Option<QuotaTarget>> {
        auth.require_self_or_admin(user_id)?;
        self.next_for(user_id, training_type)
    }

    /// Progress on every quota of the caller, in rotation order.
    pub fn progress_report(&self, auth: &AuthContext, training_type: TrainingType) -> Result<Vec<SourceProgress>> {
        let identity = auth.require()?;
        self.report_for(identity.user_id, training_type)
    }

    /// Progress report of another user. Admins only, unless `user_id` is the caller.
    pub fn progress_report_for(
        &self,
        auth: &AuthContext,
        user_id: UserId,
        training_type: TrainingType,
    ) -> Result<Vec<SourceProgress>> {
        auth.require_self_or_admin(user_id)?;
        self.report_for(user_id, training_type)
    }

    fn next_for(&self, user_id: UserId, training_type: TrainingType) -> Result<Option<QuotaTarget>> {
        let targets = self.list_ordered_quotas(user_id, training_type)?;

        for target in targets {
            let progress = self.progress_for(
                user_id,
                training_type,
                Some(target.weekly_limit),
                Some(target.source_id),
            )?;

            if !progress.is_completed {
                debug!(
                    "User {} {}: active source {} ({}/{})",
                    user_id, training_type, target.source_id, progress.completed, progress.total
                );
                return Ok(Some(target));
            }
        }

        debug!("User {} {}: no active source", user_id, training_type);
        Ok(None)
    }

    fn report_for(&self, user_id: UserId, training_type: TrainingType) -> Result<Vec<SourceProgress>> {
        let targets = self.list_ordered_quotas(user_id, training_type)?;
        let mut report = Vec::with_capacity(targets.len());
        let mut active_found = false;

        for target in targets {
            let progress = self.progress_for(
                user_id,
                training_type,
                Some(target.weekly_limit),
                Some(target.source_id),
            )?;
            let active = !active_found && !progress.is_completed;
            active_found |= active;
            report.push(SourceProgress {
                target,
                progress,
                active,
            });
        }

        Ok(report)
    }

    fn progress_for(
        &self,
        user_id: UserId,
        training_type: TrainingType,
        weekly_limit: Option<u32>,
        source_id: Option<SourceId>,
    ) -> Result<Progress> {
        let (Some(limit), Some(source)) = (weekly_limit, source_id) else {
            return Ok(Progress::unbounded());
        };

        let since = self.window.since((self.clock)());
        let completed = self.store.count_completed(user_id, training_type, source, since)?;
        Ok(Progress::counted(completed, limit))
    }
}
