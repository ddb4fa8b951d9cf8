use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{ListingId, OwnerAction, OwnerActionStatus};
use super::repository::{NewOwnerAction, OwnerActionStore, StoreError};

/// Tracks "owner must act" tasks for a listing.
///
/// Every task moves forward only: `PendingOwner` when created, then
/// `SubmittedForReview` once the owner resubmits, then `Completed` when a
/// moderator approves the corrected listing. All transitions run through this
/// tracker so no caller can regress or skip a state.
pub struct OwnerActionTracker<S> {
    store: Arc<S>,
}

impl<S> OwnerActionTracker<S>
where
    S: OwnerActionStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Open a new task at `PendingOwner`.
    pub fn create_pending(&self, action: NewOwnerAction) -> Result<OwnerAction, StoreError> {
        self.store.insert(action)
    }

    /// The owner's current task, if any. When several are open the
    /// earliest-created one is the task surfaced to the owner.
    pub fn find_pending(&self, listing_id: ListingId) -> Result<Option<OwnerAction>, StoreError> {
        let mut pending = self
            .store
            .by_listing_and_status(listing_id, OwnerActionStatus::PendingOwner)?;
        pending.sort_by_key(|action| (action.created_at, action.owner_action_id.0));
        Ok(pending.into_iter().next())
    }

    /// Move every `PendingOwner` task to `SubmittedForReview`, stamping the
    /// completion time. An empty set is not an error: a resubmission without
    /// an open task is still a valid resubmission.
    pub fn advance_pending_to_submitted(
        &self,
        listing_id: ListingId,
        now: DateTime<Utc>,
    ) -> Result<Vec<OwnerAction>, StoreError> {
        self.advance(
            listing_id,
            OwnerActionStatus::PendingOwner,
            OwnerActionStatus::SubmittedForReview,
            now,
        )
    }

    /// Move every `SubmittedForReview` task to `Completed`. Called when a
    /// subsequent approval closes out the correction loop.
    pub fn complete_submitted(
        &self,
        listing_id: ListingId,
        now: DateTime<Utc>,
    ) -> Result<Vec<OwnerAction>, StoreError> {
        self.advance(
            listing_id,
            OwnerActionStatus::SubmittedForReview,
            OwnerActionStatus::Completed,
            now,
        )
    }

    fn advance(
        &self,
        listing_id: ListingId,
        from: OwnerActionStatus,
        to: OwnerActionStatus,
        now: DateTime<Utc>,
    ) -> Result<Vec<OwnerAction>, StoreError> {
        debug_assert!(from.can_advance_to(to));

        let mut advanced = Vec::new();
        for mut action in self.store.by_listing_and_status(listing_id, from)? {
            if !action.status.can_advance_to(to) {
                continue;
            }
            action.status = to;
            action.completed_at = Some(now);
            self.store.update(action.clone())?;
            advanced.push(action);
        }
        Ok(advanced)
    }
}
