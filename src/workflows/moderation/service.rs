use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use super::decision::{DecisionRequest, InvalidDecisionError, ModerationDecision};
use super::domain::{
    AdminId, ListingId, ModerationAction, ModerationSource, ModerationStatus, OwnerActionTrigger,
    OwnerActionType, ReportId, UserId,
};
use super::notifications::{
    decision_notice, report_action_notice, resubmitted_notice, Notification, NotificationGateway,
};
use super::owner_actions::OwnerActionTracker;
use super::repository::{
    ContactDirectory, ListingModerationView, ListingStore, ModerationEventLog,
    ModerationEventView, NewModerationEvent, NewOwnerAction, OwnerActionStore, OwnerActionView,
    StoreError,
};
use super::reports::ReportResolution;

/// Listings run for 30 days after approval unless the owner bought a longer
/// duration.
const DEFAULT_DURATION_DAYS: u32 = 30;

const DEFAULT_REVIEW_QUEUE: &str = "moderation-queue@smartrent.vn";

/// Error raised by the moderation workflow.
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("listing not found")]
    ListingNotFound,
    #[error("a reason is required to reject or request a revision")]
    ReasonRequired,
    #[error(transparent)]
    InvalidDecision(#[from] InvalidDecisionError),
    #[error("caller is not the listing owner")]
    NotListingOwner,
    #[error("listing is not eligible for resubmission")]
    ResubmitNotAllowed,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service composing the listing store, append-only audit log, owner action
/// tracker, and notification gateway.
///
/// Each public operation is one unit of work against a single listing:
/// guards run before any write, and the audit append shares the operation's
/// fate. Only the notification step is best-effort; its failures are logged
/// and swallowed so a flaky mail transport can never undo a decision.
pub struct ListingModerationService<L, E, O, N, D> {
    listings: Arc<L>,
    events: Arc<E>,
    owner_actions: OwnerActionTracker<O>,
    gateway: Arc<N>,
    directory: Arc<D>,
    review_queue: String,
}

impl<L, E, O, N, D> ListingModerationService<L, E, O, N, D>
where
    L: ListingStore + 'static,
    E: ModerationEventLog + 'static,
    O: OwnerActionStore + 'static,
    N: NotificationGateway + 'static,
    D: ContactDirectory + 'static,
{
    pub fn new(
        listings: Arc<L>,
        events: Arc<E>,
        owner_actions: Arc<O>,
        gateway: Arc<N>,
        directory: Arc<D>,
    ) -> Self {
        Self {
            listings,
            events,
            owner_actions: OwnerActionTracker::new(owner_actions),
            gateway,
            directory,
            review_queue: DEFAULT_REVIEW_QUEUE.to_string(),
        }
    }

    /// Override the address the re-review notice is sent to.
    pub fn with_review_queue(mut self, recipient: impl Into<String>) -> Self {
        self.review_queue = recipient.into();
        self
    }

    /// Apply an admin decision to a listing.
    pub fn decide(
        &self,
        listing_id: ListingId,
        request: &DecisionRequest,
        admin_id: &AdminId,
    ) -> Result<ListingModerationView, ModerationError> {
        let command = request.normalize()?;
        let mut listing = self
            .listings
            .fetch(listing_id)?
            .ok_or(ModerationError::ListingNotFound)?;

        let previous_status = listing.moderation_status;
        let now = Utc::now();

        match command.decision {
            ModerationDecision::Approve => {
                listing.moderation_status = Some(ModerationStatus::Approved);
                listing.verified = true;
                listing.is_verify = true;
                listing.last_moderated_by = Some(admin_id.clone());
                listing.last_moderated_at = Some(now);

                // Expiry anchors on the post date when one exists, otherwise
                // on the approval time.
                let duration = i64::from(listing.duration_days.unwrap_or(DEFAULT_DURATION_DAYS));
                let base = listing.post_date.unwrap_or(now);
                listing.expiry_date = Some(base + Duration::days(duration));

                self.listings.update(listing.clone())?;

                // Approval closes out any correction loop in flight.
                self.owner_actions.complete_submitted(listing_id, now)?;
            }
            ModerationDecision::Reject | ModerationDecision::RequestRevision => {
                // Normalization already trimmed the reason and dropped
                // blanks, so presence is the whole guard.
                let reason_text = command
                    .reason_text
                    .clone()
                    .ok_or(ModerationError::ReasonRequired)?;

                let status = if command.decision == ModerationDecision::Reject {
                    ModerationStatus::Rejected
                } else {
                    ModerationStatus::RevisionRequired
                };
                listing.moderation_status = Some(status);
                listing.verified = false;
                listing.is_verify = false;
                listing.last_moderated_by = Some(admin_id.clone());
                listing.last_moderated_at = Some(now);
                listing.last_moderation_reason_code = command.reason_code.clone();
                listing.last_moderation_reason_text = Some(reason_text);

                self.listings.update(listing.clone())?;

                if command.owner_action_required {
                    self.owner_actions.create_pending(NewOwnerAction {
                        listing_id,
                        trigger: OwnerActionTrigger::ListingRejected,
                        trigger_ref_id: None,
                        required_action: OwnerActionType::UpdateListing,
                        deadline_at: command.owner_action_deadline_at,
                    })?;
                }
            }
        }

        self.events.append(NewModerationEvent {
            listing_id,
            source: submission_source(previous_status),
            from_status: previous_status,
            to_status: listing.moderation_status,
            action: command.decision.action(),
            reason_code: command.reason_code.clone(),
            reason_text: command.reason_text.clone(),
            admin_id: Some(admin_id.clone()),
            triggered_by_user_id: None,
            report_id: None,
        })?;

        info!(
            listing_id = listing_id.0,
            decision = command.decision.label(),
            admin_id = %admin_id.0,
            "listing moderated"
        );

        let notice = self.directory.owner_email(&listing.owner_id).map(|email| {
            decision_notice(
                email,
                &listing.title,
                command.decision,
                command.reason_text.as_deref(),
            )
        });
        self.dispatch(listing_id, command.decision.label(), notice);

        Ok(ListingModerationView::from_record(&listing))
    }

    /// Push an owner-corrected listing back into review.
    pub fn resubmit(
        &self,
        listing_id: ListingId,
        user_id: &UserId,
        notes: Option<&str>,
    ) -> Result<(), ModerationError> {
        let mut listing = self
            .listings
            .fetch(listing_id)?
            .ok_or(ModerationError::ListingNotFound)?;

        if listing.owner_id != *user_id {
            return Err(ModerationError::NotListingOwner);
        }

        let eligible = match listing.moderation_status {
            Some(ModerationStatus::Rejected) | Some(ModerationStatus::RevisionRequired) => true,
            // Legacy rows carry no status; a rejected one shows both flags off.
            None => !listing.verified && !listing.is_verify,
            Some(_) => false,
        };
        if !eligible {
            return Err(ModerationError::ResubmitNotAllowed);
        }

        let previous_status = listing.moderation_status;
        let now = Utc::now();

        listing.moderation_status = Some(ModerationStatus::PendingReview);
        listing.verified = false;
        listing.is_verify = true; // "in review" in the legacy projection
        listing.revision_count += 1;
        self.listings.update(listing.clone())?;

        self.owner_actions
            .advance_pending_to_submitted(listing_id, now)?;

        let notes = notes.map(str::trim).filter(|text| !text.is_empty());
        self.events.append(NewModerationEvent {
            listing_id,
            source: ModerationSource::OwnerEdit,
            from_status: previous_status,
            to_status: listing.moderation_status,
            action: ModerationAction::Resubmit,
            reason_code: None,
            reason_text: notes.map(str::to_string),
            admin_id: None,
            triggered_by_user_id: Some(user_id.clone()),
            report_id: None,
        })?;

        info!(
            listing_id = listing_id.0,
            user_id = %user_id.0,
            revision = listing.revision_count,
            "listing resubmitted for review"
        );

        let notice = resubmitted_notice(self.review_queue.clone(), &listing.title);
        self.dispatch(listing_id, "RESUBMIT", Some(notice));

        Ok(())
    }

    /// Translate a resolved content report into a corrective owner action,
    /// optionally hiding the listing until the owner has acted. A resolution
    /// that demands nothing from the owner is a no-op here.
    pub fn apply_resolution(
        &self,
        report_id: ReportId,
        listing_id: ListingId,
        resolution: &ReportResolution,
        admin_id: &AdminId,
    ) -> Result<(), ModerationError> {
        if !resolution.owner_action_required {
            return Ok(());
        }

        let mut listing = self
            .listings
            .fetch(listing_id)?
            .ok_or(ModerationError::ListingNotFound)?;

        let previous_status = listing.moderation_status;
        let now = Utc::now();
        let hides = resolution.hides_listing();

        if hides {
            listing.moderation_status = Some(ModerationStatus::RevisionRequired);
            listing.verified = false;
            listing.is_verify = false;
            listing.last_moderated_by = Some(admin_id.clone());
            listing.last_moderated_at = Some(now);
            listing.last_moderation_reason_text = resolution.admin_notes.clone();
            self.listings.update(listing.clone())?;
        }

        self.owner_actions.create_pending(NewOwnerAction {
            listing_id,
            trigger: OwnerActionTrigger::ReportResolved,
            trigger_ref_id: Some(report_id),
            required_action: OwnerActionType::parse_or_default(
                resolution.owner_action_type.as_deref(),
            ),
            deadline_at: resolution.owner_action_deadline_at,
        })?;

        self.events.append(NewModerationEvent {
            listing_id,
            source: ModerationSource::ReportResolution,
            from_status: previous_status,
            to_status: if hides {
                Some(ModerationStatus::RevisionRequired)
            } else {
                previous_status
            },
            action: ModerationAction::RequestRevision,
            reason_code: None,
            reason_text: resolution.admin_notes.clone(),
            admin_id: Some(admin_id.clone()),
            triggered_by_user_id: None,
            report_id: Some(report_id),
        })?;

        info!(
            listing_id = listing_id.0,
            report_id = report_id.0,
            hidden = hides,
            "owner action created from report resolution"
        );

        let notice = self.directory.owner_email(&listing.owner_id).map(|email| {
            report_action_notice(email, &listing.title, resolution.admin_notes.as_deref())
        });
        self.dispatch(listing_id, "REPORT_RESOLUTION", notice);

        Ok(())
    }

    /// The owner's current pending correction task, if any.
    pub fn owner_pending_action(
        &self,
        listing_id: ListingId,
    ) -> Result<Option<OwnerActionView>, ModerationError> {
        let pending = self.owner_actions.find_pending(listing_id)?;
        Ok(pending.as_ref().map(OwnerActionView::from_action))
    }

    /// Newest-first audit trail for a listing, with admin display names
    /// resolved where the directory knows them.
    pub fn moderation_timeline(
        &self,
        listing_id: ListingId,
    ) -> Result<Vec<ModerationEventView>, ModerationError> {
        let events = self.events.newest_first(listing_id)?;
        Ok(events
            .iter()
            .map(|event| {
                let admin_name = event
                    .admin_id
                    .as_ref()
                    .and_then(|admin_id| self.directory.admin_display_name(admin_id));
                ModerationEventView::from_event(event, admin_name)
            })
            .collect())
    }

    /// Fetch a listing's moderation view without mutating anything.
    pub fn moderation_view(
        &self,
        listing_id: ListingId,
    ) -> Result<ListingModerationView, ModerationError> {
        let listing = self
            .listings
            .fetch(listing_id)?
            .ok_or(ModerationError::ListingNotFound)?;
        Ok(ListingModerationView::from_record(&listing))
    }

    // Best-effort send. A missing recipient or a transport failure must never
    // unwind the decision that already committed.
    fn dispatch(&self, listing_id: ListingId, context: &str, notice: Option<Notification>) {
        let Some(notice) = notice else {
            return;
        };
        if let Err(err) = self.gateway.send(notice) {
            warn!(
                listing_id = listing_id.0,
                context,
                error = %err,
                "failed to send moderation notification"
            );
        }
    }
}

/// A decision on a listing still in (or before) its first review is a
/// NEW_SUBMISSION; deciding anything later means the owner edited and the
/// listing came back around.
fn submission_source(previous_status: Option<ModerationStatus>) -> ModerationSource {
    match previous_status {
        None | Some(ModerationStatus::PendingReview) => ModerationSource::NewSubmission,
        Some(_) => ModerationSource::OwnerEdit,
    }
}
