use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for marketplace listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(pub u64);

/// Identifier wrapper for resolved content reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub u64);

/// Identifier assigned to each audit event by the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

/// Identifier assigned to each owner action task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerActionId(pub u64);

/// Identifier of a moderating administrator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminId(pub String);

/// Identifier of a listing owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// The listing's current place in the review lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModerationStatus {
    PendingReview,
    Approved,
    Rejected,
    RevisionRequired,
}

impl ModerationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ModerationStatus::PendingReview => "PENDING_REVIEW",
            ModerationStatus::Approved => "APPROVED",
            ModerationStatus::Rejected => "REJECTED",
            ModerationStatus::RevisionRequired => "REVISION_REQUIRED",
        }
    }
}

/// What triggered a recorded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModerationSource {
    NewSubmission,
    OwnerEdit,
    ReportResolution,
}

impl ModerationSource {
    pub const fn label(self) -> &'static str {
        match self {
            ModerationSource::NewSubmission => "NEW_SUBMISSION",
            ModerationSource::OwnerEdit => "OWNER_EDIT",
            ModerationSource::ReportResolution => "REPORT_RESOLUTION",
        }
    }
}

/// The verb recorded on an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModerationAction {
    Approve,
    Reject,
    RequestRevision,
    Resubmit,
}

impl ModerationAction {
    pub const fn label(self) -> &'static str {
        match self {
            ModerationAction::Approve => "APPROVE",
            ModerationAction::Reject => "REJECT",
            ModerationAction::RequestRevision => "REQUEST_REVISION",
            ModerationAction::Resubmit => "RESUBMIT",
        }
    }
}

/// Lifecycle of an owner-facing correction task. Strictly forward-moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerActionStatus {
    PendingOwner,
    SubmittedForReview,
    Completed,
}

impl OwnerActionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            OwnerActionStatus::PendingOwner => "PENDING_OWNER",
            OwnerActionStatus::SubmittedForReview => "SUBMITTED_FOR_REVIEW",
            OwnerActionStatus::Completed => "COMPLETED",
        }
    }

    /// Whether `next` is the immediate successor in the task lifecycle.
    pub const fn can_advance_to(self, next: OwnerActionStatus) -> bool {
        matches!(
            (self, next),
            (
                OwnerActionStatus::PendingOwner,
                OwnerActionStatus::SubmittedForReview
            ) | (
                OwnerActionStatus::SubmittedForReview,
                OwnerActionStatus::Completed
            )
        )
    }
}

/// What created the owner action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerActionTrigger {
    ListingRejected,
    ReportResolved,
}

impl OwnerActionTrigger {
    pub const fn label(self) -> &'static str {
        match self {
            OwnerActionTrigger::ListingRejected => "LISTING_REJECTED",
            OwnerActionTrigger::ReportResolved => "REPORT_RESOLVED",
        }
    }
}

/// The correction the owner is expected to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerActionType {
    UpdateListing,
    RemoveMedia,
}

impl OwnerActionType {
    pub const fn label(self) -> &'static str {
        match self {
            OwnerActionType::UpdateListing => "UPDATE_LISTING",
            OwnerActionType::RemoveMedia => "REMOVE_MEDIA",
        }
    }

    /// Parse a wire value, falling back to `UpdateListing` for anything
    /// unrecognized so a stale client cannot block a report resolution.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("REMOVE_MEDIA") => OwnerActionType::RemoveMedia,
            _ => OwnerActionType::UpdateListing,
        }
    }
}

/// The moderation-relevant slice of a listing row.
///
/// `moderation_status` is `None` for legacy rows created before the workflow
/// existed; `verified`/`is_verify` are the boolean mirrors old clients still
/// read. The workflow keeps them in sync: `verified` is only ever true for
/// approved listings, and rejected/revision-required listings always carry
/// `verified == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub listing_id: ListingId,
    pub owner_id: UserId,
    pub title: String,
    pub moderation_status: Option<ModerationStatus>,
    pub verified: bool,
    pub is_verify: bool,
    pub revision_count: u32,
    pub last_moderated_by: Option<AdminId>,
    pub last_moderated_at: Option<DateTime<Utc>>,
    pub last_moderation_reason_code: Option<String>,
    pub last_moderation_reason_text: Option<String>,
    pub post_date: Option<DateTime<Utc>>,
    pub duration_days: Option<u32>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl ListingRecord {
    /// Bare record in the state a freshly submitted listing enters review.
    pub fn pending(listing_id: ListingId, owner_id: UserId, title: impl Into<String>) -> Self {
        Self {
            listing_id,
            owner_id,
            title: title.into(),
            moderation_status: Some(ModerationStatus::PendingReview),
            verified: false,
            is_verify: true,
            revision_count: 0,
            last_moderated_by: None,
            last_moderated_at: None,
            last_moderation_reason_code: None,
            last_moderation_reason_text: None,
            post_date: None,
            duration_days: None,
            expiry_date: None,
        }
    }

    /// Legacy projection kept for old clients that predate `moderation_status`.
    pub fn verification_label(&self) -> &'static str {
        if self.verified {
            "APPROVED"
        } else if self.is_verify {
            "PENDING"
        } else {
            "REJECTED"
        }
    }
}

/// Immutable audit record of one state transition. Created exactly once per
/// transition and never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationEvent {
    pub event_id: EventId,
    pub listing_id: ListingId,
    pub source: ModerationSource,
    pub from_status: Option<ModerationStatus>,
    pub to_status: Option<ModerationStatus>,
    pub action: ModerationAction,
    pub reason_code: Option<String>,
    pub reason_text: Option<String>,
    pub admin_id: Option<AdminId>,
    pub triggered_by_user_id: Option<UserId>,
    pub report_id: Option<ReportId>,
    pub created_at: DateTime<Utc>,
}

/// A tracked obligation on the listing owner, created when a rejection or a
/// resolved report demands a correction before the listing can re-enter
/// review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerAction {
    pub owner_action_id: OwnerActionId,
    pub listing_id: ListingId,
    pub trigger: OwnerActionTrigger,
    pub trigger_ref_id: Option<ReportId>,
    pub required_action: OwnerActionType,
    pub status: OwnerActionStatus,
    pub deadline_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
