use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    AdminId, EventId, ListingId, ListingRecord, ModerationAction, ModerationEvent,
    ModerationSource, ModerationStatus, OwnerAction, OwnerActionId, OwnerActionStatus,
    OwnerActionTrigger, OwnerActionType, ReportId, UserId,
};

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for the moderation slice of the listing row. The
/// moderation workflow is the only writer of these fields.
pub trait ListingStore: Send + Sync {
    fn fetch(&self, id: ListingId) -> Result<Option<ListingRecord>, StoreError>;
    fn update(&self, record: ListingRecord) -> Result<(), StoreError>;
}

/// Event to be appended; the log assigns the id and timestamp.
#[derive(Debug, Clone)]
pub struct NewModerationEvent {
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
}

/// Append-only audit log. The interface exposes no update or delete on
/// purpose: corrections are recorded as new events, never as edits.
pub trait ModerationEventLog: Send + Sync {
    fn append(&self, event: NewModerationEvent) -> Result<ModerationEvent, StoreError>;
    fn newest_first(&self, listing_id: ListingId) -> Result<Vec<ModerationEvent>, StoreError>;
}

/// Owner action to be inserted; the store assigns the id and timestamp.
/// Tasks always start at `PendingOwner`.
#[derive(Debug, Clone)]
pub struct NewOwnerAction {
    pub listing_id: ListingId,
    pub trigger: OwnerActionTrigger,
    pub trigger_ref_id: Option<ReportId>,
    pub required_action: OwnerActionType,
    pub deadline_at: Option<DateTime<Utc>>,
}

/// Storage abstraction for owner action tasks.
pub trait OwnerActionStore: Send + Sync {
    fn insert(&self, action: NewOwnerAction) -> Result<OwnerAction, StoreError>;
    fn by_listing_and_status(
        &self,
        listing_id: ListingId,
        status: OwnerActionStatus,
    ) -> Result<Vec<OwnerAction>, StoreError>;
    fn update(&self, action: OwnerAction) -> Result<(), StoreError>;
}

/// Collaborator lookup for display names and contact addresses. Resolution
/// failures are not errors here; a missing entry simply yields `None`.
pub trait ContactDirectory: Send + Sync {
    fn admin_display_name(&self, admin_id: &AdminId) -> Option<String>;
    fn owner_email(&self, owner_id: &UserId) -> Option<String>;
}

/// Moderation view of a listing returned from the decide endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ListingModerationView {
    pub listing_id: ListingId,
    pub moderation_status: Option<&'static str>,
    pub verification_status: &'static str,
    pub revision_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_moderation_reason_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_moderation_reason_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl ListingModerationView {
    pub fn from_record(record: &ListingRecord) -> Self {
        Self {
            listing_id: record.listing_id,
            moderation_status: record.moderation_status.map(ModerationStatus::label),
            verification_status: record.verification_label(),
            revision_count: record.revision_count,
            last_moderation_reason_code: record.last_moderation_reason_code.clone(),
            last_moderation_reason_text: record.last_moderation_reason_text.clone(),
            expiry_date: record.expiry_date,
        }
    }
}

/// Timeline entry with the admin's display name resolved where available.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationEventView {
    pub event_id: EventId,
    pub listing_id: ListingId,
    pub source: &'static str,
    pub from_status: Option<&'static str>,
    pub to_status: Option<&'static str>,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<AdminId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_by_user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<ReportId>,
    pub created_at: DateTime<Utc>,
}

impl ModerationEventView {
    pub fn from_event(event: &ModerationEvent, admin_name: Option<String>) -> Self {
        Self {
            event_id: event.event_id,
            listing_id: event.listing_id,
            source: event.source.label(),
            from_status: event.from_status.map(ModerationStatus::label),
            to_status: event.to_status.map(ModerationStatus::label),
            action: event.action.label(),
            reason_code: event.reason_code.clone(),
            reason_text: event.reason_text.clone(),
            admin_id: event.admin_id.clone(),
            admin_name,
            triggered_by_user_id: event.triggered_by_user_id.clone(),
            report_id: event.report_id,
            created_at: event.created_at,
        }
    }
}

/// Owner-facing view of a pending correction task.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerActionView {
    pub owner_action_id: OwnerActionId,
    pub listing_id: ListingId,
    pub trigger_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_ref_id: Option<ReportId>,
    pub required_action: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OwnerActionView {
    pub fn from_action(action: &OwnerAction) -> Self {
        Self {
            owner_action_id: action.owner_action_id,
            listing_id: action.listing_id,
            trigger_type: action.trigger.label(),
            trigger_ref_id: action.trigger_ref_id,
            required_action: action.required_action.label(),
            status: action.status.label(),
            deadline_at: action.deadline_at,
            completed_at: action.completed_at,
            created_at: action.created_at,
        }
    }
}
