use std::sync::Arc;

use axum::response::Response;
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::workflows::moderation::domain::{
    AdminId, ListingId, ListingRecord, ModerationStatus, UserId,
};
use crate::workflows::moderation::memory::{
    InMemoryContactDirectory, InMemoryListingStore, InMemoryModerationEventLog,
    InMemoryOwnerActionStore, RecordingNotificationGateway,
};
use crate::workflows::moderation::notifications::{
    Notification, NotificationError, NotificationGateway,
};
use crate::workflows::moderation::repository::{ListingStore, StoreError};
use crate::workflows::moderation::service::ListingModerationService;

pub(super) type MemoryService = ListingModerationService<
    InMemoryListingStore,
    InMemoryModerationEventLog,
    InMemoryOwnerActionStore,
    RecordingNotificationGateway,
    InMemoryContactDirectory,
>;

pub(super) struct Harness {
    pub(super) service: MemoryService,
    pub(super) listings: Arc<InMemoryListingStore>,
    pub(super) events: Arc<InMemoryModerationEventLog>,
    pub(super) owner_actions: Arc<InMemoryOwnerActionStore>,
    pub(super) gateway: Arc<RecordingNotificationGateway>,
}

pub(super) fn harness() -> Harness {
    let listings = Arc::new(InMemoryListingStore::default());
    let events = Arc::new(InMemoryModerationEventLog::default());
    let owner_actions = Arc::new(InMemoryOwnerActionStore::default());
    let gateway = Arc::new(RecordingNotificationGateway::default());
    let directory = Arc::new(InMemoryContactDirectory::default());

    directory.register_admin(admin(), "Moderation Desk");
    directory.register_owner(owner(), "owner@example.com");

    let service = ListingModerationService::new(
        listings.clone(),
        events.clone(),
        owner_actions.clone(),
        gateway.clone(),
        directory,
    );

    Harness {
        service,
        listings,
        events,
        owner_actions,
        gateway,
    }
}

pub(super) fn admin() -> AdminId {
    AdminId("admin-7".to_string())
}

pub(super) fn owner() -> UserId {
    UserId("user-42".to_string())
}

pub(super) fn other_user() -> UserId {
    UserId("user-99".to_string())
}

pub(super) fn pending_listing(id: u64) -> ListingRecord {
    let mut record = ListingRecord::pending(ListingId(id), owner(), "District 1 studio");
    record.post_date = Some(Utc::now() - Duration::days(2));
    record.duration_days = Some(30);
    record
}

pub(super) fn rejected_listing(id: u64) -> ListingRecord {
    let mut record = pending_listing(id);
    record.moderation_status = Some(ModerationStatus::Rejected);
    record.verified = false;
    record.is_verify = false;
    record.last_moderation_reason_text = Some("bad photos".to_string());
    record
}

pub(super) fn approved_listing(id: u64) -> ListingRecord {
    let mut record = pending_listing(id);
    record.moderation_status = Some(ModerationStatus::Approved);
    record.verified = true;
    record.is_verify = true;
    record
}

/// Legacy row from before the workflow existed: no status, both flags off.
pub(super) fn legacy_rejected_listing(id: u64) -> ListingRecord {
    let mut record = pending_listing(id);
    record.moderation_status = None;
    record.verified = false;
    record.is_verify = false;
    record
}

pub(super) struct FailingNotificationGateway;

impl NotificationGateway for FailingNotificationGateway {
    fn send(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp offline".to_string()))
    }
}

pub(super) struct UnavailableListingStore;

impl ListingStore for UnavailableListingStore {
    fn fetch(&self, _id: ListingId) -> Result<Option<ListingRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ListingRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
