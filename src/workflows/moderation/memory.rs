//! Mutex-backed in-memory implementations of the moderation collaborators.
//! They back the demo command, the HTTP service when no database is wired,
//! and the test suites.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::domain::{
    AdminId, EventId, ListingId, ListingRecord, ModerationEvent, OwnerAction, OwnerActionId,
    OwnerActionStatus, UserId,
};
use super::notifications::{Notification, NotificationError, NotificationGateway};
use super::repository::{
    ContactDirectory, ListingStore, ModerationEventLog, NewModerationEvent, NewOwnerAction,
    OwnerActionStore, StoreError,
};

#[derive(Default, Clone)]
pub struct InMemoryListingStore {
    records: Arc<Mutex<HashMap<ListingId, ListingRecord>>>,
}

impl InMemoryListingStore {
    pub fn seed(&self, record: ListingRecord) {
        let mut guard = self.records.lock().expect("listing mutex poisoned");
        guard.insert(record.listing_id, record);
    }
}

impl ListingStore for InMemoryListingStore {
    fn fetch(&self, id: ListingId) -> Result<Option<ListingRecord>, StoreError> {
        let guard = self.records.lock().expect("listing mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn update(&self, record: ListingRecord) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("listing mutex poisoned");
        if guard.contains_key(&record.listing_id) {
            guard.insert(record.listing_id, record);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}

#[derive(Default, Clone)]
pub struct InMemoryModerationEventLog {
    events: Arc<Mutex<Vec<ModerationEvent>>>,
}

impl InMemoryModerationEventLog {
    pub fn all(&self) -> Vec<ModerationEvent> {
        self.events.lock().expect("event mutex poisoned").clone()
    }

    pub fn count_for(&self, listing_id: ListingId) -> usize {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .iter()
            .filter(|event| event.listing_id == listing_id)
            .count()
    }
}

impl ModerationEventLog for InMemoryModerationEventLog {
    fn append(&self, event: NewModerationEvent) -> Result<ModerationEvent, StoreError> {
        let mut guard = self.events.lock().expect("event mutex poisoned");
        let stored = ModerationEvent {
            event_id: EventId(guard.len() as u64 + 1),
            listing_id: event.listing_id,
            source: event.source,
            from_status: event.from_status,
            to_status: event.to_status,
            action: event.action,
            reason_code: event.reason_code,
            reason_text: event.reason_text,
            admin_id: event.admin_id,
            triggered_by_user_id: event.triggered_by_user_id,
            report_id: event.report_id,
            created_at: Utc::now(),
        };
        guard.push(stored.clone());
        Ok(stored)
    }

    fn newest_first(&self, listing_id: ListingId) -> Result<Vec<ModerationEvent>, StoreError> {
        let guard = self.events.lock().expect("event mutex poisoned");
        let mut events: Vec<ModerationEvent> = guard
            .iter()
            .filter(|event| event.listing_id == listing_id)
            .cloned()
            .collect();
        // Insertion order is creation order; newest first for the timeline.
        events.reverse();
        Ok(events)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryOwnerActionStore {
    actions: Arc<Mutex<HashMap<OwnerActionId, OwnerAction>>>,
    next_id: Arc<Mutex<u64>>,
}

impl InMemoryOwnerActionStore {
    pub fn all(&self) -> Vec<OwnerAction> {
        let mut actions: Vec<OwnerAction> = self
            .actions
            .lock()
            .expect("owner action mutex poisoned")
            .values()
            .cloned()
            .collect();
        actions.sort_by_key(|action| action.owner_action_id.0);
        actions
    }
}

impl OwnerActionStore for InMemoryOwnerActionStore {
    fn insert(&self, action: NewOwnerAction) -> Result<OwnerAction, StoreError> {
        let mut next = self.next_id.lock().expect("owner action mutex poisoned");
        *next += 1;
        let stored = OwnerAction {
            owner_action_id: OwnerActionId(*next),
            listing_id: action.listing_id,
            trigger: action.trigger,
            trigger_ref_id: action.trigger_ref_id,
            required_action: action.required_action,
            status: OwnerActionStatus::PendingOwner,
            deadline_at: action.deadline_at,
            completed_at: None,
            created_at: Utc::now(),
        };
        self.actions
            .lock()
            .expect("owner action mutex poisoned")
            .insert(stored.owner_action_id, stored.clone());
        Ok(stored)
    }

    fn by_listing_and_status(
        &self,
        listing_id: ListingId,
        status: OwnerActionStatus,
    ) -> Result<Vec<OwnerAction>, StoreError> {
        let guard = self.actions.lock().expect("owner action mutex poisoned");
        let mut actions: Vec<OwnerAction> = guard
            .values()
            .filter(|action| action.listing_id == listing_id && action.status == status)
            .cloned()
            .collect();
        actions.sort_by_key(|action| action.owner_action_id.0);
        Ok(actions)
    }

    fn update(&self, action: OwnerAction) -> Result<(), StoreError> {
        let mut guard = self.actions.lock().expect("owner action mutex poisoned");
        if guard.contains_key(&action.owner_action_id) {
            guard.insert(action.owner_action_id, action);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}

/// Directory with explicitly registered admins and owners; everyone else
/// resolves to `None`.
#[derive(Default, Clone)]
pub struct InMemoryContactDirectory {
    admins: Arc<Mutex<HashMap<AdminId, String>>>,
    owners: Arc<Mutex<HashMap<UserId, String>>>,
}

impl InMemoryContactDirectory {
    pub fn register_admin(&self, admin_id: AdminId, display_name: impl Into<String>) {
        self.admins
            .lock()
            .expect("directory mutex poisoned")
            .insert(admin_id, display_name.into());
    }

    pub fn register_owner(&self, owner_id: UserId, email: impl Into<String>) {
        self.owners
            .lock()
            .expect("directory mutex poisoned")
            .insert(owner_id, email.into());
    }
}

impl ContactDirectory for InMemoryContactDirectory {
    fn admin_display_name(&self, admin_id: &AdminId) -> Option<String> {
        self.admins
            .lock()
            .expect("directory mutex poisoned")
            .get(admin_id)
            .cloned()
    }

    fn owner_email(&self, owner_id: &UserId) -> Option<String> {
        self.owners
            .lock()
            .expect("directory mutex poisoned")
            .get(owner_id)
            .cloned()
    }
}

/// Gateway that records every message instead of delivering it.
#[derive(Default, Clone)]
pub struct RecordingNotificationGateway {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotificationGateway {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("gateway mutex poisoned").clone()
    }
}

impl NotificationGateway for RecordingNotificationGateway {
    fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("gateway mutex poisoned")
            .push(notification);
        Ok(())
    }
}
