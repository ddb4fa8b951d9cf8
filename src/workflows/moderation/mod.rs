//! Listing moderation workflow: admin decisions, owner resubmissions, and
//! report-driven corrective actions, all recorded in an append-only audit
//! trail.

pub mod decision;
pub mod domain;
pub mod memory;
pub mod notifications;
pub mod owner_actions;
pub mod reports;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use decision::{DecisionCommand, DecisionRequest, InvalidDecisionError, ModerationDecision};
pub use domain::{
    AdminId, EventId, ListingId, ListingRecord, ModerationAction, ModerationEvent,
    ModerationSource, ModerationStatus, OwnerAction, OwnerActionId, OwnerActionStatus,
    OwnerActionTrigger, OwnerActionType, ReportId, UserId,
};
pub use memory::{
    InMemoryContactDirectory, InMemoryListingStore, InMemoryModerationEventLog,
    InMemoryOwnerActionStore, RecordingNotificationGateway,
};
pub use notifications::{Notification, NotificationError, NotificationGateway};
pub use owner_actions::OwnerActionTracker;
pub use reports::ReportResolution;
pub use repository::{
    ContactDirectory, ListingModerationView, ListingStore, ModerationEventLog,
    ModerationEventView, NewModerationEvent, NewOwnerAction, OwnerActionStore, OwnerActionView,
    StoreError,
};
pub use router::{moderation_router, status_for, ResubmitRequest};
pub use service::{ListingModerationService, ModerationError};
