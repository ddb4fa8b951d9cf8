use std::sync::Arc;

use chrono::{Duration, Utc};

use smart_rent::workflows::moderation::{
    AdminId, DecisionRequest, InMemoryContactDirectory, InMemoryListingStore,
    InMemoryModerationEventLog, InMemoryOwnerActionStore, ListingId, ListingModerationService,
    ListingRecord, ListingStore, ModerationAction, ModerationSource, ModerationStatus,
    OwnerActionStatus, RecordingNotificationGateway, ReportId, ReportResolution, UserId,
};

mod common {
    use super::*;

    pub struct Workflow {
        pub service: ListingModerationService<
            InMemoryListingStore,
            InMemoryModerationEventLog,
            InMemoryOwnerActionStore,
            RecordingNotificationGateway,
            InMemoryContactDirectory,
        >,
        pub listings: Arc<InMemoryListingStore>,
        pub owner_actions: Arc<InMemoryOwnerActionStore>,
        pub gateway: Arc<RecordingNotificationGateway>,
    }

    pub fn workflow() -> Workflow {
        let listings = Arc::new(InMemoryListingStore::default());
        let owner_actions = Arc::new(InMemoryOwnerActionStore::default());
        let gateway = Arc::new(RecordingNotificationGateway::default());
        let directory = Arc::new(InMemoryContactDirectory::default());
        directory.register_admin(admin(), "Moderation Desk");
        directory.register_owner(owner(), "owner@example.com");

        let service = ListingModerationService::new(
            listings.clone(),
            Arc::new(InMemoryModerationEventLog::default()),
            owner_actions.clone(),
            gateway.clone(),
            directory,
        );

        Workflow {
            service,
            listings,
            owner_actions,
            gateway,
        }
    }

    pub fn admin() -> AdminId {
        AdminId("admin-1".to_string())
    }

    pub fn owner() -> UserId {
        UserId("user-1001".to_string())
    }

    pub fn submitted_listing(id: u64) -> ListingRecord {
        let mut record = ListingRecord::pending(ListingId(id), owner(), "District 1 studio");
        record.post_date = Some(Utc::now() - Duration::days(1));
        record.duration_days = Some(30);
        record
    }
}

use common::{admin, owner, submitted_listing, workflow};

#[test]
fn rejection_correction_and_approval_round_trip() {
    let env = workflow();
    env.listings.seed(submitted_listing(1));
    let listing = ListingId(1);

    // Admin rejects and asks the owner to act.
    let rejected = env
        .service
        .decide(
            listing,
            &DecisionRequest {
                decision: Some("REJECT".to_string()),
                reason_code: Some("MISSING_INFO".to_string()),
                reason_text: Some("bad photos".to_string()),
                owner_action_required: Some(true),
                ..DecisionRequest::default()
            },
            &admin(),
        )
        .expect("reject");
    assert_eq!(rejected.moderation_status, Some("REJECTED"));
    assert_eq!(rejected.verification_status, "REJECTED");

    let task = env
        .service
        .owner_pending_action(listing)
        .expect("query")
        .expect("task opened");
    assert_eq!(task.status, "PENDING_OWNER");
    assert_eq!(task.trigger_type, "LISTING_REJECTED");

    // Owner corrects the listing and resubmits.
    env.service
        .resubmit(listing, &owner(), Some("replaced all photos"))
        .expect("resubmit");

    let stored = env.listings.fetch(listing).unwrap().unwrap();
    assert_eq!(
        stored.moderation_status,
        Some(ModerationStatus::PendingReview)
    );
    assert_eq!(stored.revision_count, 1);
    let actions = env.owner_actions.all();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].status, OwnerActionStatus::SubmittedForReview);

    // Admin approves the corrected listing.
    let approved = env
        .service
        .decide(
            listing,
            &DecisionRequest {
                decision: Some("APPROVE".to_string()),
                ..DecisionRequest::default()
            },
            &admin(),
        )
        .expect("approve");
    assert_eq!(approved.moderation_status, Some("APPROVED"));
    assert!(approved.expiry_date.is_some());

    let stored = env.listings.fetch(listing).unwrap().unwrap();
    assert!(stored.verified);
    assert_eq!(
        stored.expiry_date,
        stored.post_date.map(|posted| posted + Duration::days(30))
    );
    assert_eq!(
        env.owner_actions.all()[0].status,
        OwnerActionStatus::Completed
    );

    // Three events, newest first, each transition linked to the one before.
    let timeline = env.service.moderation_timeline(listing).expect("timeline");
    assert_eq!(timeline.len(), 3);
    assert_eq!(timeline[0].action, "APPROVE");
    assert_eq!(timeline[1].action, "RESUBMIT");
    assert_eq!(timeline[2].action, "REJECT");
    assert_eq!(timeline[0].from_status, timeline[1].to_status);
    assert_eq!(timeline[1].from_status, timeline[2].to_status);
    assert_eq!(timeline[0].admin_name.as_deref(), Some("Moderation Desk"));
    assert_eq!(timeline[1].triggered_by_user_id, Some(owner()));

    // The owner heard about both decisions; the queue heard about the
    // resubmission.
    let sent = env.gateway.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent[0].subject.contains("rejected"));
    assert!(sent[1].subject.contains("resubmitted"));
    assert!(sent[2].subject.contains("approved"));
}

#[test]
fn report_resolution_drives_the_same_correction_loop() {
    let env = workflow();
    env.listings.seed(submitted_listing(7));
    let listing = ListingId(7);

    env.service
        .apply_resolution(
            ReportId(42),
            listing,
            &ReportResolution {
                owner_action_required: true,
                listing_visibility_action: Some("HIDE_UNTIL_REVIEW".to_string()),
                admin_notes: Some("confirm the address".to_string()),
                ..ReportResolution::default()
            },
            &admin(),
        )
        .expect("resolution");

    let stored = env.listings.fetch(listing).unwrap().unwrap();
    assert_eq!(
        stored.moderation_status,
        Some(ModerationStatus::RevisionRequired)
    );

    env.service
        .resubmit(listing, &owner(), Some("address confirmed"))
        .expect("resubmit");
    env.service
        .decide(
            listing,
            &DecisionRequest {
                decision: Some("APPROVE".to_string()),
                ..DecisionRequest::default()
            },
            &admin(),
        )
        .expect("approve");

    let actions = env.owner_actions.all();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].status, OwnerActionStatus::Completed);
    assert_eq!(actions[0].trigger_ref_id, Some(ReportId(42)));

    let timeline = env.service.moderation_timeline(listing).expect("timeline");
    assert_eq!(timeline.len(), 3);
    assert_eq!(timeline[2].source, ModerationSource::ReportResolution.label());
    assert_eq!(timeline[2].action, ModerationAction::RequestRevision.label());
    assert_eq!(timeline[2].report_id, Some(ReportId(42)));
}
