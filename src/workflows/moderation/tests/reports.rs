use chrono::{Duration, Utc};

use super::common::{admin, harness, pending_listing};
use crate::workflows::moderation::domain::{
    ListingId, ModerationAction, ModerationSource, ModerationStatus, OwnerActionStatus,
    OwnerActionTrigger, OwnerActionType, ReportId,
};
use crate::workflows::moderation::reports::ReportResolution;
use crate::workflows::moderation::repository::ListingStore;
use crate::workflows::moderation::service::ModerationError;

fn resolution() -> ReportResolution {
    ReportResolution {
        owner_action_required: true,
        admin_notes: Some("address does not match the photos".to_string()),
        ..ReportResolution::default()
    }
}

#[test]
fn resolution_without_owner_action_is_a_noop() {
    let env = harness();
    let listing = pending_listing(1);
    env.listings.seed(listing.clone());

    env.service
        .apply_resolution(
            ReportId(9),
            ListingId(1),
            &ReportResolution::default(),
            &admin(),
        )
        .expect("noop resolution");

    assert_eq!(env.listings.fetch(ListingId(1)).unwrap().unwrap(), listing);
    assert_eq!(env.events.count_for(ListingId(1)), 0);
    assert!(env.owner_actions.all().is_empty());
    assert!(env.gateway.sent().is_empty());
}

#[test]
fn resolution_opens_an_owner_action_referencing_the_report() {
    let env = harness();
    env.listings.seed(pending_listing(1));
    let deadline = Utc::now() + Duration::days(3);

    env.service
        .apply_resolution(
            ReportId(9),
            ListingId(1),
            &ReportResolution {
                owner_action_deadline_at: Some(deadline),
                ..resolution()
            },
            &admin(),
        )
        .expect("resolution");

    let actions = env.owner_actions.all();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].trigger, OwnerActionTrigger::ReportResolved);
    assert_eq!(actions[0].trigger_ref_id, Some(ReportId(9)));
    assert_eq!(actions[0].status, OwnerActionStatus::PendingOwner);
    assert_eq!(actions[0].deadline_at, Some(deadline));
}

#[test]
fn hide_until_review_pulls_the_listing() {
    let env = harness();
    env.listings.seed(pending_listing(1));

    env.service
        .apply_resolution(
            ReportId(9),
            ListingId(1),
            &ReportResolution {
                listing_visibility_action: Some("HIDE_UNTIL_REVIEW".to_string()),
                ..resolution()
            },
            &admin(),
        )
        .expect("resolution");

    let stored = env.listings.fetch(ListingId(1)).unwrap().unwrap();
    assert_eq!(
        stored.moderation_status,
        Some(ModerationStatus::RevisionRequired)
    );
    assert!(!stored.verified);
    assert!(!stored.is_verify);
    assert_eq!(
        stored.last_moderation_reason_text.as_deref(),
        Some("address does not match the photos")
    );
    assert_eq!(stored.last_moderated_by, Some(admin()));
}

#[test]
fn visibility_action_matching_is_case_insensitive() {
    let env = harness();
    env.listings.seed(pending_listing(1));

    env.service
        .apply_resolution(
            ReportId(9),
            ListingId(1),
            &ReportResolution {
                listing_visibility_action: Some(" hide_until_review ".to_string()),
                ..resolution()
            },
            &admin(),
        )
        .expect("resolution");

    let stored = env.listings.fetch(ListingId(1)).unwrap().unwrap();
    assert_eq!(
        stored.moderation_status,
        Some(ModerationStatus::RevisionRequired)
    );
}

#[test]
fn other_visibility_actions_leave_the_listing_alone() {
    let env = harness();
    let listing = pending_listing(1);
    env.listings.seed(listing.clone());

    env.service
        .apply_resolution(
            ReportId(9),
            ListingId(1),
            &ReportResolution {
                listing_visibility_action: Some("KEEP_VISIBLE".to_string()),
                ..resolution()
            },
            &admin(),
        )
        .expect("resolution");

    let stored = env.listings.fetch(ListingId(1)).unwrap().unwrap();
    assert_eq!(stored.moderation_status, listing.moderation_status);
    assert_eq!(stored.verified, listing.verified);
    // The owner action and the audit event are still created.
    assert_eq!(env.owner_actions.all().len(), 1);
    assert_eq!(env.events.count_for(ListingId(1)), 1);
}

#[test]
fn unrecognized_owner_action_type_defaults_to_update_listing() {
    let env = harness();
    env.listings.seed(pending_listing(1));

    env.service
        .apply_resolution(
            ReportId(9),
            ListingId(1),
            &ReportResolution {
                owner_action_type: Some("REPAINT_WALLS".to_string()),
                ..resolution()
            },
            &admin(),
        )
        .expect("resolution");

    let actions = env.owner_actions.all();
    assert_eq!(actions[0].required_action, OwnerActionType::UpdateListing);
}

#[test]
fn remove_media_action_type_is_honored() {
    let env = harness();
    env.listings.seed(pending_listing(1));

    env.service
        .apply_resolution(
            ReportId(9),
            ListingId(1),
            &ReportResolution {
                owner_action_type: Some("REMOVE_MEDIA".to_string()),
                ..resolution()
            },
            &admin(),
        )
        .expect("resolution");

    let actions = env.owner_actions.all();
    assert_eq!(actions[0].required_action, OwnerActionType::RemoveMedia);
}

#[test]
fn resolution_event_carries_the_report_source() {
    let env = harness();
    env.listings.seed(pending_listing(1));

    env.service
        .apply_resolution(
            ReportId(9),
            ListingId(1),
            &ReportResolution {
                listing_visibility_action: Some("HIDE_UNTIL_REVIEW".to_string()),
                ..resolution()
            },
            &admin(),
        )
        .expect("resolution");

    let events = env.events.all();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source, ModerationSource::ReportResolution);
    assert_eq!(events[0].action, ModerationAction::RequestRevision);
    assert_eq!(events[0].report_id, Some(ReportId(9)));
    assert_eq!(
        events[0].from_status,
        Some(ModerationStatus::PendingReview)
    );
    assert_eq!(
        events[0].to_status,
        Some(ModerationStatus::RevisionRequired)
    );
}

#[test]
fn event_status_is_unchanged_when_the_listing_stays_visible() {
    let env = harness();
    env.listings.seed(pending_listing(1));

    env.service
        .apply_resolution(ReportId(9), ListingId(1), &resolution(), &admin())
        .expect("resolution");

    let events = env.events.all();
    assert_eq!(
        events[0].from_status,
        Some(ModerationStatus::PendingReview)
    );
    assert_eq!(events[0].to_status, Some(ModerationStatus::PendingReview));
}

#[test]
fn resolution_notifies_the_owner() {
    let env = harness();
    env.listings.seed(pending_listing(1));

    env.service
        .apply_resolution(ReportId(9), ListingId(1), &resolution(), &admin())
        .expect("resolution");

    let sent = env.gateway.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "owner@example.com");
    assert!(sent[0].subject.contains("Action required"));
    assert!(sent[0].body.contains("address does not match the photos"));
}

#[test]
fn resolution_for_unknown_listing_is_not_found() {
    let env = harness();
    let err = env
        .service
        .apply_resolution(ReportId(9), ListingId(404), &resolution(), &admin())
        .expect_err("missing listing");
    assert!(matches!(err, ModerationError::ListingNotFound));
}
