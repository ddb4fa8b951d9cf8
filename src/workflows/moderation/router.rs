use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::decision::DecisionRequest;
use super::domain::{AdminId, ListingId, ReportId, UserId};
use super::notifications::NotificationGateway;
use super::repository::{ContactDirectory, ListingStore, ModerationEventLog, OwnerActionStore};
use super::reports::ReportResolution;
use super::service::{ListingModerationService, ModerationError};

/// Caller identity travels in explicit headers; the workflow never reads
/// ambient authentication state.
const ADMIN_HEADER: &str = "x-admin-id";
const USER_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResubmitRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Router builder exposing the moderation workflow over HTTP.
pub fn moderation_router<L, E, O, N, D>(
    service: Arc<ListingModerationService<L, E, O, N, D>>,
) -> Router
where
    L: ListingStore + 'static,
    E: ModerationEventLog + 'static,
    O: OwnerActionStore + 'static,
    N: NotificationGateway + 'static,
    D: ContactDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings/:listing_id/moderation/decision",
            post(decide_handler::<L, E, O, N, D>),
        )
        .route(
            "/api/v1/listings/:listing_id/moderation/resubmit",
            post(resubmit_handler::<L, E, O, N, D>),
        )
        .route(
            "/api/v1/listings/:listing_id/reports/:report_id/resolution",
            post(resolution_handler::<L, E, O, N, D>),
        )
        .route(
            "/api/v1/listings/:listing_id/moderation/owner-action",
            get(owner_action_handler::<L, E, O, N, D>),
        )
        .route(
            "/api/v1/listings/:listing_id/moderation/timeline",
            get(timeline_handler::<L, E, O, N, D>),
        )
        .with_state(service)
}

pub(crate) async fn decide_handler<L, E, O, N, D>(
    State(service): State<Arc<ListingModerationService<L, E, O, N, D>>>,
    Path(listing_id): Path<u64>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    L: ListingStore + 'static,
    E: ModerationEventLog + 'static,
    O: OwnerActionStore + 'static,
    N: NotificationGateway + 'static,
    D: ContactDirectory + 'static,
{
    let admin_id = match identity(&headers, ADMIN_HEADER) {
        Ok(value) => AdminId(value),
        Err(response) => return response,
    };

    match service.decide(ListingId(listing_id), &request, &admin_id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(&err),
    }
}

pub(crate) async fn resubmit_handler<L, E, O, N, D>(
    State(service): State<Arc<ListingModerationService<L, E, O, N, D>>>,
    Path(listing_id): Path<u64>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<ResubmitRequest>,
) -> Response
where
    L: ListingStore + 'static,
    E: ModerationEventLog + 'static,
    O: OwnerActionStore + 'static,
    N: NotificationGateway + 'static,
    D: ContactDirectory + 'static,
{
    let user_id = match identity(&headers, USER_HEADER) {
        Ok(value) => UserId(value),
        Err(response) => return response,
    };

    match service.resubmit(ListingId(listing_id), &user_id, request.notes.as_deref()) {
        Ok(()) => (
            StatusCode::ACCEPTED,
            axum::Json(json!({ "status": "PENDING_REVIEW" })),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

pub(crate) async fn resolution_handler<L, E, O, N, D>(
    State(service): State<Arc<ListingModerationService<L, E, O, N, D>>>,
    Path((listing_id, report_id)): Path<(u64, u64)>,
    headers: HeaderMap,
    axum::Json(resolution): axum::Json<ReportResolution>,
) -> Response
where
    L: ListingStore + 'static,
    E: ModerationEventLog + 'static,
    O: OwnerActionStore + 'static,
    N: NotificationGateway + 'static,
    D: ContactDirectory + 'static,
{
    let admin_id = match identity(&headers, ADMIN_HEADER) {
        Ok(value) => AdminId(value),
        Err(response) => return response,
    };

    match service.apply_resolution(
        ReportId(report_id),
        ListingId(listing_id),
        &resolution,
        &admin_id,
    ) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(&err),
    }
}

pub(crate) async fn owner_action_handler<L, E, O, N, D>(
    State(service): State<Arc<ListingModerationService<L, E, O, N, D>>>,
    Path(listing_id): Path<u64>,
) -> Response
where
    L: ListingStore + 'static,
    E: ModerationEventLog + 'static,
    O: OwnerActionStore + 'static,
    N: NotificationGateway + 'static,
    D: ContactDirectory + 'static,
{
    match service.owner_pending_action(ListingId(listing_id)) {
        Ok(Some(view)) => (StatusCode::OK, axum::Json(view)).into_response(),
        Ok(None) => (StatusCode::OK, axum::Json(json!(null))).into_response(),
        Err(err) => error_response(&err),
    }
}

pub(crate) async fn timeline_handler<L, E, O, N, D>(
    State(service): State<Arc<ListingModerationService<L, E, O, N, D>>>,
    Path(listing_id): Path<u64>,
) -> Response
where
    L: ListingStore + 'static,
    E: ModerationEventLog + 'static,
    O: OwnerActionStore + 'static,
    N: NotificationGateway + 'static,
    D: ContactDirectory + 'static,
{
    match service.moderation_timeline(ListingId(listing_id)) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(err) => error_response(&err),
    }
}

fn identity(headers: &HeaderMap, header: &str) -> Result<String, Response> {
    match headers.get(header).and_then(|value| value.to_str().ok()) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err((
            StatusCode::BAD_REQUEST,
            axum::Json(json!({ "error": format!("missing {header} header") })),
        )
            .into_response()),
    }
}

/// Status code for a workflow error. Shared with the app-level error type so
/// both surfaces report the same code for the same failure.
pub fn status_for(err: &ModerationError) -> StatusCode {
    match err {
        ModerationError::ListingNotFound => StatusCode::NOT_FOUND,
        ModerationError::ReasonRequired | ModerationError::InvalidDecision(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ModerationError::NotListingOwner => StatusCode::FORBIDDEN,
        ModerationError::ResubmitNotAllowed => StatusCode::CONFLICT,
        ModerationError::Store(super::repository::StoreError::Conflict) => StatusCode::CONFLICT,
        ModerationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &ModerationError) -> Response {
    (
        status_for(err),
        axum::Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}
