use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use smart_rent::config::AppConfig;
use smart_rent::error::AppError;
use smart_rent::telemetry;
use smart_rent::workflows::moderation::{
    moderation_router, AdminId, DecisionRequest, InMemoryContactDirectory, InMemoryListingStore,
    InMemoryModerationEventLog, InMemoryOwnerActionStore, ListingId, ListingModerationService,
    ListingRecord, RecordingNotificationGateway, ReportId, ReportResolution, UserId,
};

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "SmartRent Moderation",
    about = "Run the listing moderation workflow service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Moderation workflow utilities
    Moderation {
        #[command(subcommand)]
        command: ModerationCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum ModerationCommand {
    /// Walk a listing through reject, resubmit, and approve, then print the
    /// audit timeline
    Demo,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Moderation {
            command: ModerationCommand::Demo,
        } => run_moderation_demo(),
    }
}

fn build_service(
    review_queue: &str,
) -> (
    Arc<
        ListingModerationService<
            InMemoryListingStore,
            InMemoryModerationEventLog,
            InMemoryOwnerActionStore,
            RecordingNotificationGateway,
            InMemoryContactDirectory,
        >,
    >,
    InMemoryListingStore,
    InMemoryContactDirectory,
) {
    let listings = InMemoryListingStore::default();
    let directory = InMemoryContactDirectory::default();
    let service = ListingModerationService::new(
        Arc::new(listings.clone()),
        Arc::new(InMemoryModerationEventLog::default()),
        Arc::new(InMemoryOwnerActionStore::default()),
        Arc::new(RecordingNotificationGateway::default()),
        Arc::new(directory.clone()),
    )
    .with_review_queue(review_queue);

    (Arc::new(service), listings, directory)
}

fn seed_sample_listings(listings: &InMemoryListingStore, directory: &InMemoryContactDirectory) {
    let owner = UserId("user-1001".to_string());
    directory.register_owner(owner.clone(), "owner-1001@example.com");
    directory.register_admin(AdminId("admin-1".to_string()), "Moderation Desk");

    let mut studio = ListingRecord::pending(ListingId(1), owner.clone(), "Sunny District 1 studio");
    studio.post_date = Some(Utc::now() - Duration::days(1));
    studio.duration_days = Some(30);
    listings.seed(studio);

    listings.seed(ListingRecord::pending(
        ListingId(2),
        owner,
        "Riverside two-bedroom with balcony",
    ));
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let (service, listings, directory) = build_service(&config.moderation.review_queue);
    seed_sample_listings(&listings, &directory);

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(prometheus_layer)
        .with_state(state)
        .merge(moderation_router(service));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "listing moderation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_moderation_demo() -> Result<(), AppError> {
    let (service, listings, directory) = build_service("moderation-queue@smartrent.vn");
    seed_sample_listings(&listings, &directory);

    let listing = ListingId(1);
    let admin = AdminId("admin-1".to_string());
    let owner = UserId("user-1001".to_string());

    println!("Listing moderation demo");

    let rejected = service.decide(
        listing,
        &DecisionRequest {
            decision: Some("REJECT".to_string()),
            reason_code: Some("MISSING_INFO".to_string()),
            reason_text: Some("Photos do not show the actual unit".to_string()),
            owner_action_required: Some(true),
            ..DecisionRequest::default()
        },
        &admin,
    )?;
    println!(
        "- rejected: status {:?}, revision {}",
        rejected.moderation_status, rejected.revision_count
    );

    service.resubmit(listing, &owner, Some("Replaced all photos"))?;
    println!("- owner resubmitted");

    let approved = service.decide(
        listing,
        &DecisionRequest {
            decision: Some("APPROVE".to_string()),
            ..DecisionRequest::default()
        },
        &admin,
    )?;
    println!(
        "- approved: status {:?}, expires {:?}",
        approved.moderation_status, approved.expiry_date
    );

    service.apply_resolution(
        ReportId(501),
        ListingId(2),
        &ReportResolution {
            owner_action_required: true,
            listing_visibility_action: Some("HIDE_UNTIL_REVIEW".to_string()),
            admin_notes: Some("Address looks inaccurate, please confirm".to_string()),
            ..ReportResolution::default()
        },
        &admin,
    )?;
    println!("- report resolution applied to listing 2");

    println!("\nTimeline for listing 1 (newest first)");
    for event in service.moderation_timeline(listing)? {
        println!(
            "- {} {} {} -> {} (by {})",
            event.created_at.format("%Y-%m-%d %H:%M:%S"),
            event.action,
            event.from_status.unwrap_or("-"),
            event.to_status.unwrap_or("-"),
            event
                .admin_name
                .or(event.admin_id.map(|id| id.0))
                .or(event.triggered_by_user_id.map(|id| id.0))
                .unwrap_or_else(|| "system".to_string()),
        );
    }

    if let Some(action) = service.owner_pending_action(ListingId(2))? {
        println!(
            "\nPending owner action on listing 2: {} ({})",
            action.required_action, action.trigger_type
        );
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
