use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::services::{BookingService, InMemoryLedger, MissedAppointmentSweeper};
use doctor_cell::handlers::DoctorCellState;
use doctor_cell::services::{DoctorDirectoryService, InMemoryCalendar};
use notification_cell::services::{
    LogNotifier, NotificationDispatcher, Notifier, WebhookNotifier,
};
use shared_config::AppConfig;
use shared_utils::SystemClock;

const NOTIFICATION_QUEUE_CAPACITY: usize = 64;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic scheduling API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Wire up the cells
    let directory = Arc::new(DoctorDirectoryService::new());
    let calendar = Arc::new(InMemoryCalendar::new());
    let ledger = Arc::new(InMemoryLedger::new());
    let clock = Arc::new(SystemClock);

    let notifier: Arc<dyn Notifier> = if config.is_notification_configured() {
        Arc::new(WebhookNotifier::new(config.notify_webhook_url.clone()))
    } else {
        Arc::new(LogNotifier)
    };
    let dispatcher = Arc::new(NotificationDispatcher::start(
        notifier,
        NOTIFICATION_QUEUE_CAPACITY,
    ));

    let booking = Arc::new(BookingService::new(
        directory.clone(),
        calendar.clone(),
        ledger.clone(),
        clock.clone(),
        dispatcher,
    ));

    // Background sweeper that marks overdue appointments as missed
    let sweeper = MissedAppointmentSweeper::new(
        ledger,
        clock,
        config.sweep_interval_secs,
        config.missed_grace_minutes,
    );
    tokio::spawn(async move { sweeper.run().await });

    let doctor_state = DoctorCellState {
        directory,
        calendar,
    };

    // Build the application router
    let app = router::create_router(doctor_state, booking)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    info!("Listening on {}", config.listen_addr);

    let listener = TcpListener::bind(&config.listen_addr).await.unwrap();
    axum::serve(listener, app)
        .await
        .unwrap();
}
