use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskpal::booking::handlers::{agree_price, get_booking, propose_price};
use taskpal::booking::locks::BookingLocks;
use taskpal::booking::repository::{
    BookingRepository, InMemoryBookingRepository, PostgresBookingRepository,
};
use taskpal::message::repository::{
    InMemoryMessageRepository, MessageRepository, PostgresMessageRepository,
};
use taskpal::message::ChatService;
use taskpal::negotiation::NegotiationEngine;
use taskpal::payment::client::{HttpPaymentClient, PaymentClient, StaticPaymentClient};
use taskpal::payment::create_payment_intent;
use taskpal::room::{start_cleanup_task, CleanupConfig, RoomRegistry};
use taskpal::session::repository::InMemorySessionRepository;
use taskpal::session::service::SessionService;
use taskpal::session::{create_session, jwt_auth};
use taskpal::shared::AppState;
use taskpal::websockets::{websocket_handler, BookingRoomSubscriber, InMemoryConnectionManager};
use taskpal::{EventBus, SubscriptionManager};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskpal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TaskPal negotiation server");

    // Create shared application state with dependency injection.
    // PostgreSQL stores when DATABASE_URL is set, in-memory otherwise.
    let (booking_repository, message_repository): (
        Arc<dyn BookingRepository + Send + Sync>,
        Arc<dyn MessageRepository + Send + Sync>,
    ) = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .expect("Failed to connect to database");
            info!("Using PostgreSQL stores");
            (
                Arc::new(PostgresBookingRepository::new(pool.clone())),
                Arc::new(PostgresMessageRepository::new(pool)),
            )
        }
        Err(_) => {
            info!("DATABASE_URL not set, using in-memory stores");
            (
                Arc::new(InMemoryBookingRepository::new()),
                Arc::new(InMemoryMessageRepository::new()),
            )
        }
    };

    let event_bus = EventBus::new();
    let locks = Arc::new(BookingLocks::new());
    let room_registry = Arc::new(RoomRegistry::new());
    let connection_manager = Arc::new(InMemoryConnectionManager::new());

    let engine = Arc::new(NegotiationEngine::new(
        booking_repository.clone(),
        locks.clone(),
        event_bus.clone(),
    ));
    let chat_service = Arc::new(ChatService::new(
        message_repository,
        locks.clone(),
        event_bus.clone(),
    ));

    let subscriber = Arc::new(BookingRoomSubscriber::new(
        room_registry.clone(),
        connection_manager.clone(),
    ));
    let subscriptions = Arc::new(SubscriptionManager::new(event_bus.clone(), subscriber));

    let session_service = Arc::new(SessionService::new(Arc::new(
        InMemorySessionRepository::new(),
    )));

    // Reclaim channels, subscription tasks and lock entries of empty rooms
    tokio::spawn(start_cleanup_task(
        room_registry.clone(),
        event_bus.clone(),
        subscriptions.clone(),
        locks.clone(),
        CleanupConfig::default(),
    ));

    let payment_client: Arc<dyn PaymentClient + Send + Sync> =
        match std::env::var("PAYMENT_PROVIDER_URL") {
            Ok(endpoint) => Arc::new(HttpPaymentClient::new(endpoint)),
            Err(_) => Arc::new(StaticPaymentClient::new("http://localhost:3000/checkout")),
        };

    let app_state = AppState {
        booking_repository,
        engine,
        chat_service,
        room_registry,
        connection_manager,
        event_bus,
        subscriptions,
        session_service,
        payment_client,
    };

    // Booking and payment routes require a valid session token
    let protected = Router::new()
        .route("/bookings/:id", get(get_booking))
        .route("/bookings/:id/price", put(propose_price))
        .route("/bookings/:id/agree", put(agree_price))
        .route("/payments/create-intent/:id", post(create_payment_intent))
        .layer(middleware::from_fn_with_state(app_state.clone(), jwt_auth));

    let app = Router::new()
        .route("/", get(|| async { "TaskPal negotiation server" }))
        .route("/session", post(create_session))
        .route("/ws", get(websocket_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
