use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use taskpal::{
    booking::{
        locks::BookingLocks,
        repository::{BookingRepository, InMemoryBookingRepository},
    },
    message::{repository::InMemoryMessageRepository, ChatService},
    payment::client::StaticPaymentClient,
    session::{repository::InMemorySessionRepository, service::SessionService, SessionClaims},
    websockets::BookingRoomSubscriber,
    AppState, Booking, EventBus, MessageHandler, NegotiationEngine, Role, RoomRegistry,
    SessionGateway, SubscriptionManager,
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct Participant {
    pub gateway: Arc<SessionGateway>,
    pub user_id: i64,
    pub role: Role,
}

pub struct TestSetup {
    pub state: AppState,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub participants: HashMap<String, Participant>,
}

impl TestSetup {
    /// Let spawned subscription tasks drain the event bus.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    pub async fn join(&self, connection_id: &str, booking_id: i64) {
        let participant = &self.participants[connection_id];
        let raw = format!(
            r#"{{"event":"join_room","data":{{"bookingId":{},"role":"{}"}}}}"#,
            booking_id, participant.role
        );
        participant.gateway.handle_message(raw).await;
        self.settle().await;
    }

    pub async fn leave(&self, connection_id: &str, booking_id: i64) {
        let participant = &self.participants[connection_id];
        let raw = format!(
            r#"{{"event":"leave_room","data":{{"bookingId":{},"role":"{}"}}}}"#,
            booking_id, participant.role
        );
        participant.gateway.handle_message(raw).await;
        self.settle().await;
    }

    pub async fn send_chat(
        &self,
        connection_id: &str,
        booking_id: i64,
        text: &str,
        timestamp: &str,
    ) {
        let participant = &self.participants[connection_id];
        let raw = format!(
            r#"{{"event":"send_message","data":{{"bookingId":{},"sender_id":{},"sender_role":"{}","message":"{}","timestamp":"{}"}}}}"#,
            booking_id, participant.user_id, participant.role, text, timestamp
        );
        participant.gateway.handle_message(raw).await;
        self.settle().await;
    }

    pub async fn propose_price(&self, connection_id: &str, booking_id: i64, price: f64) {
        let participant = &self.participants[connection_id];
        let raw = format!(
            r#"{{"event":"propose_price","data":{{"bookingId":{},"price":{}}}}}"#,
            booking_id, price
        );
        participant.gateway.handle_message(raw).await;
        self.settle().await;
    }

    pub async fn agree_price(&self, connection_id: &str, booking_id: i64) {
        let participant = &self.participants[connection_id];
        let raw = format!(
            r#"{{"event":"agree_price","data":{{"bookingId":{},"role":"{}"}}}}"#,
            booking_id, participant.role
        );
        participant.gateway.handle_message(raw).await;
        self.settle().await;
    }

    pub async fn booking(&self, booking_id: i64) -> Booking {
        self.state
            .booking_repository
            .get_booking(booking_id)
            .await
            .unwrap()
            .expect("booking should exist")
    }
}

pub struct TestSetupBuilder {
    bookings: Vec<Booking>,
    participants: Vec<(String, i64, Role)>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            bookings: vec![],
            participants: vec![],
        }
    }

    pub fn with_booking(mut self, booking: Booking) -> Self {
        self.bookings.push(booking);
        self
    }

    pub fn with_participant(mut self, connection_id: &str, user_id: i64, role: Role) -> Self {
        self.participants
            .push((connection_id.to_string(), user_id, role));
        self
    }

    /// A client and a provider on the given booking, the common case.
    pub fn with_both_parties(self, booking: &Booking) -> Self {
        let client_id = booking.client_id;
        let provider_id = booking.provider_id;
        self.with_participant("conn-client", client_id, Role::Client)
            .with_participant("conn-provider", provider_id, Role::Provider)
    }

    pub async fn build(self) -> TestSetup {
        let booking_repository = Arc::new(InMemoryBookingRepository::new());
        for booking in &self.bookings {
            booking_repository.create_booking(booking).await.unwrap();
        }

        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let event_bus = EventBus::new();
        let locks = Arc::new(BookingLocks::new());
        let room_registry = Arc::new(RoomRegistry::new());

        let engine = Arc::new(NegotiationEngine::new(
            booking_repository.clone(),
            locks.clone(),
            event_bus.clone(),
        ));
        let chat_service = Arc::new(ChatService::new(
            Arc::new(InMemoryMessageRepository::new()),
            locks,
            event_bus.clone(),
        ));
        let subscriber = Arc::new(BookingRoomSubscriber::new(
            room_registry.clone(),
            mock_conn_manager.clone(),
        ));
        let subscriptions = Arc::new(SubscriptionManager::new(event_bus.clone(), subscriber));
        let session_service = Arc::new(SessionService::new(Arc::new(
            InMemorySessionRepository::new(),
        )));

        let state = AppState {
            booking_repository,
            engine,
            chat_service,
            room_registry,
            connection_manager: mock_conn_manager.clone(),
            event_bus,
            subscriptions,
            session_service,
            payment_client: Arc::new(StaticPaymentClient::new("https://pay.test/checkout")),
        };

        let mut participants = HashMap::new();
        for (connection_id, user_id, role) in self.participants {
            let claims = SessionClaims {
                session_id: format!("sess-{}", connection_id),
                user_id,
                role,
                exp: usize::MAX,
                iat: 0,
            };
            let gateway = Arc::new(SessionGateway::new(
                connection_id.clone(),
                claims,
                state.clone(),
            ));
            participants.insert(
                connection_id,
                Participant {
                    gateway,
                    user_id,
                    role,
                },
            );
        }

        TestSetup {
            state,
            mock_conn_manager,
            participants,
        }
    }
}
