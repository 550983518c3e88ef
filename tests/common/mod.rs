//! Общие заготовки для интеграционных тестов: событие в формате бэкенда,
//! участники из `fake` и шлюз в памяти, который считает вызовы.

#![allow(dead_code)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use serde_json::json;

use ticket_storefront::config::{
    AppConfig, CircuitBreakerConfig, Config, GatewayConfig, LogFormat, PaymentConfig,
    TierSelection, WizardConfig,
};
use ticket_storefront::error::{GatewayError, GatewayResult};
use ticket_storefront::models::{Event, Participant, ParticipantField, Producer};
use ticket_storefront::services::gateway::{
    PaymentPreference, TicketGateway, TicketReceipt, TicketSubmission,
};
use ticket_storefront::wizard::{ProofFile, Wizard};

pub const WALLET_KEY: &str = "APP_USR-event-key";

/// Событие так, как его отдаёт `/producer/domain`.
pub fn event_json() -> serde_json::Value {
    json!({
        "id": 12,
        "name": "Noche de Cumbia",
        "description": "Fiesta de fin de año",
        "startDate": "2025-12-20T23:00:00Z",
        "endDate": "2025-12-21T06:00:00Z",
        "location": "Club Atlético, Córdoba",
        "status": "ACTIVE",
        "alias": "cumbia.fiesta / banco nación",
        "createdAt": "2025-10-01T10:00:00Z",
        "prevents": [
            {
                "id": 1,
                "name": "Primera tanda",
                "price": 1000,
                "quantity": 100,
                "status": "ACTIVE",
                "createdAt": "2025-10-02T10:00:00Z"
            },
            {
                "id": 2,
                "name": "Segunda tanda",
                "price": "1500.00",
                "quantity": 200,
                "status": "ACTIVE",
                "createdAt": "2025-10-10T10:00:00Z"
            },
            {
                "id": 3,
                "name": "Anticipada",
                "price": 800,
                "quantity": 50,
                "status": "SOLD_OUT",
                "createdAt": "2025-09-20T10:00:00Z"
            }
        ],
        "oAuthMercadoPago": {
            "id": 4,
            "mpUserName": "cumbia-prod",
            "mpPublicKey": WALLET_KEY
        }
    })
}

pub fn event() -> Event {
    serde_json::from_value(event_json()).expect("fixture event must deserialize")
}

/// То же событие без привязанного кошелька.
pub fn event_without_wallet() -> Event {
    let mut event = event();
    event.wallet_account = None;
    event
}

pub fn producer_json() -> serde_json::Value {
    json!({
        "id": 5,
        "name": "Cumbia Producciones",
        "domain": "cumbia.example.com",
        "events": [event_json()]
    })
}

pub fn producer() -> Producer {
    serde_json::from_value(producer_json()).expect("fixture producer must deserialize")
}

/// Конфигурация витрины для тестов, без чтения окружения.
pub fn config(api_url: &str) -> Config {
    Config {
        app: AppConfig {
            environment: "test".to_string(),
            rust_log: "ticket_storefront=debug".to_string(),
            log_format: LogFormat::Pretty,
        },
        gateway: GatewayConfig {
            api_url: api_url.to_string(),
            request_timeout_secs: 5,
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 3,
                reset_timeout_secs: 60,
            },
        },
        payment: PaymentConfig::default(),
        wizard: WizardConfig {
            max_tickets: 10,
            max_proof_bytes: 1024 * 1024,
            tier_selection: TierSelection::Choose,
        },
    }
}

/// Случайный заполненный участник.
pub fn fake_participant() -> Participant {
    Participant {
        full_name: Name().fake(),
        phone: PhoneNumber().fake(),
        doc_number: (20_000_000..45_000_000_u32).fake::<u32>().to_string(),
        ..Participant::blank()
    }
}

pub fn fake_email() -> String {
    SafeEmail().fake()
}

pub fn receipt_png() -> ProofFile {
    ProofFile::new("comprobante.png", "image/png", vec![0x89, b'P', b'N', b'G', 1, 2, 3])
}

/// Заполняет участника `index` через API мастера.
pub fn fill_participant(wizard: &mut Wizard, index: usize, participant: &Participant) {
    let fields = [
        ParticipantField::FullName(participant.full_name.clone()),
        ParticipantField::Phone(participant.phone.clone()),
        ParticipantField::DocNumber(participant.doc_number.clone()),
        ParticipantField::Gender(participant.gender),
    ];
    for field in fields {
        wizard.update_participant(index, field).unwrap();
    }
}

/// Проводит мастер с выбором тарифа до шага контакта и оплаты.
pub fn walk_to_contact(wizard: &mut Wizard, prevent_id: i64, count: usize) -> Vec<Participant> {
    wizard.select_prevent(prevent_id).unwrap();
    wizard.next().unwrap();
    wizard.set_ticket_count(count).unwrap();
    wizard.next().unwrap();

    let participants: Vec<Participant> = (0..count).map(|_| fake_participant()).collect();
    for (index, participant) in participants.iter().enumerate() {
        fill_participant(wizard, index, participant);
        wizard.next().unwrap();
    }
    participants
}

/// Шлюз в памяти. Ответы берутся из очередей, по умолчанию успешные.
#[derive(Default)]
pub struct FakeGateway {
    pub producer: Option<Producer>,
    pub ticket_responses: Mutex<VecDeque<GatewayResult<TicketReceipt>>>,
    pub preference_responses: Mutex<VecDeque<GatewayResult<PaymentPreference>>>,
    pub ticket_calls: Mutex<Vec<TicketSubmission>>,
    pub preference_calls: Mutex<Vec<(i64, Vec<Participant>)>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            producer: Some(producer()),
            ..Self::default()
        }
    }

    pub fn push_ticket_response(&self, response: GatewayResult<TicketReceipt>) {
        self.ticket_responses.lock().unwrap().push_back(response);
    }

    pub fn push_preference_response(&self, response: GatewayResult<PaymentPreference>) {
        self.preference_responses.lock().unwrap().push_back(response);
    }

    pub fn ticket_call_count(&self) -> usize {
        self.ticket_calls.lock().unwrap().len()
    }

    pub fn preference_call_count(&self) -> usize {
        self.preference_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TicketGateway for FakeGateway {
    async fn fetch_active_event_context(&self) -> GatewayResult<Producer> {
        self.producer.clone().ok_or(GatewayError::Rejected {
            message: Some("producer not found".to_string()),
        })
    }

    async fn create_ticket_request(&self, submission: TicketSubmission) -> GatewayResult<TicketReceipt> {
        self.ticket_calls.lock().unwrap().push(submission);
        self.ticket_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TicketReceipt::default()))
    }

    async fn create_payment_preference(
        &self,
        prevent_id: i64,
        participants: &[Participant],
    ) -> GatewayResult<PaymentPreference> {
        let mut calls = self.preference_calls.lock().unwrap();
        calls.push((prevent_id, participants.to_vec()));
        let number = calls.len();
        drop(calls);

        self.preference_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(PaymentPreference {
                    preference_id: format!("pref-{number}"),
                    public_key: None,
                })
            })
    }
}
