//! gateway.rs
//!
//! Сервисный слой для взаимодействия с бэкендом продюсера.
//!
//! Ключевые компоненты:
//! 1.  **TicketGateway**: контракт бэкенда, которым пользуется мастер: загрузка
//!     контекста витрины, заявка на билеты (перевод) и создание преференции
//!     для внешнего кошелька.
//! 2.  **HttpGateway**: реализация контракта поверх `reqwest`. Все сетевые
//!     вызовы проходят через circuit breaker (`failsafe`), чтобы не долбить
//!     лежащий бэкенд, и ограничены таймаутом из конфигурации.

use async_trait::async_trait;
use failsafe::backoff::{self, Constant};
use failsafe::failure_policy::{self, ConsecutiveFailures};
use failsafe::futures::CircuitBreaker as _;
use failsafe::StateMachine;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{ApiResponse, Participant, Producer};
use crate::wizard::ProofFile;

/// Тип клиента, под которым витрина создаёт заявки.
const CLIENT_TYPE: &str = "REGULAR";

/// Преференция оплаты, созданная бэкендом для внешнего кошелька.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPreference {
    pub preference_id: String,
    #[serde(default)]
    pub public_key: Option<String>,
}

/// Всё, что нужно внешнему виджету оплаты.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutHandoff {
    pub preference_id: String,
    pub public_key: String,
}

/// Заявка на билеты при оплате переводом (multipart: `clients` + `comprobante`).
#[derive(Debug, Clone)]
pub struct TicketSubmission {
    pub event_id: i64,
    pub prevent_id: Option<i64>,
    /// Участники с уже проставленным контактным email.
    pub clients: Vec<Participant>,
    pub proof: Option<ProofFile>,
}

impl TicketSubmission {
    pub fn clients_json(&self) -> GatewayResult<String> {
        serde_json::to_string(&self.clients)
            .map_err(|e| GatewayError::InvalidPayload(format!("clients: {e}")))
    }

    fn into_form(self) -> GatewayResult<Form> {
        let form = Form::new().text("clients", self.clients_json()?);

        let Some(proof) = self.proof.map(ProofFile::normalized) else {
            return Ok(form);
        };

        let part = Part::bytes(proof.bytes)
            .file_name(proof.file_name)
            .mime_str(&proof.content_type)
            .map_err(|e| GatewayError::InvalidPayload(format!("comprobante: {e}")))?;

        Ok(form.part("comprobante", part))
    }
}

/// Ответ на заявку: бэкенд может приложить текст для пользователя.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketReceipt {
    pub message: Option<String>,
}

/// Контракт бэкенда продюсера.
#[async_trait]
pub trait TicketGateway: Send + Sync {
    /// Продюсер со всеми событиями. Вызывается один раз при открытии витрины.
    async fn fetch_active_event_context(&self) -> GatewayResult<Producer>;

    /// Заявка на билеты с квитанцией о переводе.
    async fn create_ticket_request(&self, submission: TicketSubmission) -> GatewayResult<TicketReceipt>;

    /// Преференция для внешнего кошелька.
    async fn create_payment_preference(
        &self,
        prevent_id: i64,
        participants: &[Participant],
    ) -> GatewayResult<PaymentPreference>;
}

type Breaker = StateMachine<ConsecutiveFailures<Constant>, ()>;

/// В breaker засчитываются только сбои самого бэкенда: сеть, таймауты, 5xx.
fn is_backend_failure(error: &reqwest::Error) -> bool {
    error
        .status()
        .map_or(true, |status| status.is_server_error())
}

/// HTTP-клиент бэкенда продюсера.
#[derive(Clone)]
pub struct HttpGateway {
    /// Базовый URL API без завершающего `/`.
    base_url: String,
    /// Асинхронный HTTP-клиент с таймаутом.
    http_client: reqwest::Client,
    /// Circuit breaker, общий для всех клонов клиента.
    breaker: Breaker,
}

impl HttpGateway {
    /// Создает и конфигурирует клиент на основе настроек приложения.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let breaker = failsafe::Config::new()
            .failure_policy(failure_policy::consecutive_failures(
                config.circuit_breaker.failure_threshold,
                backoff::constant(Duration::from_secs(
                    config.circuit_breaker.reset_timeout_secs,
                )),
            ))
            .build();

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            http_client,
            breaker,
        })
    }

    /// Разрешены ли сейчас запросы (breaker не разомкнут).
    pub fn is_available(&self) -> bool {
        self.breaker.is_call_permitted()
    }

    /// Выполняет запрос, пропуская его через circuit breaker.
    async fn execute_with_circuit_breaker<F, T>(&self, operation: F) -> GatewayResult<T>
    where
        F: Future<Output = Result<T, reqwest::Error>>,
    {
        match self.breaker.call_with(is_backend_failure, operation).await {
            Ok(result) => Ok(result),
            Err(failsafe::Error::Rejected) => {
                warn!("Circuit breaker is OPEN - blocking backend request");
                Err(GatewayError::Unavailable)
            }
            Err(failsafe::Error::Inner(e)) => {
                error!("Backend request failed: {:?}", e);
                Err(e.into())
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl TicketGateway for HttpGateway {
    async fn fetch_active_event_context(&self) -> GatewayResult<Producer> {
        info!("Fetching producer context");

        let operation = async {
            self.http_client
                .get(self.url("/producer/domain"))
                .send()
                .await?
                .error_for_status()?
                .json::<ApiResponse<Producer>>()
                .await
        };

        let response = self.execute_with_circuit_breaker(operation).await?;
        if !response.success {
            return Err(GatewayError::Rejected {
                message: response.message,
            });
        }

        let producer = response
            .data
            .ok_or_else(|| GatewayError::InvalidPayload("producer data is missing".to_string()))?;

        info!(
            producer_id = producer.id,
            events = producer.events.len(),
            "Producer context loaded"
        );
        Ok(producer)
    }

    async fn create_ticket_request(&self, submission: TicketSubmission) -> GatewayResult<TicketReceipt> {
        let event_id = submission.event_id;
        let prevent_id = submission.prevent_id;
        let participants = submission.clients.len();
        let form = submission.into_form()?;

        info!(event_id, ?prevent_id, participants, "Submitting ticket request");

        let mut request = self
            .http_client
            .post(self.url(&format!("/client/create/{event_id}")))
            .query(&[("type", CLIENT_TYPE)]);
        if let Some(prevent_id) = prevent_id {
            request = request.query(&[("prevent", prevent_id)]);
        }

        let operation = async {
            request
                .multipart(form)
                .send()
                .await?
                .error_for_status()?
                .json::<ApiResponse<serde_json::Value>>()
                .await
        };

        let response = self.execute_with_circuit_breaker(operation).await?;
        if !response.success {
            warn!(event_id, message = ?response.message, "Ticket request rejected by backend");
            return Err(GatewayError::Rejected {
                message: response.message,
            });
        }

        info!(event_id, participants, "Ticket request accepted");
        Ok(TicketReceipt {
            message: response.message,
        })
    }

    async fn create_payment_preference(
        &self,
        prevent_id: i64,
        participants: &[Participant],
    ) -> GatewayResult<PaymentPreference> {
        info!(prevent_id, participants = participants.len(), "Creating payment preference");

        let operation = async {
            self.http_client
                .post(self.url("/mercadopago/create"))
                .query(&[("prevent", prevent_id)])
                .json(participants)
                .send()
                .await?
                .error_for_status()?
                .json::<ApiResponse<PaymentPreference>>()
                .await
        };

        let response = self.execute_with_circuit_breaker(operation).await?;
        if !response.success {
            warn!(prevent_id, message = ?response.message, "Payment preference rejected by backend");
            return Err(GatewayError::Rejected {
                message: response.message,
            });
        }

        let preference = response
            .data
            .filter(|data| !data.preference_id.trim().is_empty())
            .ok_or_else(|| GatewayError::InvalidPayload("preference id is missing".to_string()))?;

        info!(prevent_id, preference_id = %preference.preference_id, "Payment preference created");
        Ok(preference)
    }
}
