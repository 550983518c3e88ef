//! Ошибки мастера бронирования и шлюза.
//!
//! Ошибки валидации - локальные, пользователь видит их как подсказку.
//! Ошибки шлюза всегда возвращаются значением: черновик при этом не меняется,
//! и пользователь может повторить отправку.

use thiserror::Error;

use crate::wizard::WizardStep;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Бэкенд ответил `success: false`.
    #[error("backend rejected the request: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },
    #[error("backend request timed out")]
    Timeout,
    /// Circuit breaker разомкнут, запрос даже не отправлялся.
    #[error("backend temporarily unavailable")]
    Unavailable,
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Transport(error)
        }
    }
}

/// Ошибки встроенного виджета оплаты.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("wallet public key is missing")]
    MissingPublicKey,
    #[error("payment preference {0} was rejected by the checkout widget")]
    InvalidPreference(String),
    #[error("checkout widget failed: {0}")]
    Widget(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    #[error("file is empty")]
    Empty,
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("unsupported content type {0}")]
    UnsupportedType(String),
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("step {step} is incomplete")]
    ValidationFailed { step: WizardStep },
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("the wizard is closed")]
    Closed,
    /// Результат пришёл, а отправки в полёте нет.
    #[error("no submission is in flight")]
    NoSubmissionInFlight,
    #[error("submission is only possible from the contact and payment step")]
    NotOnFinalStep,
    #[error("operation does not match the selected payment method")]
    WrongPaymentMethod,
    #[error("hosted wallet payments are not configured")]
    HostedWalletUnavailable,
    #[error("price tier {0} is not available")]
    UnknownPrevent(i64),
    #[error("event {0} has no price tier on sale")]
    NoSelectablePrevent(i64),
    #[error("ticket count must be between 1 and {max}, got {count}")]
    InvalidTicketCount { count: usize, max: usize },
    #[error("participant {index} does not exist (roster has {len})")]
    ParticipantOutOfRange { index: usize, len: usize },
    #[error("invalid proof of payment: {0}")]
    InvalidProof(#[from] ProofError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl WizardError {
    /// Локальная ошибка ввода, а не сбой системы.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WizardError::ValidationFailed { .. }
                | WizardError::InvalidTicketCount { .. }
                | WizardError::InvalidProof(_)
        )
    }
}
