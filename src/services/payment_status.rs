//! Статус оплаты из query-строки, с которой кошелёк возвращает пользователя
//! на витрину (`?collection_status=approved&event=12&...`).

use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Approved,
    Pending,
    Rejected,
    /// Статус есть, но витрине он не знаком.
    Unknown,
}

impl PaymentOutcome {
    pub fn from_status(status: &str) -> Self {
        match status {
            "approved" => PaymentOutcome::Approved,
            "pending" => PaymentOutcome::Pending,
            "failure" | "cancelled" | "rejected" => PaymentOutcome::Rejected,
            _ => PaymentOutcome::Unknown,
        }
    }
}

/// Уведомление о результате оплаты для витрины.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotice {
    pub outcome: PaymentOutcome,
    pub status: String,
    /// Событие, к которому относится оплата (если передано и это число).
    pub event_id: Option<i64>,
    /// Все параметры редиректа как есть.
    pub params: BTreeMap<String, String>,
}

/// Разбирает query-строку. `None`, если статуса нет (обычный заход на витрину).
pub fn parse_redirect_query(query: &str) -> Option<PaymentNotice> {
    let query = query.trim_start_matches('?');
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
        Ok(pairs) => pairs,
        Err(e) => {
            debug!("Ignoring malformed redirect query: {}", e);
            return None;
        }
    };
    let params: BTreeMap<String, String> = pairs.into_iter().collect();

    // collection_status приоритетнее; пустое значение считается отсутствующим
    let status = ["collection_status", "status"]
        .iter()
        .filter_map(|key| params.get(*key))
        .find(|value| !value.is_empty())?
        .clone();

    let event_id = params.get("event").and_then(|value| value.parse().ok());

    Some(PaymentNotice {
        outcome: PaymentOutcome::from_status(&status),
        status,
        event_id,
        params,
    })
}
