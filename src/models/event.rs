use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::prevent::Prevent;

/// Статус события. Порядок вариантов не важен: приоритет задаёт [`EventStatus::priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Active,
    Draft,
    Completed,
    Cancelled,
    Upcoming,
    Suspended,
}

impl EventStatus {
    /// Чем меньше число, тем раньше событие выбирается для продажи.
    pub fn priority(self) -> u8 {
        match self {
            EventStatus::Active => 0,
            EventStatus::Upcoming => 1,
            EventStatus::Completed => 2,
            EventStatus::Cancelled => 3,
            EventStatus::Suspended => 4,
            EventStatus::Draft => 5,
        }
    }
}

/// Аккаунт кошелька, привязанный к событию (`oAuthMercadoPago`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    pub id: i64,
    #[serde(rename = "mpUserName")]
    pub user_name: String,
    #[serde(rename = "mpPublicKey")]
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    pub status: EventStatus,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub prevents: Vec<Prevent>,
    #[serde(default, rename = "oAuthMercadoPago")]
    pub wallet_account: Option<WalletAccount>,
}

impl Event {
    /// Тарифы, которые можно выбрать (только ACTIVE), в исходном порядке.
    pub fn selectable_prevents(&self) -> impl Iterator<Item = &Prevent> {
        self.prevents.iter().filter(|prevent| prevent.is_selectable())
    }

    pub fn selectable_prevent(&self, prevent_id: i64) -> Option<&Prevent> {
        self.selectable_prevents().find(|prevent| prevent.id == prevent_id)
    }

    /// Тариф по умолчанию: последний созданный среди активных.
    pub fn suggested_prevent(&self) -> Option<&Prevent> {
        self.selectable_prevents()
            .max_by_key(|prevent| prevent.created_at)
    }

    /// Алиас для перевода может содержать несколько строк через `/`.
    pub fn alias_lines(&self) -> Vec<&str> {
        self.alias
            .as_deref()
            .map(|alias| {
                alias
                    .split('/')
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Публичный ключ кошелька из аккаунта события, если он задан.
    pub fn wallet_public_key(&self) -> Option<&str> {
        self.wallet_account
            .as_ref()
            .map(|account| account.public_key.trim())
            .filter(|key| !key.is_empty())
    }
}

/// Выбирает событие для продажи: ACTIVE > UPCOMING > COMPLETED > CANCELLED >
/// SUSPENDED > DRAFT, при равном статусе - самое раннее по дате начала.
pub fn select_active_event(events: &[Event]) -> Option<&Event> {
    events
        .iter()
        .min_by_key(|event| (event.status.priority(), event.start_date))
}
