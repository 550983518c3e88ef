use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Жизненный цикл тарифа (пачки билетов).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreventStatus {
    Active,
    Inactive,
    Completed,
    Cancelled,
    SoldOut,
}

/// Тариф события ("preventa"): цена, лимит и собственный статус.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prevent {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub remaining: Option<u32>,
    pub status: PreventStatus,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Prevent {
    // Продавать можно только активный тариф
    pub fn is_selectable(&self) -> bool {
        self.status == PreventStatus::Active
    }
}
