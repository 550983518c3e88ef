//! Расчёт суммы заказа: подытог, сервисный сбор кошелька и итог.
//!
//! Каждая производная величина округляется до копеек отдельно (half-up),
//! поэтому `fee_per_participant * count` может отличаться от `fee_total`
//! на несколько копеек. Это ожидаемо и не корректируется.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Способ оплаты, выбранный на последнем шаге.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Банковский перевод с загрузкой квитанции.
    #[default]
    Transfer,
    /// Внешний кошелёк (hosted checkout) по идентификатору преференции.
    HostedWallet,
}

/// Сбор кошелька: 8.24%.
pub fn hosted_wallet_fee_rate() -> Decimal {
    Decimal::new(824, 4)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub fee_total: Decimal,
    pub fee_per_participant: Decimal,
    pub total: Decimal,
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Считает суммы для тарифа `unit_price` (None - тариф не выбран).
pub fn compute_totals(
    unit_price: Option<Decimal>,
    participant_count: usize,
    method: PaymentMethod,
) -> Totals {
    let subtotal = unit_price.unwrap_or(Decimal::ZERO) * Decimal::from(participant_count);

    match method {
        PaymentMethod::Transfer => Totals {
            subtotal,
            fee_total: Decimal::ZERO,
            fee_per_participant: Decimal::ZERO,
            total: subtotal,
        },
        PaymentMethod::HostedWallet => {
            let total = round2(subtotal * (Decimal::ONE + hosted_wallet_fee_rate()));
            let fee_total = round2(total - subtotal);
            let fee_per_participant = if participant_count == 0 {
                Decimal::ZERO
            } else {
                round2(fee_total / Decimal::from(participant_count))
            };

            Totals {
                subtotal,
                fee_total,
                fee_per_participant,
                total,
            }
        }
    }
}
