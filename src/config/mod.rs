use ::config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment};
use anyhow::Context;
use serde::Deserialize;
use validator::Validate;

/// Префикс переменных окружения: `STOREFRONT_GATEWAY__API_URL` -> `gateway.api_url`.
pub const ENV_PREFIX: &str = "STOREFRONT";

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    pub app: AppConfig,
    #[validate(nested)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[validate(nested)]
    pub wizard: WizardConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

// Настройки бэкенда продюсера
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GatewayConfig {
    #[validate(url)]
    pub api_url: String,
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
    #[validate(nested)]
    pub circuit_breaker: CircuitBreakerConfig,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CircuitBreakerConfig {
    #[validate(range(min = 1))]
    pub failure_threshold: u32,
    pub reset_timeout_secs: u64,
}

// Настройки платёжного виджета
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Публичный ключ кошелька. Если его нет ни здесь, ни у события,
    /// оплата через кошелёк отключается.
    #[serde(default)]
    pub public_key: Option<String>,
}

impl PaymentConfig {
    /// Пустая строка из окружения считается отсутствующим ключом.
    pub fn public_key(&self) -> Option<&str> {
        self.public_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

// Настройки мастера бронирования
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WizardConfig {
    #[validate(range(min = 1, max = 50))]
    pub max_tickets: usize,
    #[validate(range(min = 1))]
    pub max_proof_bytes: usize,
    pub tier_selection: TierSelection,
}

/// Есть ли у мастера отдельный шаг выбора тарифа.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierSelection {
    /// Посетитель сам выбирает тариф на первом шаге.
    Choose,
    /// Тариф подставляется заранее (последний созданный активный).
    Fixed,
}

impl Config {
    /// Загружает конфигурацию: значения по умолчанию, затем `.env` и окружение.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_builder(Self::defaults()?.add_source(Self::environment()))
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        ::config::Config::builder()
            .set_default("app.environment", "development")?
            .set_default("app.rust_log", "ticket_storefront=debug")?
            .set_default("app.log_format", "pretty")?
            .set_default("gateway.request_timeout_secs", 30_i64)?
            .set_default("gateway.circuit_breaker.failure_threshold", 5_i64)?
            .set_default("gateway.circuit_breaker.reset_timeout_secs", 60_i64)?
            .set_default("wizard.max_tickets", 10_i64)?
            .set_default("wizard.max_proof_bytes", 10_i64 * 1024 * 1024)?
            .set_default("wizard.tier_selection", "choose")
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        let config: Config = builder
            .build()
            .context("failed to read storefront configuration")?
            .try_deserialize()
            .context("storefront configuration is incomplete (is STOREFRONT_GATEWAY__API_URL set?)")?;

        config
            .validate()
            .context("storefront configuration is invalid")?;

        Ok(config)
    }
}
