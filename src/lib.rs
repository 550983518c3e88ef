pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod wizard;

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::WizardError;
use crate::models::{Event, Producer};
use crate::services::gateway::{HttpGateway, TicketGateway};
use crate::services::payment_status::{self, PaymentNotice};
use crate::wizard::{Wizard, WizardOptions};

// Общий контекст витрины: конфиг, шлюз и данные продюсера
#[derive(Clone)]
pub struct Storefront {
    pub config: Config,
    pub gateway: Arc<dyn TicketGateway>,
    pub producer: Producer,
}

impl Storefront {
    /// Загружает продюсера через HTTP-шлюз из конфигурации.
    pub async fn bootstrap(config: Config) -> anyhow::Result<Self> {
        let gateway = HttpGateway::from_config(&config.gateway)
            .context("failed to build backend client")?;
        Self::with_gateway(config, Arc::new(gateway)).await
    }

    /// То же, но с готовым шлюзом.
    pub async fn with_gateway(
        config: Config,
        gateway: Arc<dyn TicketGateway>,
    ) -> anyhow::Result<Self> {
        let producer = gateway
            .fetch_active_event_context()
            .await
            .context("failed to load producer context")?;

        let storefront = Self {
            config,
            gateway,
            producer,
        };

        match storefront.active_event() {
            Some(event) => info!(
                producer = %storefront.producer.name,
                event_id = event.id,
                status = ?event.status,
                "Storefront ready"
            ),
            None => warn!(producer = %storefront.producer.name, "Producer has no events"),
        }
        Ok(storefront)
    }

    /// Событие, которое сейчас продаётся.
    pub fn active_event(&self) -> Option<&Event> {
        self.producer.active_event()
    }

    /// Свежий мастер для активного события. `None`, если продавать нечего.
    pub fn open_wizard(&self) -> Option<Result<Wizard, WizardError>> {
        let event = self.active_event()?;
        let options = WizardOptions::from_config(&self.config, event);
        Some(Wizard::new(event.clone(), options))
    }

    /// Результат оплаты из query-строки редиректа, если он там есть.
    pub fn payment_notice(&self, query: &str) -> Option<PaymentNotice> {
        payment_status::parse_redirect_query(query)
    }
}
