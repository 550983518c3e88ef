use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AppConfig, LogFormat};

/// Ставит глобальный subscriber. Вызывается один раз оболочкой витрины.
pub fn init(app: &AppConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&app.rust_log)
        .with_context(|| format!("invalid log filter {:?}", app.rust_log))?;
    let registry = tracing_subscriber::registry().with(filter);

    match app.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
    .context("tracing subscriber is already installed")?;

    tracing::info!(environment = %app.environment, "Logging initialized");
    Ok(())
}
