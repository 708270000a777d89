//! API Server Binary Entry Point

use tempos_core::config::Settings;
use tempos_core::service::ScheduleService;
use tempos_server::{start_server, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tempos_server=info,tempos_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new()?;
    let service = ScheduleService::from_settings(&settings).await?;

    tracing::info!(
        database = %settings.database_path,
        model = %settings.llm.model,
        "Starting Tempos API server"
    );
    start_server(&settings.server.addr, AppState::new(service)).await?;

    Ok(())
}
