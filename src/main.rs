use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use futbot::config::AppConfig;
use futbot::handlers;
use futbot::services::scheduling::http::HttpSchedulingApi;
use futbot::services::slot_filling::SlotFillingController;
use futbot::services::temporal::TemporalNormalizer;
use futbot::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    config.validate()?;

    tracing::info!(
        api_base = %config.api_base,
        timeout_secs = config.request_timeout_secs,
        "using scheduling API"
    );
    let scheduling = HttpSchedulingApi::new(config.api_base.clone(), config.request_timeout())?;

    let state = Arc::new(AppState {
        scheduling: Box::new(scheduling),
        slot_filling: SlotFillingController::new(TemporalNormalizer::system()),
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting action server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
