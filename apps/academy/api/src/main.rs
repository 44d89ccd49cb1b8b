use axum_helpers::server::{close_postgres, create_production_app, create_router, health_router};
use core_config::FromEnv;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::RetryConfig;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::AppConfig;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = AppConfig::from_env()?;
    init_tracing(&config.environment);

    let retry = RetryConfig::from_env()?;
    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), &retry)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    let state = AppState::new(config, db);

    let api_routes = api::routes(&state);
    let router = create_router::<openapi::ApiDoc>(api_routes, state.config.server.request_timeout)?;

    // /health reports app identity; /ready round-trips to Postgres
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    info!(
        name = state.config.app.name,
        version = state.config.app.version,
        "Starting academy API"
    );

    let server = state.config.server.clone();
    create_production_app(app, &server, async move {
        info!("Shutting down: closing database connections");
        close_postgres(state.db).await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Academy API shutdown complete");
    Ok(())
}
