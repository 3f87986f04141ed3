use collab_service::{
    config::Config, error::AppError, logging, routes, services::sweeper, state::AppState,
    websocket::CollabHub,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    logging::init_tracing();
    let cfg = Config::from_env()?;

    let hub = CollabHub::new();
    let state = AppState { hub: hub.clone() };

    sweeper::spawn_idle_sweeper(hub, &cfg);

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting collab-service");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::StartServer(e.to_string()))?;
    axum::serve(listener, routes::router(state))
        .await
        .map_err(|e| AppError::StartServer(e.to_string()))?;

    Ok(())
}
