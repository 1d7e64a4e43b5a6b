use snack_ledger::{AppState, Config, LedgerStore, router};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env().inspect_err(|err| error!("invalid configuration: {err}"))?;
    let store = LedgerStore::open(&config.data_path)
        .await
        .inspect_err(|err| error!("cannot open ledger: {err}"))?;
    info!(path = %store.path().display(), "ledger loaded");

    let app = router(AppState::new(store));
    let addr = config.socket_addr();

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
