use std::net::SocketAddr;
use std::sync::Arc;

use axum::serve;
use dotenvy::dotenv;
use todo_gateway::{
    api,
    infrastructure::{config::Config, state::AppState, store},
    telemetry,
};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    telemetry::init();
    let config = Arc::new(Config::from_env()?);
    let store = store::build_store(&config.database)?;
    store.connect().await?;
    info!(backend = %config.database.backend, "todo store connected");

    let state = Arc::new(AppState::new(Arc::clone(&config), Arc::clone(&store)));
    let router = api::build_router(Arc::clone(&state))?;

    let addr: SocketAddr = config.bind_address().parse()?;
    info!(%addr, graphql_path = %config.graphql.path, "starting todo gateway");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server =
        serve(listener, router.into_make_service()).with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        warn!(error = ?err, "server exited with error");
    }

    store.disconnect().await;
    info!("todo store disconnected");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
