use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tressette::config::Config;
use tressette::hub::Hub;
use tressette::results::{
    router as results_router, InMemoryResultRepository, ResultRepository, SqliteResultRepository,
};
use tressette::shared::AppState;
use tressette::websockets::{websocket_handler, InMemoryConnectionManager};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tressette=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Server stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Tressette game server");
    let config = Config::from_env()?;

    let results: Arc<dyn ResultRepository> = match &config.database_url {
        Some(url) => {
            info!(database_url = %url, "Using SQLite result store");
            Arc::new(SqliteResultRepository::connect(url).await?)
        }
        None => {
            info!("DATABASE_URL not set, results kept in memory");
            Arc::new(InMemoryResultRepository::new())
        }
    };

    let hub = Hub::new(
        Arc::new(InMemoryConnectionManager::new()),
        results.clone(),
        config.points_goal,
    )
    .spawn();

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(hub, results, config);

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .merge(results_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind_addr = %bind_addr, "Server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
