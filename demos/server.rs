//! Demo server: builds the pool and registry, mounts common and gateway routes.

use axum::Router;
use query_gateway::{common_routes, gateway_routes, AppState, QueryGateway, TableRegistry};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("query_gateway=debug")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/gateway".into());
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let gateway = QueryGateway::new(pool, TableRegistry::new());
    let state = AppState {
        gateway: Arc::new(gateway),
    };

    let app = Router::new()
        .merge(common_routes(state.clone()))
        .merge(gateway_routes(state));

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = TcpListener::bind(&bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
