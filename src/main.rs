use cart_page_rust::config::load_from_env;
use cart_page_rust::router::create_app_router;
use cart_page_rust::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_from_env()?;
    config.print_summary();

    // Initialize application state
    let seed = config.load_seed()?;
    let state = Arc::new(AppState::new(&seed, config.cart)?);

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
