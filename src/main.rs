use shelfmark_api::{
    config::Config,
    db::{create_pool, run_migrations},
    routes::{create_router, AppState},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    // Load configuration
    let config = Config::from_env()?;

    // Connect and bring the schema up to date
    let pool = create_pool(&config.database_url, config.max_db_connections).await?;
    run_migrations(&pool).await?;

    // Initialize application state
    let state = AppState::from_pool(pool);

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
