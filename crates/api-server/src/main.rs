use application::EmployeeApp;
use chrono::Duration;
use config::Config;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod handlers;
mod routes;

use auth::TokenIssuer;
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let config = Config::from_env()?;

    // Initialize tracing; RUST_LOG overrides the configured filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🚀 Starting Employee API Server");
    info!("💾 Document store: {:?}", config.store_backend);
    info!("🌐 API server will bind to: {}", config.api_address());

    let employee_app = Arc::new(EmployeeApp::from_config(&config)?);
    let token_issuer = Arc::new(TokenIssuer::new(
        &config.jwt_secret,
        Duration::hours(config.token_ttl_hours),
    ));
    let app = routes::app(AppState {
        employee_app,
        token_issuer,
    });

    // Run the server
    let bind_address = config.api_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("🌐 API Server listening on http://{}", bind_address);
    info!("📖 API Documentation:");
    info!("   POST   /api/employee      - Create employee");
    info!("   GET    /api/employee      - List employees (query string filters)");
    info!("   GET    /api/employee/:id  - Get employee");
    info!("   PATCH  /api/employee/:id  - Update employee");
    info!("   DELETE /api/employee/:id  - Delete employee");
    info!("   GET    /api/auth          - Issue bearer token");
    info!("   *      /api/protected/... - Same employee routes, bearer token required");
    info!("   GET    /health            - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}
