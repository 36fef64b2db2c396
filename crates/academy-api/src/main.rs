//! # Academy Server
//!
//! Registration, checkout and admin API for the academy storefront.
//!
//! ## Usage
//!
//! ```bash
//! # Optional: without these the server runs in demo mode
//! export MONGODB_URI=mongodb://localhost:27017
//! export RAZORPAY_KEY_ID=rzp_test_...
//! export RAZORPAY_KEY_SECRET=...
//! export JWT_SECRET=...
//!
//! # Run the server
//! academy-server
//! ```

use academy_api::{config::LogFormat, routes, AppConfig, AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }

    print_banner();

    let addr = config.socket_addr()?;
    let is_prod = config.is_production();
    info!("Environment: {}", config.environment);

    // Initialize application state
    let state = AppState::init(config).await?;

    info!("Courses loaded: {}", state.catalog.courses.len() + 1);
    info!("Store: {}", state.store.status().as_str());
    info!(
        "Payment gateway: {}",
        state
            .gateway
            .as_ref()
            .map(|g| g.provider_name())
            .unwrap_or("demo")
    );
    info!("Mail transport: {}", state.notifier.transport_name());

    let app = routes::create_router(state);

    info!("Academy API starting on http://{}", addr);
    if !is_prod {
        info!("Health check: http://{}/api/health", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  Academy API
  ━━━━━━━━━━━━━━━━━━━━━━━
  Registrations, checkout and admin
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
