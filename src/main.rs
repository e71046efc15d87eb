//! HTTP server for the Payroll Invoice Engine.
//!
//! Reads the configuration path from `PAYROLL_ENGINE_CONFIG` and the listen
//! address from `PAYROLL_ENGINE_ADDR`. Log filtering follows `RUST_LOG`.

use std::env;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_CONFIG_PATH: &str = "./config/engine.yaml";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path =
        env::var("PAYROLL_ENGINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let addr = env::var("PAYROLL_ENGINE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let config = ConfigLoader::load(&config_path)?;
    info!(
        path = %config_path,
        engine = %config.engine().name,
        version = %config.engine().version,
        "Configuration loaded"
    );

    let router = create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Payroll invoice engine listening");

    axum::serve(listener, router).await?;
    Ok(())
}
