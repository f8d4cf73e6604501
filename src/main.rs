//! Payroll engine HTTP server.
//!
//! Environment:
//! - `PAYROLL_RATES_PATH`: rate table YAML (default `./config/rates.yaml`)
//! - `PAYROLL_BIND_ADDR`: listen address (default `0.0.0.0:3000`)
//! - `RUST_LOG`: log filter (default `payroll_engine=info`)

use std::env;
use std::error::Error;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;

const DEFAULT_RATES_PATH: &str = "./config/rates.yaml";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("payroll_engine=info")),
        )
        .init();

    let rates_path = env::var("PAYROLL_RATES_PATH").unwrap_or_else(|_| DEFAULT_RATES_PATH.into());
    let bind_addr = env::var("PAYROLL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());

    let config = ConfigLoader::load(&rates_path)?;
    let app = create_router(AppState::from_config(config));

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Payroll engine listening");

    axum::serve(listener, app).await?;
    Ok(())
}
