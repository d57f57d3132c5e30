use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::Level;

use adapter_merchant_robokassa::{Merchant, MerchantConfig};

#[macro_use]
extern crate tracing;

mod healthz;
mod middleware;
mod webhook;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

pub fn routes(merchant: Arc<Merchant>) -> Router {
    Router::new()
        .route("/", get(healthz::service_info))
        .route("/result", get(webhook::result).post(webhook::result))
        .route("/payment", get(webhook::payment))
        .layer(axum::middleware::from_fn(middleware::log_request))
        .with_state(merchant)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = MerchantConfig::from_env().map_err(|e| {
        error!("FATAL: {}", e);
        e
    })?;
    if config.is_test {
        info!("Test mode enabled, payments will not be charged");
    }
    let merchant = Arc::new(Merchant::new(config));

    let listen_addr =
        std::env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
    info!("Listening on {}", listen_addr);

    let listener = TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, routes(merchant).into_make_service()).await?;
    Ok(())
}
