use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use adapter_merchant_robokassa::Merchant;

#[derive(Serialize, Debug)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub test_mode: bool,
    pub hash_algorithm: &'static str,
}

pub async fn service_info(State(merchant): State<Arc<Merchant>>) -> Json<ServiceInfo> {
    let config = merchant.config();
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        test_mode: config.is_test,
        hash_algorithm: config.credentials.hash_algorithm.as_str(),
    })
}
