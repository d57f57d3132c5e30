use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::response::{IntoResponse, Redirect, Response};

use adapter_merchant_robokassa::callback::extract_custom_params;
use adapter_merchant_robokassa::{Delivery, Merchant, PaymentRequest, VerificationError};

/// Result URL called by the gateway once a payment is completed. The
/// gateway expects `OK<InvId>` in the body.
pub async fn result(
    State(merchant): State<Arc<Merchant>>,
    Form(params): Form<HashMap<String, String>>,
) -> Result<String, (http::StatusCode, String)> {
    let verified = merchant.verify_callback(&params).map_err(|error| {
        warn!("Rejected result callback: {}", error);
        let status = match error {
            VerificationError::MissingField(_) => http::StatusCode::BAD_REQUEST,
            VerificationError::SignatureMismatch => http::StatusCode::UNAUTHORIZED,
        };
        (status, error.to_string())
    })?;

    info!(
        "Payment confirmed for invoice {}: {} (fee {})",
        verified.invoice_id, verified.amount, verified.fee
    );

    Ok(format!("OK{}", verified.invoice_id))
}

/// Builds a signed payment link from the query string. With `link=1` the
/// URL is returned as text, otherwise the customer is redirected.
pub async fn payment(
    State(merchant): State<Arc<Merchant>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, (http::StatusCode, String)> {
    let Some(amount) = params.get("OutSum") else {
        return Err((
            http::StatusCode::BAD_REQUEST,
            "Missing parameter: OutSum".into(),
        ));
    };

    let invoice_id = match params.get("InvId") {
        Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
            (
                http::StatusCode::BAD_REQUEST,
                format!("Invalid InvId {:?}: {}", raw, e),
            )
        })?),
        None => None,
    };

    let request = PaymentRequest::builder()
        .amount(amount.clone())
        .maybe_invoice_id(invoice_id)
        .maybe_description(params.get("Desc").cloned())
        .maybe_currency_label(params.get("IncCurrLabel").cloned())
        .maybe_email(params.get("Email").cloned())
        .maybe_culture(params.get("Culture").cloned())
        .custom_params(extract_custom_params(
            &params,
            &merchant.config().custom_prefix,
        ))
        .maybe_receipt_json(params.get("Receipt").cloned())
        .build();

    let delivery = match params.get("link").map(String::as_str) {
        Some("1") | Some("true") => Delivery::Link,
        _ => Delivery::Redirect,
    };

    let url = merchant.payment_url(&request).map_err(|e| {
        error!("Error building payment link: {}", e);
        (
            http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error building payment link: {}", e),
        )
    })?;

    Ok(match delivery {
        Delivery::Redirect => Redirect::to(&url).into_response(),
        Delivery::Link => url.into_response(),
    })
}
