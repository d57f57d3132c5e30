//! Payment authorization links.

use std::collections::BTreeMap;

use bon::Builder;
use url::form_urlencoded;
use url::Url;

use crate::error::Result;
use crate::model::MerchantCredentials;
use crate::signature::SignatureEngine;

/// Case-insensitive prefix of the merchant's own pass-through parameters.
pub const DEFAULT_CUSTOM_PREFIX: &str = "shp";

/// What the caller does with a built link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delivery {
    /// Send the customer to the gateway.
    #[default]
    Redirect,
    /// Hand the URL back as text.
    Link,
}

/// A payment the customer is about to authorize.
///
/// The amount is passed through exactly as given, with `.` as decimal
/// separator. `description` is limited by the gateway to 100 characters of a
/// restricted alphabet; checking that is up to the caller.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    #[builder(into)]
    pub amount: String,
    pub invoice_id: Option<u64>,
    #[builder(into)]
    pub description: Option<String>,
    #[builder(into)]
    pub currency_label: Option<String>,
    #[builder(into)]
    pub email: Option<String>,
    #[builder(into)]
    pub culture: Option<String>,
    #[builder(default)]
    pub custom_params: BTreeMap<String, String>,
    /// Receipt JSON as produced by `Receipt::to_first_json`.
    #[builder(into)]
    pub receipt_json: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentUrlBuilder {
    engine: SignatureEngine,
}

impl PaymentUrlBuilder {
    pub fn new(engine: SignatureEngine) -> Self {
        Self { engine }
    }

    /// Signs `request` with the outbound secret and renders the gateway URL.
    ///
    /// The receipt is form-encoded before signing and the encoded value is
    /// what goes into the `Receipt` query parameter, so it appears encoded
    /// twice in the final URL.
    pub fn build(
        &self,
        base_url: &str,
        credentials: &MerchantCredentials,
        request: &PaymentRequest,
        is_test: bool,
    ) -> Result<String> {
        let mut url = Url::parse(base_url)?;

        let receipt = request
            .receipt_json
            .as_deref()
            .map(|json| form_urlencoded::byte_serialize(json.as_bytes()).collect::<String>());

        for key in request.custom_params.keys() {
            if !key.to_lowercase().starts_with(DEFAULT_CUSTOM_PREFIX) {
                warn!("Custom parameter {} lacks the {} prefix", key, DEFAULT_CUSTOM_PREFIX);
            }
        }

        let signature = self.engine.build_outbound_signature(
            &credentials.login,
            &request.amount,
            request.invoice_id,
            &request.custom_params,
            receipt.as_deref(),
            &credentials.outbound_secret,
        );

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("MrchLogin", &credentials.login);
            query.append_pair("OutSum", &request.amount);
            if let Some(invoice_id) = request.invoice_id {
                query.append_pair("InvId", &invoice_id.to_string());
            }
            if let Some(description) = &request.description {
                query.append_pair("Desc", description);
            }
            query.append_pair("SignatureValue", &signature);
            if let Some(currency_label) = &request.currency_label {
                query.append_pair("IncCurrLabel", currency_label);
            }
            if let Some(email) = &request.email {
                query.append_pair("Email", email);
            }
            if let Some(culture) = &request.culture {
                query.append_pair("Culture", culture);
            }
            if is_test {
                query.append_pair("IsTest", "1");
            }

            query.extend_pairs(&request.custom_params);

            if let Some(receipt) = &receipt {
                query.append_pair("Receipt", receipt);
            }
        }

        Ok(url.into())
    }
}
