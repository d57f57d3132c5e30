//! Result callback verification.
//!
//! The gateway notifies the shop about a completed payment by calling its
//! result URL with `OutSum`, `InvId`, `SignatureValue`, the optional `EMail`
//! and `Fee`, and every custom parameter the shop passed in the payment link.

use std::collections::{BTreeMap, HashMap};

use crate::error::VerificationError;
use crate::model::MerchantCredentials;
use crate::signature::SignatureEngine;

/// Callback fields that passed signature verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCallback {
    pub invoice_id: String,
    pub amount: String,
    /// Custom parameters with their keys as received.
    pub custom_params: BTreeMap<String, String>,
    pub email: Option<String>,
    pub fee: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CallbackVerifier {
    engine: SignatureEngine,
}

impl CallbackVerifier {
    pub fn new(engine: SignatureEngine) -> Self {
        Self { engine }
    }

    /// Checks a callback against the inbound secret of `credentials`.
    pub fn verify(
        &self,
        params: &HashMap<String, String>,
        custom_prefix: &str,
        credentials: &MerchantCredentials,
    ) -> Result<VerifiedCallback, VerificationError> {
        let amount = required(params, "OutSum")?;
        let invoice_id = required(params, "InvId")?;
        let signature = required(params, "SignatureValue")?;

        let custom_params = extract_custom_params(params, custom_prefix);

        if !self.engine.verify(
            signature,
            amount,
            invoice_id,
            &credentials.inbound_secret,
            &custom_params,
        ) {
            return Err(VerificationError::SignatureMismatch);
        }

        Ok(VerifiedCallback {
            invoice_id: invoice_id.to_string(),
            amount: amount.to_string(),
            custom_params,
            email: params.get("EMail").cloned(),
            fee: params.get("Fee").cloned().unwrap_or_else(|| "0".to_string()),
        })
    }
}

fn required<'a>(
    params: &'a HashMap<String, String>,
    name: &'static str,
) -> Result<&'a str, VerificationError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or(VerificationError::MissingField(name))
}

/// Every parameter whose lowercased name starts with `prefix`.
pub fn extract_custom_params(
    params: &HashMap<String, String>,
    prefix: &str,
) -> BTreeMap<String, String> {
    let prefix = prefix.to_lowercase();
    params
        .iter()
        .filter(|(key, _)| key.to_lowercase().starts_with(&prefix))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
