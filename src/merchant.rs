use std::collections::{BTreeMap, HashMap};

use crate::callback::{CallbackVerifier, VerifiedCallback};
use crate::config::MerchantConfig;
use crate::error::{Result, VerificationError};
use crate::hash::HashSigner;
use crate::payment::{PaymentRequest, PaymentUrlBuilder};
use crate::receipt::{FiscalAttachment, ReceiptCodec};
use crate::signature::SignatureEngine;

/// One configured shop. Holds no per-request state and can be shared
/// freely between handlers.
#[derive(Debug, Clone)]
pub struct Merchant {
    config: MerchantConfig,
    engine: SignatureEngine,
}

impl Merchant {
    pub fn new(config: MerchantConfig) -> Self {
        let engine = SignatureEngine::new(HashSigner::new(config.credentials.hash_algorithm));
        Self { config, engine }
    }

    pub fn config(&self) -> &MerchantConfig {
        &self.config
    }

    /// Signed link to the gateway's payment page.
    pub fn payment_url(&self, request: &PaymentRequest) -> Result<String> {
        PaymentUrlBuilder::new(self.engine).build(
            &self.config.base_url,
            &self.config.credentials,
            request,
            self.config.is_test,
        )
    }

    /// Raw signature check, with the secret chosen by the caller.
    pub fn check_signature(
        &self,
        signature: &str,
        amount: &str,
        invoice_id: &str,
        secret: &str,
        custom_params: &BTreeMap<String, String>,
    ) -> bool {
        self.engine
            .verify(signature, amount, invoice_id, secret, custom_params)
    }

    /// Verifies a result callback against password #2.
    pub fn verify_callback(
        &self,
        params: &HashMap<String, String>,
    ) -> std::result::Result<VerifiedCallback, VerificationError> {
        CallbackVerifier::new(self.engine).verify(
            params,
            &self.config.custom_prefix,
            &self.config.credentials,
        )
    }

    /// Signed tokens for attaching a fiscal receipt, signed with password #1.
    pub fn receipt_attach(&self, receipt_json: &str) -> FiscalAttachment {
        ReceiptCodec::new(self.engine).attach_fiscal(
            receipt_json,
            &self.config.credentials.outbound_secret,
            &self.config.fiscal_url,
        )
    }
}
