//! Canonical strings and signatures exchanged with the gateway.
//!
//! Outbound requests are signed as
//!
//! ```text
//! Login:OutSum[:InvId][:Receipt]:Password1[:shp_a=1:shp_b=2]
//! ```
//!
//! where an absent `InvId` or `Receipt` drops its field together with the
//! separator. Result callbacks are always signed as
//! `OutSum:InvId:Password2[:shp_...]`, with `InvId` kept positionally even
//! when it is empty. The two shapes differ on purpose; the gateway computes
//! them this way.

use std::collections::BTreeMap;

use crate::hash::HashSigner;

const SEPARATOR: char = ':';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignatureEngine {
    signer: HashSigner,
}

impl SignatureEngine {
    pub fn new(signer: HashSigner) -> Self {
        Self { signer }
    }

    pub fn signer(&self) -> HashSigner {
        self.signer
    }

    /// Signature of a payment request sent to the gateway.
    ///
    /// `receipt_encoded` must already be in its transmitted form; the
    /// signature covers the encoded receipt, not the raw JSON.
    pub fn build_outbound_signature(
        &self,
        login: &str,
        amount: &str,
        invoice_id: Option<u64>,
        custom_params: &BTreeMap<String, String>,
        receipt_encoded: Option<&str>,
        secret: &str,
    ) -> String {
        let mut canonical = format!("{login}{SEPARATOR}{amount}");

        if let Some(invoice_id) = invoice_id {
            canonical.push(SEPARATOR);
            canonical.push_str(&invoice_id.to_string());
        }

        if let Some(receipt) = receipt_encoded {
            canonical.push(SEPARATOR);
            canonical.push_str(receipt);
        }

        canonical.push(SEPARATOR);
        canonical.push_str(secret);
        append_custom_params(&mut canonical, custom_params);

        debug!(
            has_invoice = invoice_id.is_some(),
            has_receipt = receipt_encoded.is_some(),
            custom_params = custom_params.len(),
            "Signing outbound payment request"
        );

        self.signer.digest_hex(canonical)
    }

    /// Signature the gateway attaches to a result callback.
    pub fn build_inbound_signature(
        &self,
        amount: &str,
        invoice_id: &str,
        secret: &str,
        custom_params: &BTreeMap<String, String>,
    ) -> String {
        let mut canonical = format!("{amount}{SEPARATOR}{invoice_id}{SEPARATOR}{secret}");
        append_custom_params(&mut canonical, custom_params);

        self.signer.digest_hex(canonical)
    }

    /// Recomputes the callback signature and compares it case-insensitively.
    pub fn verify(
        &self,
        provided_signature: &str,
        amount: &str,
        invoice_id: &str,
        secret: &str,
        custom_params: &BTreeMap<String, String>,
    ) -> bool {
        let expected = self.build_inbound_signature(amount, invoice_id, secret, custom_params);
        let matches = expected.eq_ignore_ascii_case(provided_signature);

        if !matches {
            warn!("Signature mismatch for invoice {}", invoice_id);
        }

        matches
    }

    /// Signature over an encoded fiscal receipt: `receipt ++ secret`, no separator.
    pub fn build_receipt_fiscal_signature(&self, encoded_receipt: &str, secret: &str) -> String {
        self.signer
            .digest_hex(format!("{encoded_receipt}{secret}"))
            .to_lowercase()
    }
}

/// Appends `:k1=v1:k2=v2` in ascending byte order of the keys.
fn append_custom_params(canonical: &mut String, custom_params: &BTreeMap<String, String>) {
    for (key, value) in custom_params {
        canonical.push(SEPARATOR);
        canonical.push_str(key);
        canonical.push('=');
        canonical.push_str(value);
    }
}
