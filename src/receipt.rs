//! Fiscal receipts: the two JSON shapes the gateway accepts and the signed
//! tokens for the receipt attach endpoint.

use std::io;

use base64::prelude::*;
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;

use crate::base64url;
use crate::error::Result;
use crate::signature::SignatureEngine;

/// Payment type code for non-cash (electronic) payments.
pub const NON_CASH_PAYMENT: u8 = 2;

pub const DEFAULT_OPERATION: &str = "sell";

/// Line items are forwarded to the gateway untouched.
pub type ReceiptItem = serde_json::Value;

/// Taxation system of the merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxSystem {
    /// General regime.
    Osn,
    /// Simplified, income.
    UsnIncome,
    /// Simplified, income minus expense.
    UsnIncomeOutcome,
    /// Imputed income.
    Envd,
    /// Agricultural tax.
    Esn,
    Patent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Client {
    pub fn new(email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            phone: Some(phone.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "type")]
    pub kind: u8,
    pub sum: f64,
}

impl Payment {
    pub fn new(kind: u8, sum: f64) -> Self {
        Self { kind, sum }
    }

    pub fn non_cash(sum: f64) -> Self {
        Self::new(NON_CASH_PAYMENT, sum)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vat {
    #[serde(rename = "type")]
    pub kind: String,
    pub sum: f64,
}

impl Vat {
    pub fn new(kind: impl Into<String>, sum: f64) -> Self {
        Self {
            kind: kind.into(),
            sum,
        }
    }
}

/// A fiscal receipt.
///
/// Field order is the wire order of the full ("second") JSON form.
///
/// ```
/// use adapter_merchant_robokassa::receipt::{Payment, Receipt, TaxSystem};
///
/// let receipt = Receipt::builder()
///     .sno(TaxSystem::Osn)
///     .items(vec![serde_json::json!({"name": "Book", "quantity": 1, "sum": 10.0})])
///     .payments(vec![Payment::non_cash(10.0)])
///     .build();
///
/// assert_eq!(receipt.operation, "sell");
/// assert_eq!(
///     receipt.to_first_json().unwrap(),
///     r#"{"sno":"osn","items":[{"name":"Book","quantity":1,"sum":10.0}]}"#
/// );
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Unset when the merchant has a single taxation system on file.
    pub sno: Option<TaxSystem>,
    #[builder(into)]
    pub merchant_id: Option<String>,
    #[builder(into)]
    pub id: Option<String>,
    #[builder(into)]
    pub origin_id: Option<String>,
    #[builder(into, default = String::from(DEFAULT_OPERATION))]
    pub operation: String,
    #[builder(into)]
    pub url: Option<String>,
    pub total: Option<f64>,
    #[builder(default)]
    pub items: Vec<ReceiptItem>,
    pub client: Option<Client>,
    #[builder(default)]
    pub payments: Vec<Payment>,
    #[builder(default)]
    pub vats: Vec<Vat>,
}

#[derive(Serialize)]
struct FirstReceipt<'a> {
    sno: Option<TaxSystem>,
    items: &'a [ReceiptItem],
}

impl Receipt {
    /// Minimal `{sno, items}` form sent with a payment request.
    /// Non-ASCII characters are escaped.
    pub fn to_first_json(&self) -> Result<String> {
        let first = FirstReceipt {
            sno: self.sno,
            items: &self.items,
        };
        to_legacy_json(&first, true)
    }

    /// Full form for the fiscal receipt API, unicode written literally.
    pub fn to_second_json(&self) -> Result<String> {
        to_legacy_json(self, false)
    }
}

/// Writes JSON the way the gateway's reference clients do: `/` is always
/// escaped and non-ASCII is optionally escaped as lowercase `\uXXXX`.
struct LegacyFormatter {
    escape_unicode: bool,
}

impl Formatter for LegacyFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            let escape_unicode = self.escape_unicode && !ch.is_ascii();
            if ch != '/' && !escape_unicode {
                continue;
            }

            writer.write_all(fragment[start..index].as_bytes())?;
            if ch == '/' {
                writer.write_all(b"\\/")?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

fn to_legacy_json<T>(value: &T, escape_unicode: bool) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, LegacyFormatter { escape_unicode });
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(out)?)
}

/// Response contract of the receipt attach call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalAttachment {
    pub url: String,
    #[serde(rename = "base64url")]
    pub variant_a: String,
    #[serde(rename = "base64url2")]
    pub variant_b: String,
}

/// Produces the signed `payload.signature` tokens for the attach endpoint.
///
/// The gateway has shipped two client implementations that encode the
/// receipt differently and deployments disagree on which one they accept,
/// so both tokens are produced and kept separate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiptCodec {
    engine: SignatureEngine,
}

impl ReceiptCodec {
    pub fn new(engine: SignatureEngine) -> Self {
        Self { engine }
    }

    /// Base64Url of the JSON, then Base64Url of the hex signature.
    pub fn variant_a(&self, receipt_json: &str, secret: &str) -> String {
        let receipt = base64url::encode(receipt_json);
        let signature = self.engine.build_receipt_fiscal_signature(&receipt, secret);
        format!("{}.{}", receipt, base64url::encode(signature))
    }

    /// URL-safe substitution on the raw JSON first, then standard base64
    /// without padding for both halves.
    pub fn variant_b(&self, receipt_json: &str, secret: &str) -> String {
        let substituted = receipt_json.replace('+', "-").replace('/', "_");
        let receipt = BASE64_STANDARD_NO_PAD.encode(substituted);
        let signature = self.engine.build_receipt_fiscal_signature(&receipt, secret);
        format!("{}.{}", receipt, BASE64_STANDARD_NO_PAD.encode(signature))
    }

    pub fn attach_fiscal(
        &self,
        receipt_json: &str,
        secret: &str,
        fiscal_base_url: &str,
    ) -> FiscalAttachment {
        debug!("Encoding receipt for fiscal attach ({} bytes)", receipt_json.len());

        FiscalAttachment {
            url: format!("{fiscal_base_url}/Attach"),
            variant_a: self.variant_a(receipt_json, secret),
            variant_b: self.variant_b(receipt_json, secret),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const FISCAL_URL: &str = "https://ws.roboxchange.com/RoboFiscal/Receipt";

    fn full_receipt() -> Receipt {
        Receipt::builder()
            .sno(TaxSystem::UsnIncome)
            .merchant_id("shop1")
            .id("15")
            .url("https://shop.example/")
            .total(100.0)
            .items(vec![json!({"name": "Товар", "quantity": 1, "sum": 100.0})])
            .client(Client::new("buyer@example.com", "+79990000000"))
            .payments(vec![Payment::non_cash(100.0)])
            .vats(vec![Vat::new("none", 0.0)])
            .build()
    }

    #[test]
    fn test_builder_defaults() {
        let receipt = Receipt::builder().build();
        assert_eq!(receipt.sno, None);
        assert_eq!(receipt.operation, DEFAULT_OPERATION);
        assert!(receipt.items.is_empty());
        assert!(receipt.payments.is_empty());
        assert_eq!(Payment::non_cash(1.5).kind, NON_CASH_PAYMENT);
    }

    #[test]
    fn test_first_json_escapes_unicode() {
        let json = full_receipt().to_first_json().unwrap();
        assert_eq!(
            json,
            r#"{"sno":"usn_income","items":[{"name":"\u0422\u043e\u0432\u0430\u0440","quantity":1,"sum":100.0}]}"#
        );
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["items"][0]["name"], "Товар");
    }

    #[test]
    fn test_first_json_without_tax_system() {
        let receipt = Receipt::builder().build();
        assert_eq!(receipt.to_first_json().unwrap(), r#"{"sno":null,"items":[]}"#);
    }

    #[test]
    fn test_first_json_escapes_astral_as_surrogates() {
        let receipt = Receipt::builder().items(vec![json!("🙂")]).build();
        assert_eq!(
            receipt.to_first_json().unwrap(),
            r#"{"sno":null,"items":["\ud83d\ude42"]}"#
        );
    }

    #[test]
    fn test_second_json_full_shape() {
        let json = full_receipt().to_second_json().unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"sno":"usn_income","merchantId":"shop1","id":"15","originId":null,"#,
                r#""operation":"sell","url":"https:\/\/shop.example\/","total":100.0,"#,
                r#""items":[{"name":"Товар","quantity":1,"sum":100.0}],"#,
                r#""client":{"email":"buyer@example.com","phone":"+79990000000"},"#,
                r#""payments":[{"type":2,"sum":100.0}],"vats":[{"type":"none","sum":0.0}]}"#
            )
        );

        let parsed: Receipt = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, full_receipt());
    }

    #[test]
    fn test_tax_system_identifiers() {
        let identifiers: Vec<String> = [
            TaxSystem::Osn,
            TaxSystem::UsnIncome,
            TaxSystem::UsnIncomeOutcome,
            TaxSystem::Envd,
            TaxSystem::Esn,
            TaxSystem::Patent,
        ]
        .iter()
        .map(|sno| serde_json::to_value(sno).unwrap().as_str().unwrap().to_string())
        .collect();
        assert_eq!(
            identifiers,
            ["osn", "usn_income", "usn_income_outcome", "envd", "esn", "patent"]
        );
    }

    #[test]
    fn test_attach_variants_agree_without_special_characters() {
        let codec = ReceiptCodec::default();
        let attachment = codec.attach_fiscal(r#"{"sno":"osn","items":[]}"#, "secret1", FISCAL_URL);

        assert_eq!(attachment.url, format!("{FISCAL_URL}/Attach"));
        assert_eq!(
            attachment.variant_a,
            "eyJzbm8iOiJvc24iLCJpdGVtcyI6W119.NWVhNjAzM2ViNjdiMzBlNDdiODg3MWEwMTBmZjY5YTk"
        );
        assert_eq!(attachment.variant_a, attachment.variant_b);
    }

    #[test]
    fn test_attach_variants_diverge() {
        let codec = ReceiptCodec::default();
        let receipt_json = r#"{"items":[{"name":"a/b+c"}]}"#;

        assert_eq!(
            codec.variant_a(receipt_json, "secret1"),
            "eyJpdGVtcyI6W3sibmFtZSI6ImEvYitjIn1dfQ.MWQ1MDg5MzFlMTU5NjQyNTVjN2ExNTc1YjFlZjQxYWU"
        );
        assert_eq!(
            codec.variant_b(receipt_json, "secret1"),
            "eyJpdGVtcyI6W3sibmFtZSI6ImFfYi1jIn1dfQ.YWIyY2E0YjVmMjFjMGZjMTJkNGU5NjIxNGVkNWEwNTc"
        );
    }

    #[test]
    fn test_attach_tokens_verify_per_variant() {
        let engine = SignatureEngine::default();
        let codec = ReceiptCodec::new(engine);
        let receipt_json = full_receipt().to_second_json().unwrap();
        let attachment = codec.attach_fiscal(&receipt_json, "pass1", FISCAL_URL);

        let (payload_a, signature_a) = attachment.variant_a.split_once('.').unwrap();
        assert_eq!(payload_a, base64url::encode(&receipt_json));
        let signature_a = base64url::decode(signature_a, true).unwrap();
        assert_eq!(
            String::from_utf8(signature_a).unwrap(),
            engine.build_receipt_fiscal_signature(payload_a, "pass1")
        );

        let (payload_b, signature_b) = attachment.variant_b.split_once('.').unwrap();
        let signature_b = BASE64_STANDARD_NO_PAD.decode(signature_b).unwrap();
        assert_eq!(
            String::from_utf8(signature_b).unwrap(),
            engine.build_receipt_fiscal_signature(payload_b, "pass1")
        );
    }

    #[test]
    fn test_attachment_response_contract() {
        let attachment = FiscalAttachment {
            url: "u".into(),
            variant_a: "a".into(),
            variant_b: "b".into(),
        };
        assert_eq!(
            serde_json::to_value(&attachment).unwrap(),
            json!({"url": "u", "base64url": "a", "base64url2": "b"})
        );
    }
}
