//! Merchant side of the Robokassa payment gateway protocol: signed payment
//! links, result callback verification and fiscal receipt attachment.
//!
//! ```
//! use adapter_merchant_robokassa::{Merchant, MerchantConfig, MerchantCredentials, PaymentRequest};
//!
//! let merchant = Merchant::new(MerchantConfig::new(MerchantCredentials::new(
//!     "shop1", "secret1", "secret2",
//! )));
//! let request = PaymentRequest::builder().amount("123.45").invoice_id(42).build();
//! let url = merchant.payment_url(&request).unwrap();
//! assert!(url.contains("SignatureValue=0a8524bd33e8eb0d18b7c5ebdc6b5d0c"));
//! ```

#[macro_use]
extern crate tracing;

pub mod base64url;
pub mod callback;
pub mod config;
pub mod error;
pub mod hash;
pub mod merchant;
pub mod model;
pub mod payment;
pub mod receipt;
pub mod signature;

pub use callback::{CallbackVerifier, VerifiedCallback};
pub use config::MerchantConfig;
pub use error::{Error, Result, VerificationError};
pub use hash::{HashAlgorithm, HashSigner};
pub use merchant::Merchant;
pub use model::MerchantCredentials;
pub use payment::{Delivery, PaymentRequest, PaymentUrlBuilder};
pub use receipt::{FiscalAttachment, Receipt, ReceiptCodec, TaxSystem};
pub use signature::SignatureEngine;
