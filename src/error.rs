/// Configuration and encoding failures. These are unexpected conditions,
/// reported separately from the callback outcomes in [`VerificationError`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed merchant configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The configured hash algorithm identifier is not known to the gateway.
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(String),

    /// Base64 decoding errors.
    #[error("Base64 decode error: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// JSON serialization errors.
    #[error("Serde JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// UTF-8 decoding errors.
    #[error("UTF-8 decode error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Gateway URL could not be parsed.
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// A specialized `Result` type for merchant operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Expected outcomes of rejecting an inbound result callback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// A required callback parameter was absent.
    #[error("Missing callback parameter: {0}")]
    MissingField(&'static str),

    /// The recomputed signature disagrees with `SignatureValue`.
    #[error("Callback signature mismatch")]
    SignatureMismatch,
}
