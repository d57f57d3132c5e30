use std::fmt;

use crate::hash::HashAlgorithm;

/// Shop identity at the gateway.
///
/// `outbound_secret` ("password #1") signs requests to the gateway,
/// `inbound_secret` ("password #2") checks result callbacks. They are never
/// swapped.
#[derive(Clone, PartialEq, Eq)]
pub struct MerchantCredentials {
    pub login: String,
    pub outbound_secret: String,
    pub inbound_secret: String,
    pub hash_algorithm: HashAlgorithm,
}

impl MerchantCredentials {
    pub fn new(
        login: impl Into<String>,
        outbound_secret: impl Into<String>,
        inbound_secret: impl Into<String>,
    ) -> Self {
        Self {
            login: login.into(),
            outbound_secret: outbound_secret.into(),
            inbound_secret: inbound_secret.into(),
            hash_algorithm: HashAlgorithm::default(),
        }
    }

    pub fn with_hash_algorithm(mut self, hash_algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = hash_algorithm;
        self
    }
}

impl fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("login", &self.login)
            .field("outbound_secret", &"***")
            .field("inbound_secret", &"***")
            .field("hash_algorithm", &self.hash_algorithm)
            .finish()
    }
}
