//! Merchant settings read from the environment.

use url::Url;

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::model::MerchantCredentials;
use crate::payment::DEFAULT_CUSTOM_PREFIX;

pub const DEFAULT_BASE_URL: &str = "https://auth.robokassa.ru/Merchant/Index.aspx";
pub const DEFAULT_FISCAL_URL: &str = "https://ws.roboxchange.com/RoboFiscal/Receipt";

pub const LOGIN_VAR: &str = "ROBOKASSA_LOGIN";
pub const PASSWORD1_VAR: &str = "ROBOKASSA_PASSWORD1";
pub const PASSWORD2_VAR: &str = "ROBOKASSA_PASSWORD2";
pub const HASH_ALGO_VAR: &str = "ROBOKASSA_HASH_ALGO";
pub const IS_TEST_VAR: &str = "ROBOKASSA_IS_TEST";
pub const BASE_URL_VAR: &str = "ROBOKASSA_BASE_URL";
pub const FISCAL_URL_VAR: &str = "ROBOKASSA_FISCAL_URL";
pub const CUSTOM_PREFIX_VAR: &str = "ROBOKASSA_CUSTOM_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantConfig {
    pub credentials: MerchantCredentials,
    pub is_test: bool,
    pub base_url: String,
    pub fiscal_url: String,
    pub custom_prefix: String,
}

impl MerchantConfig {
    pub fn new(credentials: MerchantCredentials) -> Self {
        Self {
            credentials,
            is_test: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            fiscal_url: DEFAULT_FISCAL_URL.to_string(),
            custom_prefix: DEFAULT_CUSTOM_PREFIX.to_string(),
        }
    }

    /// Reads the process environment. Call `dotenv::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unknown hash algorithms
    /// and malformed URLs are rejected here rather than on first use.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::Config(format!("Missing config: {key}")))
        };

        let hash_algorithm = match lookup(HASH_ALGO_VAR) {
            Some(name) => name.parse::<HashAlgorithm>()?,
            None => HashAlgorithm::default(),
        };

        let credentials = MerchantCredentials::new(
            required(LOGIN_VAR)?,
            required(PASSWORD1_VAR)?,
            required(PASSWORD2_VAR)?,
        )
        .with_hash_algorithm(hash_algorithm);

        let is_test = match lookup(IS_TEST_VAR) {
            Some(flag) => parse_flag(&flag)?,
            None => false,
        };

        let base_url = lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Url::parse(&base_url)?;
        let fiscal_url = lookup(FISCAL_URL_VAR).unwrap_or_else(|| DEFAULT_FISCAL_URL.to_string());
        Url::parse(&fiscal_url)?;

        let custom_prefix =
            lookup(CUSTOM_PREFIX_VAR).unwrap_or_else(|| DEFAULT_CUSTOM_PREFIX.to_string());

        Ok(Self {
            credentials,
            is_test,
            base_url,
            fiscal_url,
            custom_prefix,
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config(format!("Invalid {IS_TEST_VAR}: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        (LOGIN_VAR, "shop1"),
        (PASSWORD1_VAR, "secret1"),
        (PASSWORD2_VAR, "secret2"),
    ];

    #[test]
    fn test_defaults() {
        let config = MerchantConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(
            config,
            MerchantConfig::new(MerchantCredentials::new("shop1", "secret1", "secret2"))
        );
        assert_eq!(config.credentials.hash_algorithm, HashAlgorithm::Md5);
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            (HASH_ALGO_VAR, "SHA256"),
            (IS_TEST_VAR, "true"),
            (BASE_URL_VAR, "https://gateway.test/pay"),
            (CUSTOM_PREFIX_VAR, "shp_"),
        ]);
        let config = MerchantConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.credentials.hash_algorithm, HashAlgorithm::Sha256);
        assert!(config.is_test);
        assert_eq!(config.base_url, "https://gateway.test/pay");
        assert_eq!(config.fiscal_url, DEFAULT_FISCAL_URL);
        assert_eq!(config.custom_prefix, "shp_");
    }

    #[test]
    fn test_missing_password_fails() {
        let err = MerchantConfig::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(matches!(err, Error::Config(ref message) if message.contains(PASSWORD2_VAR)));
    }

    #[test]
    fn test_bad_algorithm_fails_at_load() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push((HASH_ALGO_VAR, "crc32"));
        assert!(matches!(
            MerchantConfig::from_lookup(lookup(&pairs)),
            Err(Error::UnsupportedHashAlgorithm(_))
        ));
    }

    #[test]
    fn test_bad_url_and_flag_fail_at_load() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push((FISCAL_URL_VAR, "not a url"));
        assert!(matches!(
            MerchantConfig::from_lookup(lookup(&pairs)),
            Err(Error::Url(_))
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push((IS_TEST_VAR, "maybe"));
        assert!(matches!(
            MerchantConfig::from_lookup(lookup(&pairs)),
            Err(Error::Config(_))
        ));
    }
}
