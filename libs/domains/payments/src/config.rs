use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse, env_required};

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Seconds a webhook signature timestamp may lag behind the clock.
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// The single product sold through checkout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutProduct {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    /// Minor units, e.g. cents
    pub unit_amount: i64,
    pub currency: String,
}

impl Default for CheckoutProduct {
    fn default() -> Self {
        Self {
            name: "Centenarian Athlete Academy: Full CPT Access".to_string(),
            description: "Lifelong access to the non-linear CPT curriculum, study guides, and flashcards."
                .to_string(),
            image: None,
            unit_amount: 10_000,
            currency: "usd".to_string(),
        }
    }
}

/// Stripe credentials and checkout settings.
///
/// Environment variables:
/// - `STRIPE_SECRET_KEY`, `STRIPE_WEBHOOK_SECRET` (required)
/// - `STRIPE_API_BASE` (default `https://api.stripe.com`)
/// - `STRIPE_PRODUCT_NAME`, `STRIPE_PRODUCT_DESCRIPTION`, `STRIPE_PRODUCT_IMAGE`
/// - `STRIPE_PRODUCT_AMOUNT` (default 10000), `STRIPE_PRODUCT_CURRENCY` (default `usd`)
#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub api_base: String,
    pub webhook_tolerance_secs: i64,
    pub product: CheckoutProduct,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            webhook_secret: webhook_secret.into(),
            api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            webhook_tolerance_secs: DEFAULT_WEBHOOK_TOLERANCE_SECS,
            product: CheckoutProduct::default(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

impl FromEnv for StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = CheckoutProduct::default();
        let product = CheckoutProduct {
            name: env_or_default("STRIPE_PRODUCT_NAME", &defaults.name),
            description: env_or_default("STRIPE_PRODUCT_DESCRIPTION", &defaults.description),
            image: env_optional("STRIPE_PRODUCT_IMAGE"),
            unit_amount: env_parse("STRIPE_PRODUCT_AMOUNT", defaults.unit_amount)?,
            currency: env_or_default("STRIPE_PRODUCT_CURRENCY", &defaults.currency),
        };

        if product.unit_amount <= 0 {
            return Err(ConfigError::ParseError {
                key: "STRIPE_PRODUCT_AMOUNT".to_string(),
                details: "must be a positive amount in minor units".to_string(),
            });
        }

        Ok(Self {
            secret_key: env_required("STRIPE_SECRET_KEY")?,
            webhook_secret: env_required("STRIPE_WEBHOOK_SECRET")?,
            api_base: env_or_default("STRIPE_API_BASE", DEFAULT_STRIPE_API_BASE),
            webhook_tolerance_secs: DEFAULT_WEBHOOK_TOLERANCE_SECS,
            product,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_VARS: [&str; 5] = [
        "STRIPE_PRODUCT_NAME",
        "STRIPE_PRODUCT_DESCRIPTION",
        "STRIPE_PRODUCT_IMAGE",
        "STRIPE_PRODUCT_AMOUNT",
        "STRIPE_PRODUCT_CURRENCY",
    ];

    #[test]
    fn test_from_env_defaults() {
        let mut vars: Vec<(&str, Option<&str>)> = vec![
            ("STRIPE_SECRET_KEY", Some("sk_test_123")),
            ("STRIPE_WEBHOOK_SECRET", Some("whsec_abc")),
            ("STRIPE_API_BASE", None),
        ];
        vars.extend(PRODUCT_VARS.iter().map(|k| (*k, None)));

        temp_env::with_vars(vars, || {
            let config = StripeConfig::from_env().unwrap();
            assert_eq!(config.secret_key, "sk_test_123");
            assert_eq!(config.api_base, DEFAULT_STRIPE_API_BASE);
            assert_eq!(config.webhook_tolerance_secs, 300);
            assert_eq!(config.product, CheckoutProduct::default());
            assert_eq!(config.product.unit_amount, 10_000);
        });
    }

    #[test]
    fn test_from_env_product_overrides() {
        temp_env::with_vars(
            [
                ("STRIPE_SECRET_KEY", Some("sk_test_123")),
                ("STRIPE_WEBHOOK_SECRET", Some("whsec_abc")),
                ("STRIPE_PRODUCT_AMOUNT", Some("4900")),
                ("STRIPE_PRODUCT_CURRENCY", Some("eur")),
                ("STRIPE_PRODUCT_IMAGE", Some("https://cdn.test/logo.png")),
            ],
            || {
                let config = StripeConfig::from_env().unwrap();
                assert_eq!(config.product.unit_amount, 4900);
                assert_eq!(config.product.currency, "eur");
                assert_eq!(
                    config.product.image.as_deref(),
                    Some("https://cdn.test/logo.png")
                );
            },
        );
    }

    #[test]
    fn test_from_env_rejects_bad_amount() {
        temp_env::with_vars(
            [
                ("STRIPE_SECRET_KEY", Some("sk_test_123")),
                ("STRIPE_WEBHOOK_SECRET", Some("whsec_abc")),
                ("STRIPE_PRODUCT_AMOUNT", Some("0")),
            ],
            || {
                let err = StripeConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("STRIPE_PRODUCT_AMOUNT"));
            },
        );
    }

    #[test]
    fn test_from_env_missing_webhook_secret() {
        temp_env::with_vars(
            [
                ("STRIPE_SECRET_KEY", Some("sk_test_123")),
                ("STRIPE_WEBHOOK_SECRET", None),
            ],
            || {
                let err = StripeConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("STRIPE_WEBHOOK_SECRET"));
            },
        );
    }
}
