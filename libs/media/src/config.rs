use core_config::{ConfigError, FromEnv, env_or_default, env_required};
use strum::{Display, EnumString};

/// Digest used for request signatures; must match the account setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

#[derive(Clone, Debug)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub signature_algorithm: SignatureAlgorithm,
    pub api_base: String,
}

impl CloudinaryConfig {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            signature_algorithm: SignatureAlgorithm::default(),
            api_base: "https://api.cloudinary.com".to_string(),
        }
    }
}

/// Environment variables:
/// - `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET` (required)
/// - `CLOUDINARY_SIGNATURE_ALGORITHM`: `sha1` (default) or `sha256`
/// - `CLOUDINARY_API_BASE` (default `https://api.cloudinary.com`)
impl FromEnv for CloudinaryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let algorithm = env_or_default("CLOUDINARY_SIGNATURE_ALGORITHM", "sha1");
        let signature_algorithm =
            algorithm
                .parse()
                .map_err(|e: strum::ParseError| ConfigError::ParseError {
                    key: "CLOUDINARY_SIGNATURE_ALGORITHM".to_string(),
                    details: format!("{} (expected sha1 or sha256)", e),
                })?;

        Ok(Self {
            cloud_name: env_required("CLOUDINARY_CLOUD_NAME")?,
            api_key: env_required("CLOUDINARY_API_KEY")?,
            api_secret: env_required("CLOUDINARY_API_SECRET")?,
            signature_algorithm,
            api_base: env_or_default("CLOUDINARY_API_BASE", "https://api.cloudinary.com"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_credentials<F: FnOnce()>(algorithm: Option<&str>, f: F) {
        temp_env::with_vars(
            [
                ("CLOUDINARY_CLOUD_NAME", Some("academy")),
                ("CLOUDINARY_API_KEY", Some("1234")),
                ("CLOUDINARY_API_SECRET", Some("shh")),
                ("CLOUDINARY_SIGNATURE_ALGORITHM", algorithm),
                ("CLOUDINARY_API_BASE", None),
            ],
            f,
        );
    }

    #[test]
    fn test_from_env_defaults_to_sha1() {
        with_credentials(None, || {
            let config = CloudinaryConfig::from_env().unwrap();
            assert_eq!(config.cloud_name, "academy");
            assert_eq!(config.signature_algorithm, SignatureAlgorithm::Sha1);
            assert_eq!(config.api_base, "https://api.cloudinary.com");
        });
    }

    #[test]
    fn test_from_env_sha256_case_insensitive() {
        with_credentials(Some("SHA256"), || {
            let config = CloudinaryConfig::from_env().unwrap();
            assert_eq!(config.signature_algorithm, SignatureAlgorithm::Sha256);
        });
    }

    #[test]
    fn test_from_env_rejects_unknown_algorithm() {
        with_credentials(Some("md5"), || {
            let err = CloudinaryConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("CLOUDINARY_SIGNATURE_ALGORITHM"));
        });
    }

    #[test]
    fn test_from_env_missing_secret() {
        temp_env::with_vars(
            [
                ("CLOUDINARY_CLOUD_NAME", Some("academy")),
                ("CLOUDINARY_API_KEY", Some("1234")),
                ("CLOUDINARY_API_SECRET", None),
            ],
            || {
                let err = CloudinaryConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("CLOUDINARY_API_SECRET"));
            },
        );
    }
}
