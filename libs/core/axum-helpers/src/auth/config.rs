//! Supabase Auth configuration.

use core_config::{ConfigError, FromEnv, env_or_default, env_required};

/// Cookie set by the Supabase browser client.
pub const DEFAULT_ACCESS_COOKIE: &str = "sb-access-token";

/// Verifier settings for Supabase-issued access tokens.
///
/// Loaded from environment variables:
/// - `SUPABASE_JWT_SECRET` (required, at least 32 characters)
/// - `SUPABASE_JWT_AUDIENCE` (default `authenticated`)
/// - `SUPABASE_ACCESS_COOKIE` (default `sb-access-token`)
#[derive(Clone, Debug)]
pub struct SupabaseAuthConfig {
    pub jwt_secret: String,
    pub audience: String,
    pub access_cookie: String,
}

impl SupabaseAuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            audience: "authenticated".to_string(),
            access_cookie: DEFAULT_ACCESS_COOKIE.to_string(),
        }
    }
}

impl FromEnv for SupabaseAuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env_required("SUPABASE_JWT_SECRET")?;

        if jwt_secret.len() < 32 {
            return Err(ConfigError::ParseError {
                key: "SUPABASE_JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters (got {}); copy it from the project's API settings",
                    jwt_secret.len()
                ),
            });
        }

        Ok(Self {
            jwt_secret,
            audience: env_or_default("SUPABASE_JWT_AUDIENCE", "authenticated"),
            access_cookie: env_or_default("SUPABASE_ACCESS_COOKIE", DEFAULT_ACCESS_COOKIE),
        })
    }
}
