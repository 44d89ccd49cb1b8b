use super::config::SupabaseAuthConfig;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by a Supabase access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Auth user id; equals `profiles.id`
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    /// Postgres role the token maps to (`authenticated`, `anon`)
    #[serde(default)]
    pub role: Option<String>,
    pub aud: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

/// HS256 verifier for tokens issued by Supabase Auth.
#[derive(Clone)]
pub struct SupabaseAuth {
    key: DecodingKey,
    validation: Validation,
    access_cookie: String,
}

impl SupabaseAuth {
    pub fn new(config: &SupabaseAuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            access_cookie: config.access_cookie.clone(),
        }
    }

    /// Verify signature, expiry and audience, returning the claims.
    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, jsonwebtoken::errors::Error> {
        decode::<JwtClaims>(token, &self.key, &self.validation).map(|data| data.claims)
    }

    pub fn access_cookie(&self) -> &str {
        &self.access_cookie
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    pub const SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

    pub fn auth() -> SupabaseAuth {
        SupabaseAuth::new(&SupabaseAuthConfig::new(SECRET))
    }

    pub fn token_for(user_id: Uuid, aud: &str, exp_offset: i64) -> String {
        let claims = JwtClaims {
            sub: user_id,
            email: Some("athlete@example.com".into()),
            role: Some("authenticated".into()),
            aud: aud.into(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            iat: Some(chrono::Utc::now().timestamp()),
            session_id: None,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }
}
