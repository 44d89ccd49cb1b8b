use super::supabase::{JwtClaims, SupabaseAuth};
use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Extract the access token from `Authorization: Bearer` or the auth cookie.
fn extract_token_from_request(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == cookie_name).then(|| value.to_string())
                    })
                })
        })
        .filter(|token| !token.is_empty())
}

/// Puts verified [`JwtClaims`] into request extensions when a token is present.
///
/// Anonymous requests pass through. An invalid token is treated the same as
/// no token. Routes that need a caller take [`AuthUser`], which rejects with
/// 401 when no claims were stored.
///
/// ```ignore
/// let api = Router::new()
///     .route("/progress", put(handler))
///     .layer(axum::middleware::from_fn_with_state(auth, optional_jwt_auth_middleware));
/// ```
pub async fn optional_jwt_auth_middleware(
    State(auth): State<SupabaseAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token_from_request(&headers, auth.access_cookie()) {
        match auth.verify_token(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
            }
            Err(e) => tracing::debug!("Ignoring invalid access token: {}", e),
        }
    }

    next.run(request).await
}

/// Authenticated caller, read from the claims the auth middleware stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

impl From<&JwtClaims> for AuthUser {
    fn from(claims: &JwtClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.clone(),
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<JwtClaims>()
            .map(AuthUser::from)
            .ok_or_else(|| {
                AppError::Unauthorized("Authentication required".to_string()).into_response()
            })
    }
}

/// Caller that may or may not be signed in.
#[derive(Debug, Clone, Default)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(
            parts.extensions.get::<JwtClaims>().map(AuthUser::from),
        ))
    }
}
