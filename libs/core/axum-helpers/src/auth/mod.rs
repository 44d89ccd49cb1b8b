//! Supabase access-token authentication.
//!
//! Tokens are verified locally against the project's JWT secret; there is no
//! session store. Middleware puts [`JwtClaims`] into request extensions and
//! handlers read them through [`AuthUser`] or [`MaybeAuthUser`].
//!
//! ```ignore
//! use axum_helpers::auth::{SupabaseAuth, SupabaseAuthConfig, optional_jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = SupabaseAuth::new(&SupabaseAuthConfig::from_env()?);
//!
//! let api = Router::new()
//!     .route("/progress", put(handler))
//!     .layer(axum::middleware::from_fn_with_state(auth, optional_jwt_auth_middleware));
//! ```

pub mod config;
pub mod middleware;
pub mod supabase;

pub use config::SupabaseAuthConfig;
pub use middleware::{AuthUser, MaybeAuthUser, optional_jwt_auth_middleware};
pub use supabase::{JwtClaims, SupabaseAuth};
