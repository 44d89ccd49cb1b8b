use axum_helpers::SupabaseAuthConfig;
use core_config::{AppInfo, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_adventure::{GeminiConfig, PipelineConfig};
use domain_payments::StripeConfig;
use media::CloudinaryConfig;

pub use core_config::Environment;

pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";

/// Application configuration, composed from each crate's `FromEnv` config.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub auth: SupabaseAuthConfig,
    pub stripe: StripeConfig,
    pub cloudinary: CloudinaryConfig,
    pub gemini: GeminiConfig,
    pub pipeline: PipelineConfig,
    /// Checkout redirect origin when the request has no `Origin` header
    pub app_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            database: PostgresConfig::from_env()?,
            auth: SupabaseAuthConfig::from_env()?,
            stripe: StripeConfig::from_env()?,
            cloudinary: CloudinaryConfig::from_env()?,
            gemini: GeminiConfig::from_env()?,
            pipeline: PipelineConfig::from_env()?,
            app_base_url: env_or_default("APP_BASE_URL", DEFAULT_APP_BASE_URL),
        })
    }
}
