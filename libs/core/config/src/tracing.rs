use crate::{Environment, env_or_default};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, prelude::*};

/// Production filter when `RUST_LOG` is unset. Payment and audit events stay
/// at info; pool chatter is held back.
const PRODUCTION_FILTER: &str =
    "info,audit=info,domain_payments=info,sea_orm=warn,sqlx=warn,reqwest=warn,tower_http=info";
/// Development filter when `RUST_LOG` is unset.
const DEVELOPMENT_FILTER: &str = "debug,sqlx=info,hyper=info,hyper_util=info,rustls=info";

/// Log line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// `LOG_FORMAT=json|pretty`, else JSON in production and pretty elsewhere.
    pub fn resolve(environment: &Environment) -> Self {
        match env_or_default("LOG_FORMAT", "").to_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ if environment.is_production() => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install color-eyre for startup errors. Repeat calls are ignored.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the environment's default filter. The
/// `tracing_error::ErrorLayer` lets eyre reports carry span traces. Calling
/// this again after a subscriber is set only logs at debug.
pub fn init_tracing(environment: &Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if environment.is_production() {
            PRODUCTION_FILTER
        } else {
            DEVELOPMENT_FILTER
        })
    });
    let format = LogFormat::resolve(environment);

    let registry = tracing_subscriber::registry()
        .with(tracing_error::ErrorLayer::default())
        .with(filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .flatten_event(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .try_init(),
    };

    match result {
        Ok(_) => info!(?environment, ?format, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_follows_environment() {
        temp_env::with_var_unset("LOG_FORMAT", || {
            assert_eq!(LogFormat::resolve(&Environment::Production), LogFormat::Json);
            assert_eq!(LogFormat::resolve(&Environment::Development), LogFormat::Pretty);
        });
    }

    #[test]
    fn test_format_override() {
        temp_env::with_var("LOG_FORMAT", Some("JSON"), || {
            assert_eq!(LogFormat::resolve(&Environment::Development), LogFormat::Json);
        });
        temp_env::with_var("LOG_FORMAT", Some("pretty"), || {
            assert_eq!(LogFormat::resolve(&Environment::Production), LogFormat::Pretty);
        });
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(&Environment::Development);
        init_tracing(&Environment::Production);
    }

    #[test]
    fn test_default_filters_parse() {
        assert!(EnvFilter::try_new(PRODUCTION_FILTER).is_ok());
        assert!(EnvFilter::try_new(DEVELOPMENT_FILTER).is_ok());
    }
}
