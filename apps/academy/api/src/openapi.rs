use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the `bearer_auth` scheme referenced by protected paths.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let mut scheme = Http::new(HttpAuthScheme::Bearer);
        scheme.bearer_format = Some("JWT".to_string());
        components.add_security_scheme("bearer_auth", SecurityScheme::Http(scheme));
    }
}

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Academy API",
        version = "0.1.0",
        description = "Paywalled video curriculum with semantic next-video recommendations"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    modifiers(&SecurityAddon),
    nest(
        (path = "/curriculum", api = domain_curriculum::handlers::ApiDoc),
        (path = "/adventure", api = domain_adventure::handlers::ApiDoc),
        (path = "/adventure", api = domain_adventure::handlers::AdminApiDoc),
        (path = "/payments", api = domain_payments::handlers::ApiDoc),
        (path = "/activity", api = domain_activity::handlers::ApiDoc),
        (path = "/admin", api = domain_curriculum::handlers::AdminApiDoc)
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_mounted_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/curriculum/logbook",
            "/curriculum/videos/{id}/playback",
            "/adventure/videos/{id}/crossroads",
            "/adventure/embeddings/bulk",
            "/payments/checkout",
            "/activity/study-downloads",
            "/admin/stats",
        ] {
            assert!(paths.contains(&expected), "missing {expected}: {paths:?}");
        }
    }

    #[test]
    fn test_bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
