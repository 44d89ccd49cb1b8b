//! Shared application state.
//!
//! Services are built once at startup over the Postgres pool and one shared
//! HTTP client, then handed to routers as `Arc`s.

use axum_helpers::SupabaseAuth;
use database::postgres::DatabaseConnection;
use domain_activity::{ActivityService, PgActivityRepository};
use domain_adventure::{AdventureService, GeminiProvider, PgAdventureRepository};
use domain_curriculum::{CurriculumService, PgCurriculumRepository};
use domain_payments::{PaymentService, PgPaymentRepository, StripeClient};
use media::CloudinarySigner;
use std::sync::Arc;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub auth: SupabaseAuth,
    pub activity: Arc<ActivityService<PgActivityRepository>>,
    pub curriculum: Arc<CurriculumService<PgCurriculumRepository>>,
    pub adventure: Arc<AdventureService<PgAdventureRepository>>,
    pub payments: Arc<PaymentService<PgPaymentRepository>>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        let http = reqwest::Client::new();

        let activity = Arc::new(ActivityService::new(PgActivityRepository::new(db.clone())));

        let curriculum = Arc::new(CurriculumService::new(
            PgCurriculumRepository::new(db.clone()),
            Arc::new(CloudinarySigner::new(config.cloudinary.clone())),
            activity.clone(),
        ));

        let adventure = Arc::new(
            AdventureService::new(
                PgAdventureRepository::new(db.clone()),
                Arc::new(GeminiProvider::with_client(
                    http.clone(),
                    config.gemini.clone(),
                )),
                activity.clone(),
            )
            .with_bulk_delay(config.pipeline.bulk_delay),
        );

        let payments = Arc::new(PaymentService::new(
            PgPaymentRepository::new(db.clone()),
            Arc::new(StripeClient::with_client(http, config.stripe.clone())),
            curriculum.clone(),
            &config.stripe,
            config.app_base_url.clone(),
        ));

        Self {
            auth: SupabaseAuth::new(&config.auth),
            config,
            db,
            activity,
            curriculum,
            adventure,
            payments,
        }
    }
}
