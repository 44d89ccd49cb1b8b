use tracing::{error, info};

/// Close the sea-orm pool, logging the outcome.
pub async fn close_postgres(db: sea_orm::DatabaseConnection) {
    match db.close().await {
        Ok(_) => info!("PostgreSQL connection pool closed"),
        Err(e) => error!("Error closing PostgreSQL connection pool: {}", e),
    }
}
