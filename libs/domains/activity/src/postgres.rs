use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect};

use crate::{
    entity,
    error::{ActivityError, ActivityResult},
    models::{ActivityLog, NewActivity},
    repository::ActivityRepository,
};

pub struct PgActivityRepository {
    db: DatabaseConnection,
}

impl PgActivityRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn insert(&self, activity: NewActivity) -> ActivityResult<ActivityLog> {
        let active_model: entity::ActiveModel = activity.into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| ActivityError::Internal(format!("Database error: {}", e)))?;

        tracing::debug!(activity_id = %model.id, event_type = %model.event_type, "Inserted activity log");
        Ok(model.into())
    }

    async fn recent(&self, limit: u64) -> ActivityResult<Vec<ActivityLog>> {
        let models = entity::Entity::find()
            .order_by_desc(entity::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| ActivityError::Internal(format!("Database error: {}", e)))?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
