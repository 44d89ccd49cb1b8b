use crate::models::{ActivityContext, ActivityLog, EventType, NewActivity};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// Sea-ORM entity for the `activity_logs` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    /// Free text; other services write here too
    pub event_type: String,
    pub context: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ActivityLog {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            event_type: EventType::from(model.event_type),
            context: ActivityContext::from(model.context),
            metadata: model.metadata,
            created_at: model.created_at.into(),
        }
    }
}

impl From<NewActivity> for ActiveModel {
    fn from(input: NewActivity) -> Self {
        ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            event_type: Set(input.event_type.into()),
            context: Set(input.context.into()),
            metadata: Set(input.metadata),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}
