use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "watch_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub video_id: Uuid,
    pub progress_seconds: i32,
    pub completed: bool,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::WatchProgress {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            video_id: model.video_id,
            progress_seconds: model.progress_seconds,
            completed: model.completed,
            updated_at: model.updated_at.into(),
        }
    }
}
