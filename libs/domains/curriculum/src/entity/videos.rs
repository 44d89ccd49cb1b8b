use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "videos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub transcript_text: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub cloudinary_public_id: Option<String>,
    pub chapter_id: Option<Uuid>,
    pub order_index: i32,
    pub is_opener: bool,
    pub is_published: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Video {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            transcript_text: model.transcript_text,
            cloudinary_public_id: model.cloudinary_public_id,
            chapter_id: model.chapter_id,
            order_index: model.order_index,
            is_opener: model.is_opener,
            is_published: model.is_published,
            created_at: model.created_at.into(),
        }
    }
}
