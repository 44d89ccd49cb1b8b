use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "chapters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub section_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    pub order_index: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Chapter {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            section_id: model.section_id,
            title: model.title,
            order_index: model.order_index,
        }
    }
}
