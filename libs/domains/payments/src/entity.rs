use crate::models::Payment;
use sea_orm::entity::prelude::*;

/// Sea-ORM entity for the `payments` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Text", unique)]
    pub stripe_session_id: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub stripe_customer_id: Option<String>,
    pub amount_total: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub currency: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Payment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            stripe_session_id: model.stripe_session_id,
            stripe_customer_id: model.stripe_customer_id,
            amount_total: model.amount_total,
            currency: model.currency,
            status: model.status,
            created_at: model.created_at.into(),
        }
    }
}
