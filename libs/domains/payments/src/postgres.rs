use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, QueryFilter,
    Statement,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{PaymentError, PaymentResult},
    models::{NewPayment, Payment},
    repository::PaymentRepository,
};

pub struct PgPaymentRepository {
    db: DatabaseConnection,
}

impl PgPaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_error(e: DbErr) -> PaymentError {
    PaymentError::Internal(format!("Database error: {}", e))
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn insert(&self, payment: NewPayment) -> PaymentResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"INSERT INTO payments
                   (id, user_id, stripe_session_id, stripe_customer_id, amount_total, currency, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT (stripe_session_id) DO NOTHING"#,
            [
                Uuid::now_v7().into(),
                payment.user_id.into(),
                payment.stripe_session_id.clone().into(),
                payment.stripe_customer_id.into(),
                payment.amount_total.into(),
                payment.currency.into(),
                payment.status.into(),
            ],
        );

        let result = self.db.execute_raw(stmt).await.map_err(db_error)?;
        let inserted = result.rows_affected() > 0;
        tracing::debug!(
            session_id = %payment.stripe_session_id,
            inserted,
            "Recorded payment"
        );
        Ok(inserted)
    }

    async fn find_by_session_id(&self, session_id: &str) -> PaymentResult<Option<Payment>> {
        let model = entity::Entity::find()
            .filter(entity::Column::StripeSessionId.eq(session_id))
            .one(&self.db)
            .await
            .map_err(db_error)?;
        Ok(model.map(Into::into))
    }
}
