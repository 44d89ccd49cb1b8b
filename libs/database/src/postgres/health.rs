use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::{DatabaseError, DatabaseResult};

/// Readiness probe: the pool can run a query and `pgvector` is installed.
pub async fn check_health(db: &DatabaseConnection) -> DatabaseResult<()> {
    debug!("Probing Postgres");

    let stmt = Statement::from_string(
        DatabaseBackend::Postgres,
        "SELECT extname FROM pg_extension WHERE extname = 'vector'",
    );
    match db.query_one_raw(stmt).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(DatabaseError::NotReady(
            "pgvector extension is not installed".to_string(),
        )),
        Err(e) => Err(DatabaseError::NotReady(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbErr, MockDatabase, Value};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_ready_when_vector_extension_present() {
        let row = BTreeMap::from([("extname", Value::from("vector"))]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();

        assert!(check_health(&db).await.is_ok());
    }

    #[tokio::test]
    async fn test_not_ready_without_extension() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();

        let err = check_health(&db).await.unwrap_err();
        assert!(err.to_string().contains("pgvector"));
    }

    #[tokio::test]
    async fn test_not_ready_on_query_failure() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("server closed the connection".into())])
            .into_connection();

        let err = check_health(&db).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotReady(_)));
        assert!(err.to_string().contains("server closed the connection"));
    }
}
