//! Postgres repository. The `embedding` column is pgvector, which sea-orm
//! does not model, so every statement here is raw SQL passing vectors in
//! their text form and casting with `::vector`.

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement,
};
use uuid::Uuid;

use crate::{
    error::{AdventureError, AdventureResult},
    models::{
        EmbeddingSource, PathVideo, Recommendation, parse_vector_literal, to_vector_literal,
    },
    repository::AdventureRepository,
};

pub struct PgAdventureRepository {
    db: DatabaseConnection,
}

impl PgAdventureRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_error(e: DbErr) -> AdventureError {
    AdventureError::Internal(format!("Database error: {}", e))
}

#[derive(Debug, FromQueryResult)]
struct SourceRow {
    id: Uuid,
    title: String,
    transcript_text: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct EmbeddingRow {
    embedding: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct IdRow {
    id: Uuid,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct MatchRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    similarity: f64,
}

#[derive(Debug, FromQueryResult)]
struct PathRow {
    id: Uuid,
    title: String,
    description: Option<String>,
}

#[async_trait]
impl AdventureRepository for PgAdventureRepository {
    async fn find_source(&self, video_id: Uuid) -> AdventureResult<Option<EmbeddingSource>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id, title, transcript_text FROM videos WHERE id = $1",
            [video_id.into()],
        );

        let row = SourceRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(row.map(|r| EmbeddingSource {
            id: r.id,
            title: r.title,
            transcript_text: r.transcript_text,
        }))
    }

    async fn store_embedding(&self, video_id: Uuid, embedding: &[f32]) -> AdventureResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE videos SET embedding = $2::text::vector WHERE id = $1",
            [video_id.into(), to_vector_literal(embedding).into()],
        );

        let result = self.db.execute_raw(stmt).await.map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_embedding(&self, video_id: Uuid) -> AdventureResult<Option<Vec<f32>>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT embedding::text AS embedding FROM videos WHERE id = $1",
            [video_id.into()],
        );

        let row = EmbeddingRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        match row.and_then(|r| r.embedding) {
            Some(text) => parse_vector_literal(&text).map(Some).ok_or_else(|| {
                AdventureError::Internal(format!("Malformed embedding for video {}", video_id))
            }),
            None => Ok(None),
        }
    }

    async fn pending_video_ids(&self) -> AdventureResult<Vec<Uuid>> {
        let stmt = Statement::from_string(
            DbBackend::Postgres,
            "SELECT id FROM videos WHERE is_published AND embedding IS NULL ORDER BY order_index, id",
        );

        let rows = IdRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    async fn match_videos(
        &self,
        embedding: &[f32],
        threshold: f64,
        count: u32,
        exclude_id: Uuid,
    ) -> AdventureResult<Vec<Recommendation>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
                SELECT id, title, description, similarity::float8 AS similarity
                FROM match_videos($1::text::vector, $2, $3, $4)
            "#,
            [
                to_vector_literal(embedding).into(),
                threshold.into(),
                (count.min(i32::MAX as u32) as i32).into(),
                exclude_id.into(),
            ],
        );

        let rows = MatchRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|r| Recommendation {
                id: r.id,
                title: r.title,
                description: r.description,
                similarity: r.similarity,
            })
            .collect())
    }

    async fn count_published_except(&self, exclude_id: Uuid) -> AdventureResult<u64> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT COUNT(*) AS count FROM videos WHERE is_published AND id <> $1",
            [exclude_id.into()],
        );

        let row = CountRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;
        Ok(row.map(|r| r.count.max(0) as u64).unwrap_or(0))
    }

    async fn published_at_offset(
        &self,
        exclude_id: Uuid,
        offset: u64,
    ) -> AdventureResult<Option<PathVideo>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
                SELECT id, title, description FROM videos
                WHERE is_published AND id <> $1
                ORDER BY id
                OFFSET $2 LIMIT 1
            "#,
            [exclude_id.into(), (offset.min(i64::MAX as u64) as i64).into()],
        );

        let row = PathRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(row.map(|r| PathVideo {
            id: r.id,
            title: r.title,
            description: r.description,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_find_embedding_parses_vector_text() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "embedding",
                Value::from("[0.5,-0.25]"),
            )])]])
            .into_connection();

        let embedding = PgAdventureRepository::new(db)
            .find_embedding(Uuid::now_v7())
            .await
            .unwrap();
        assert_eq!(embedding, Some(vec![0.5, -0.25]));
    }

    #[tokio::test]
    async fn test_find_embedding_null_column() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "embedding",
                Value::from(None::<String>),
            )])]])
            .into_connection();

        let embedding = PgAdventureRepository::new(db)
            .find_embedding(Uuid::now_v7())
            .await
            .unwrap();
        assert_eq!(embedding, None);
    }

    #[tokio::test]
    async fn test_store_embedding_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let stored = PgAdventureRepository::new(db)
            .store_embedding(Uuid::now_v7(), &[0.1, 0.2])
            .await
            .unwrap();
        assert!(stored);
    }

    #[tokio::test]
    async fn test_match_videos_maps_rows() {
        let id = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([
                ("id", Value::from(id)),
                ("title", Value::from("Balance drills")),
                ("description", Value::from(None::<String>)),
                ("similarity", Value::from(0.82f64)),
            ])]])
            .into_connection();

        let matches = PgAdventureRepository::new(db)
            .match_videos(&[1.0, 0.0], 0.5, 2, Uuid::now_v7())
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, id);
        assert!((matches[0].similarity - 0.82).abs() < 1e-9);
    }
}
