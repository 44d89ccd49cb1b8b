use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{chapters, profiles, sections, videos, watch_history},
    error::{CurriculumError, CurriculumResult},
    models::{Chapter, ContentCounts, Profile, SavedProgress, Section, Video, WatchProgress},
    repository::CurriculumRepository,
};

pub struct PgCurriculumRepository {
    db: DatabaseConnection,
}

impl PgCurriculumRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_error(e: DbErr) -> CurriculumError {
    CurriculumError::Internal(format!("Database error: {}", e))
}

#[derive(Debug, FromQueryResult)]
struct AccessRow {
    has_access: Option<bool>,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct SavedProgressRow {
    user_id: Uuid,
    video_id: Uuid,
    progress_seconds: i32,
    completed: bool,
    updated_at: DateTimeWithTimeZone,
    newly_completed: bool,
}

impl From<SavedProgressRow> for SavedProgress {
    fn from(row: SavedProgressRow) -> Self {
        Self {
            progress: WatchProgress {
                user_id: row.user_id,
                video_id: row.video_id,
                progress_seconds: row.progress_seconds,
                completed: row.completed,
                updated_at: row.updated_at.into(),
            },
            newly_completed: row.newly_completed,
        }
    }
}

#[async_trait]
impl CurriculumRepository for PgCurriculumRepository {
    async fn list_sections(&self) -> CurriculumResult<Vec<Section>> {
        let models = sections::Entity::find()
            .order_by_asc(sections::Column::OrderIndex)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_chapters(&self) -> CurriculumResult<Vec<Chapter>> {
        let models = chapters::Entity::find()
            .order_by_asc(chapters::Column::OrderIndex)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_videos(&self) -> CurriculumResult<Vec<Video>> {
        let models = videos::Entity::find()
            .order_by_asc(videos::Column::OrderIndex)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn completed_video_ids(&self, user_id: Uuid) -> CurriculumResult<Vec<Uuid>> {
        watch_history::Entity::find()
            .select_only()
            .column(watch_history::Column::VideoId)
            .filter(watch_history::Column::UserId.eq(user_id))
            .filter(watch_history::Column::Completed.eq(true))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
            .map_err(db_error)
    }

    async fn find_opener(&self) -> CurriculumResult<Option<Video>> {
        let model = videos::Entity::find()
            .filter(videos::Column::IsOpener.eq(true))
            .filter(videos::Column::IsPublished.eq(true))
            .order_by_asc(videos::Column::OrderIndex)
            .one(&self.db)
            .await
            .map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn find_video(&self, id: Uuid) -> CurriculumResult<Option<Video>> {
        let model = videos::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn check_resource_access(&self, user_id: Uuid, video_id: Uuid) -> CurriculumResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT check_resource_access($1, $2) AS has_access",
            [user_id.into(), video_id.into()],
        );

        let row = AccessRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(row.and_then(|r| r.has_access).unwrap_or(false))
    }

    async fn upsert_progress(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        progress_seconds: i32,
        completed: bool,
    ) -> CurriculumResult<SavedProgress> {
        let txn = self.db.begin().await.map_err(db_error)?;

        // Make sure a row exists so the next statement always has one to lock
        let seed = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO watch_history (user_id, video_id, progress_seconds, completed, updated_at)
            VALUES ($1, $2, 0, false, now())
            ON CONFLICT (user_id, video_id) DO NOTHING
            "#,
            [user_id.into(), video_id.into()],
        );
        txn.execute_raw(seed).await.map_err(db_error)?;

        // `previous` holds the row lock, so concurrent writers see each
        // other's completion. Completion is OR-ed so a rewind never clears it.
        let update = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            WITH previous AS (
                SELECT completed FROM watch_history
                WHERE user_id = $1 AND video_id = $2
                FOR UPDATE
            )
            UPDATE watch_history SET
                progress_seconds = $3,
                completed = previous.completed OR $4,
                updated_at = now()
            FROM previous
            WHERE watch_history.user_id = $1 AND watch_history.video_id = $2
            RETURNING
                watch_history.user_id,
                watch_history.video_id,
                watch_history.progress_seconds,
                watch_history.completed,
                watch_history.updated_at,
                watch_history.completed AND NOT previous.completed AS newly_completed
            "#,
            [
                user_id.into(),
                video_id.into(),
                progress_seconds.into(),
                completed.into(),
            ],
        );
        let row = SavedProgressRow::find_by_statement(update)
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or_else(|| CurriculumError::Internal("Failed to upsert watch history".to_string()))?;

        txn.commit().await.map_err(db_error)?;
        Ok(row.into())
    }

    async fn find_profile(&self, user_id: Uuid) -> CurriculumResult<Option<Profile>> {
        let model = profiles::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn set_paid(&self, user_id: Uuid, is_paid: bool) -> CurriculumResult<bool> {
        let result = profiles::Entity::update_many()
            .col_expr(profiles::Column::IsPaid, Expr::value(is_paid))
            .filter(profiles::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        tracing::info!(%user_id, is_paid, rows = result.rows_affected, "Updated paid flag");
        Ok(result.rows_affected > 0)
    }

    async fn content_counts(&self) -> CurriculumResult<ContentCounts> {
        let users = profiles::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_error)?;
        let videos = videos::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_error)?;

        let stmt = Statement::from_string(
            DbBackend::Postgres,
            "SELECT COUNT(*) AS count FROM videos WHERE embedding IS NULL",
        );
        let pending = CountRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .map(|r| r.count.max(0) as u64)
            .unwrap_or(0);

        Ok(ContentCounts {
            users,
            videos,
            pending_embeddings: pending,
        })
    }
}
