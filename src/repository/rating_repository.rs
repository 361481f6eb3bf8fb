use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::Rating,
    error::{AppError, Result},
    repository::{RatingAggregate, RatingRepository},
};

#[derive(FromRow)]
struct RatingRow {
    id: String,
    submission_id: String,
    judge_id: String,
    innovation: i32,
    execution: i32,
    ux: i32,
    feasibility: i32,
    total_score: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const RATING_COLUMNS: &str = "id, submission_id, judge_id, innovation, execution, ux, feasibility, total_score, created_at, updated_at";

pub struct SqliteRatingRepository {
    pool: SqlitePool,
}

impl SqliteRatingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_rating(row: RatingRow) -> Result<Rating> {
        Ok(Rating {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            submission_id: Uuid::parse_str(&row.submission_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            judge_id: Uuid::parse_str(&row.judge_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            innovation: row.innovation,
            execution: row.execution,
            ux: row.ux,
            feasibility: row.feasibility,
            total_score: row.total_score,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl RatingRepository for SqliteRatingRepository {
    async fn upsert(&self, rating: Rating) -> Result<Rating> {
        let id_str = rating.id.to_string();
        let submission_id_str = rating.submission_id.to_string();
        let judge_id_str = rating.judge_id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO ratings (id, submission_id, judge_id, innovation, execution, ux, feasibility, total_score, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (submission_id, judge_id)
            DO UPDATE SET innovation = excluded.innovation,
                          execution = excluded.execution,
                          ux = excluded.ux,
                          feasibility = excluded.feasibility,
                          total_score = excluded.total_score,
                          updated_at = excluded.updated_at
            "#,
        )
        .bind(&id_str)
        .bind(&submission_id_str)
        .bind(&judge_id_str)
        .bind(rating.innovation)
        .bind(rating.execution)
        .bind(rating.ux)
        .bind(rating.feasibility)
        .bind(rating.total_score)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find(rating.submission_id, rating.judge_id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve rating".to_string()))
    }

    async fn find(&self, submission_id: Uuid, judge_id: Uuid) -> Result<Option<Rating>> {
        let submission_id_str = submission_id.to_string();
        let judge_id_str = judge_id.to_string();
        let row = sqlx::query_as::<_, RatingRow>(&format!(
            "SELECT {} FROM ratings WHERE submission_id = ? AND judge_id = ?",
            RATING_COLUMNS
        ))
        .bind(&submission_id_str)
        .bind(&judge_id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_rating(r)?)),
            None => Ok(None),
        }
    }

    async fn list_by_submission(&self, submission_id: Uuid) -> Result<Vec<Rating>> {
        let submission_id_str = submission_id.to_string();
        let rows = sqlx::query_as::<_, RatingRow>(&format!(
            "SELECT {} FROM ratings WHERE submission_id = ? ORDER BY created_at ASC",
            RATING_COLUMNS
        ))
        .bind(&submission_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_rating).collect()
    }

    async fn aggregate(&self, submission_id: Uuid) -> Result<Option<RatingAggregate>> {
        let submission_id_str = submission_id.to_string();
        let row: (i64, Option<f64>) = sqlx::query_as(
            "SELECT COUNT(*), AVG(total_score) FROM ratings WHERE submission_id = ?",
        )
        .bind(&submission_id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            (0, _) | (_, None) => Ok(None),
            (count, Some(average)) => Ok(Some(RatingAggregate {
                submission_id,
                rating_count: count,
                average_total: average,
            })),
        }
    }
}
