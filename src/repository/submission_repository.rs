use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::Submission,
    error::{AppError, Result},
    repository::SubmissionRepository,
};

#[derive(FromRow)]
struct SubmissionRow {
    id: String,
    team_id: String,
    hackathon_id: String,
    github_url: Option<String>,
    video_url: Option<String>,
    live_url: Option<String>,
    readme_path: Option<String>,
    ppt_path: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const SUBMISSION_COLUMNS: &str = "id, team_id, hackathon_id, github_url, video_url, live_url, readme_path, ppt_path, created_at, updated_at";

pub struct SqliteSubmissionRepository {
    pool: SqlitePool,
}

impl SqliteSubmissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_submission(row: SubmissionRow) -> Result<Submission> {
        Ok(Submission {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            team_id: Uuid::parse_str(&row.team_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            hackathon_id: Uuid::parse_str(&row.hackathon_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            github_url: row.github_url,
            video_url: row.video_url,
            live_url: row.live_url,
            readme_path: row.readme_path,
            ppt_path: row.ppt_path,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl SubmissionRepository for SqliteSubmissionRepository {
    async fn create(&self, submission: Submission) -> Result<Submission> {
        let id_str = submission.id.to_string();
        let team_id_str = submission.team_id.to_string();
        let hackathon_id_str = submission.hackathon_id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO submissions (
                id, team_id, hackathon_id, github_url, video_url, live_url,
                readme_path, ppt_path, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&team_id_str)
        .bind(&hackathon_id_str)
        .bind(&submission.github_url)
        .bind(&submission.video_url)
        .bind(&submission.live_url)
        .bind(&submission.readme_path)
        .bind(&submission.ppt_path)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(submission.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created submission".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {} FROM submissions WHERE id = ?",
            SUBMISSION_COLUMNS
        ))
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_submission(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_team(&self, team_id: Uuid) -> Result<Option<Submission>> {
        let team_id_str = team_id.to_string();
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {} FROM submissions WHERE team_id = ?",
            SUBMISSION_COLUMNS
        ))
        .bind(&team_id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_submission(r)?)),
            None => Ok(None),
        }
    }

    async fn list_by_hackathon(&self, hackathon_id: Uuid) -> Result<Vec<Submission>> {
        let hackathon_id_str = hackathon_id.to_string();
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {} FROM submissions WHERE hackathon_id = ? ORDER BY created_at ASC",
            SUBMISSION_COLUMNS
        ))
        .bind(&hackathon_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_submission).collect()
    }

    async fn update(&self, id: Uuid, submission: Submission) -> Result<Submission> {
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE submissions
            SET github_url = ?, video_url = ?, live_url = ?, readme_path = ?, ppt_path = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&submission.github_url)
        .bind(&submission.video_url)
        .bind(&submission.live_url)
        .bind(&submission.readme_path)
        .bind(&submission.ppt_path)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated submission".to_string()))
    }
}
