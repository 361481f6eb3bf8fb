use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Category, Hackathon, HackathonType, PublishStatus, Timeline},
    error::{AppError, Result},
    repository::HackathonRepository,
};

#[derive(FromRow)]
struct HackathonRow {
    id: String,
    title: String,
    slug: String,
    description: String,
    hackathon_type: String,
    status: String,
    max_team_size: i32,
    organization_id: Option<String>,
    created_by: String,
    team_joining_start: Option<NaiveDateTime>,
    team_joining_end: Option<NaiveDateTime>,
    submission_start: Option<NaiveDateTime>,
    submission_end: Option<NaiveDateTime>,
    mentor_assignment_start: Option<NaiveDateTime>,
    mentor_assignment_end: Option<NaiveDateTime>,
    judging_start: Option<NaiveDateTime>,
    judging_end: Option<NaiveDateTime>,
    team_deadline: Option<NaiveDateTime>,
    submission_deadline: Option<NaiveDateTime>,
    judging_deadline: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct CategoryRow {
    id: String,
    hackathon_id: String,
    name: String,
    capacity: Option<i32>,
    created_at: NaiveDateTime,
}

const HACKATHON_COLUMNS: &str = "id, title, slug, description, hackathon_type, status, max_team_size, organization_id, created_by, \
     team_joining_start, team_joining_end, submission_start, submission_end, \
     mentor_assignment_start, mentor_assignment_end, judging_start, judging_end, \
     team_deadline, submission_deadline, judging_deadline, created_at, updated_at";

pub struct SqliteHackathonRepository {
    pool: SqlitePool,
}

impl SqliteHackathonRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn utc(dt: Option<NaiveDateTime>) -> Option<DateTime<Utc>> {
        dt.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
    }

    fn row_to_hackathon(row: HackathonRow) -> Result<Hackathon> {
        let organization_id = row
            .organization_id
            .as_ref()
            .map(|id| Uuid::parse_str(id))
            .transpose()
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Hackathon {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            slug: row.slug,
            description: row.description,
            hackathon_type: HackathonType::parse(&row.hackathon_type).ok_or_else(|| {
                AppError::Database(format!("Invalid hackathon type: {}", row.hackathon_type))
            })?,
            status: PublishStatus::parse(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid status: {}", row.status)))?,
            max_team_size: row.max_team_size,
            organization_id,
            created_by: Uuid::parse_str(&row.created_by)
                .map_err(|e| AppError::Database(e.to_string()))?,
            timeline: Timeline {
                team_joining_start: Self::utc(row.team_joining_start),
                team_joining_end: Self::utc(row.team_joining_end),
                submission_start: Self::utc(row.submission_start),
                submission_end: Self::utc(row.submission_end),
                mentor_assignment_start: Self::utc(row.mentor_assignment_start),
                mentor_assignment_end: Self::utc(row.mentor_assignment_end),
                judging_start: Self::utc(row.judging_start),
                judging_end: Self::utc(row.judging_end),
                team_deadline: Self::utc(row.team_deadline),
                submission_deadline: Self::utc(row.submission_deadline),
                judging_deadline: Self::utc(row.judging_deadline),
            },
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_category(row: CategoryRow) -> Result<Category> {
        Ok(Category {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            hackathon_id: Uuid::parse_str(&row.hackathon_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            capacity: row.capacity,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl HackathonRepository for SqliteHackathonRepository {
    async fn create(&self, hackathon: Hackathon) -> Result<Hackathon> {
        let id_str = hackathon.id.to_string();
        let organization_id_str = hackathon.organization_id.map(|id| id.to_string());
        let created_by_str = hackathon.created_by.to_string();
        let t = &hackathon.timeline;
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO hackathons (
                id, title, slug, description, hackathon_type, status, max_team_size,
                organization_id, created_by,
                team_joining_start, team_joining_end, submission_start, submission_end,
                mentor_assignment_start, mentor_assignment_end, judging_start, judging_end,
                team_deadline, submission_deadline, judging_deadline,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&hackathon.title)
        .bind(&hackathon.slug)
        .bind(&hackathon.description)
        .bind(hackathon.hackathon_type.as_str())
        .bind(hackathon.status.as_str())
        .bind(hackathon.max_team_size)
        .bind(&organization_id_str)
        .bind(&created_by_str)
        .bind(t.team_joining_start.map(|dt| dt.naive_utc()))
        .bind(t.team_joining_end.map(|dt| dt.naive_utc()))
        .bind(t.submission_start.map(|dt| dt.naive_utc()))
        .bind(t.submission_end.map(|dt| dt.naive_utc()))
        .bind(t.mentor_assignment_start.map(|dt| dt.naive_utc()))
        .bind(t.mentor_assignment_end.map(|dt| dt.naive_utc()))
        .bind(t.judging_start.map(|dt| dt.naive_utc()))
        .bind(t.judging_end.map(|dt| dt.naive_utc()))
        .bind(t.team_deadline.map(|dt| dt.naive_utc()))
        .bind(t.submission_deadline.map(|dt| dt.naive_utc()))
        .bind(t.judging_deadline.map(|dt| dt.naive_utc()))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(hackathon.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created hackathon".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hackathon>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, HackathonRow>(&format!(
            "SELECT {} FROM hackathons WHERE id = ?",
            HACKATHON_COLUMNS
        ))
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_hackathon(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Hackathon>> {
        let row = sqlx::query_as::<_, HackathonRow>(&format!(
            "SELECT {} FROM hackathons WHERE slug = ?",
            HACKATHON_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_hackathon(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Hackathon>> {
        let rows = sqlx::query_as::<_, HackathonRow>(&format!(
            "SELECT {} FROM hackathons ORDER BY created_at DESC LIMIT ? OFFSET ?",
            HACKATHON_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_hackathon).collect()
    }

    async fn list_published(&self) -> Result<Vec<Hackathon>> {
        let rows = sqlx::query_as::<_, HackathonRow>(&format!(
            "SELECT {} FROM hackathons WHERE status = 'Published' ORDER BY created_at DESC",
            HACKATHON_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_hackathon).collect()
    }

    async fn update(&self, id: Uuid, hackathon: Hackathon) -> Result<Hackathon> {
        let id_str = id.to_string();
        let t = &hackathon.timeline;
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE hackathons
            SET title = ?, description = ?, hackathon_type = ?, max_team_size = ?,
                team_joining_start = ?, team_joining_end = ?,
                submission_start = ?, submission_end = ?,
                mentor_assignment_start = ?, mentor_assignment_end = ?,
                judging_start = ?, judging_end = ?,
                team_deadline = ?, submission_deadline = ?, judging_deadline = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&hackathon.title)
        .bind(&hackathon.description)
        .bind(hackathon.hackathon_type.as_str())
        .bind(hackathon.max_team_size)
        .bind(t.team_joining_start.map(|dt| dt.naive_utc()))
        .bind(t.team_joining_end.map(|dt| dt.naive_utc()))
        .bind(t.submission_start.map(|dt| dt.naive_utc()))
        .bind(t.submission_end.map(|dt| dt.naive_utc()))
        .bind(t.mentor_assignment_start.map(|dt| dt.naive_utc()))
        .bind(t.mentor_assignment_end.map(|dt| dt.naive_utc()))
        .bind(t.judging_start.map(|dt| dt.naive_utc()))
        .bind(t.judging_end.map(|dt| dt.naive_utc()))
        .bind(t.team_deadline.map(|dt| dt.naive_utc()))
        .bind(t.submission_deadline.map(|dt| dt.naive_utc()))
        .bind(t.judging_deadline.map(|dt| dt.naive_utc()))
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated hackathon".to_string()))
    }

    async fn set_status(&self, id: Uuid, status: PublishStatus) -> Result<Hackathon> {
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query("UPDATE hackathons SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now)
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Hackathon not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM hackathons WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn create_category(&self, category: Category) -> Result<Category> {
        let id_str = category.id.to_string();
        let hackathon_id_str = category.hackathon_id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO categories (id, hackathon_id, name, capacity, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&hackathon_id_str)
        .bind(&category.name)
        .bind(category.capacity)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_category(category.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created category".to_string()))
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, hackathon_id, name, capacity, created_at FROM categories WHERE id = ?",
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_category(r)?)),
            None => Ok(None),
        }
    }

    async fn list_categories(&self, hackathon_id: Uuid) -> Result<Vec<Category>> {
        let hackathon_id_str = hackathon_id.to_string();
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, hackathon_id, name, capacity, created_at FROM categories WHERE hackathon_id = ? ORDER BY name ASC",
        )
        .bind(hackathon_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_category).collect()
    }
}
