use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Assignment, AssignmentRole, AssignmentStatus, RosterEntry},
    error::{AppError, Result},
    repository::AssignmentRepository,
};

#[derive(FromRow)]
struct AssignmentRow {
    id: String,
    team_id: String,
    hackathon_id: String,
    user_id: String,
    role: String,
    status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct RosterRow {
    hackathon_id: String,
    user_id: String,
    role: String,
    status: String,
    updated_at: NaiveDateTime,
}

const ASSIGNMENT_COLUMNS: &str =
    "id, team_id, hackathon_id, user_id, role, status, created_at, updated_at";

pub struct SqliteAssignmentRepository {
    pool: SqlitePool,
}

impl SqliteAssignmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_assignment(row: AssignmentRow) -> Result<Assignment> {
        Ok(Assignment {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            team_id: Uuid::parse_str(&row.team_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            hackathon_id: Uuid::parse_str(&row.hackathon_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            role: AssignmentRole::parse(&row.role)
                .ok_or_else(|| AppError::Database(format!("Invalid assignment role: {}", row.role)))?,
            status: AssignmentStatus::parse(&row.status).ok_or_else(|| {
                AppError::Database(format!("Invalid assignment status: {}", row.status))
            })?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_roster_entry(row: RosterRow) -> Result<RosterEntry> {
        Ok(RosterEntry {
            hackathon_id: Uuid::parse_str(&row.hackathon_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            role: AssignmentRole::parse(&row.role)
                .ok_or_else(|| AppError::Database(format!("Invalid roster role: {}", row.role)))?,
            status: AssignmentStatus::parse(&row.status).ok_or_else(|| {
                AppError::Database(format!("Invalid roster status: {}", row.status))
            })?,
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl AssignmentRepository for SqliteAssignmentRepository {
    async fn create(&self, assignment: Assignment) -> Result<Assignment> {
        let id_str = assignment.id.to_string();
        let team_id_str = assignment.team_id.to_string();
        let hackathon_id_str = assignment.hackathon_id.to_string();
        let user_id_str = assignment.user_id.to_string();
        let now = Utc::now().naive_utc();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO team_assignments (id, team_id, hackathon_id, user_id, role, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&team_id_str)
        .bind(&hackathon_id_str)
        .bind(&user_id_str)
        .bind(assignment.role.as_str())
        .bind(assignment.status.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        // Seed a pending roster entry unless the user already holds one for
        // this role; an existing Accepted entry must not be downgraded.
        sqlx::query(
            r#"
            INSERT INTO hackathon_roster (hackathon_id, user_id, role, status, updated_at)
            VALUES (?, ?, ?, 'Pending', ?)
            ON CONFLICT (hackathon_id, user_id, role) DO NOTHING
            "#,
        )
        .bind(&hackathon_id_str)
        .bind(&user_id_str)
        .bind(assignment.role.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        tx.commit().await?;

        self.find_by_id(assignment.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created assignment".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Assignment>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {} FROM team_assignments WHERE id = ?",
            ASSIGNMENT_COLUMNS
        ))
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_assignment(r)?)),
            None => Ok(None),
        }
    }

    async fn find(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        role: AssignmentRole,
    ) -> Result<Option<Assignment>> {
        let team_id_str = team_id.to_string();
        let user_id_str = user_id.to_string();
        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {} FROM team_assignments WHERE team_id = ? AND user_id = ? AND role = ?",
            ASSIGNMENT_COLUMNS
        ))
        .bind(&team_id_str)
        .bind(&user_id_str)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_assignment(r)?)),
            None => Ok(None),
        }
    }

    async fn list_by_team(&self, team_id: Uuid) -> Result<Vec<Assignment>> {
        let team_id_str = team_id.to_string();
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {} FROM team_assignments WHERE team_id = ? ORDER BY created_at ASC",
            ASSIGNMENT_COLUMNS
        ))
        .bind(&team_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_assignment).collect()
    }

    async fn list_by_user(&self, hackathon_id: Uuid, user_id: Uuid) -> Result<Vec<Assignment>> {
        let hackathon_id_str = hackathon_id.to_string();
        let user_id_str = user_id.to_string();
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {} FROM team_assignments WHERE hackathon_id = ? AND user_id = ? ORDER BY created_at ASC",
            ASSIGNMENT_COLUMNS
        ))
        .bind(&hackathon_id_str)
        .bind(&user_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_assignment).collect()
    }

    async fn accept(&self, id: Uuid) -> Result<Assignment> {
        let assignment = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?;

        let id_str = id.to_string();
        let hackathon_id_str = assignment.hackathon_id.to_string();
        let user_id_str = assignment.user_id.to_string();
        let now = Utc::now().naive_utc();

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE team_assignments SET status = 'Accepted', updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO hackathon_roster (hackathon_id, user_id, role, status, updated_at)
            VALUES (?, ?, ?, 'Accepted', ?)
            ON CONFLICT (hackathon_id, user_id, role)
            DO UPDATE SET status = 'Accepted', updated_at = excluded.updated_at
            "#,
        )
        .bind(&hackathon_id_str)
        .bind(&user_id_str)
        .bind(assignment.role.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated assignment".to_string()))
    }

    async fn reject(&self, id: Uuid) -> Result<Assignment> {
        let assignment = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?;

        let id_str = id.to_string();
        let hackathon_id_str = assignment.hackathon_id.to_string();
        let user_id_str = assignment.user_id.to_string();
        let now = Utc::now().naive_utc();

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE team_assignments SET status = 'Rejected', updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // The roster entry survives as Accepted while any other accepted
        // assignment remains in this hackathon; rejecting one team must not
        // revoke access still held via another.
        let remaining: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM team_assignments
            WHERE hackathon_id = ? AND user_id = ? AND role = ? AND status = 'Accepted' AND id != ?
            "#,
        )
        .bind(&hackathon_id_str)
        .bind(&user_id_str)
        .bind(assignment.role.as_str())
        .bind(&id_str)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if remaining.0 == 0 {
            sqlx::query(
                r#"
                UPDATE hackathon_roster SET status = 'Rejected', updated_at = ?
                WHERE hackathon_id = ? AND user_id = ? AND role = ?
                "#,
            )
            .bind(now)
            .bind(&hackathon_id_str)
            .bind(&user_id_str)
            .bind(assignment.role.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        }

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated assignment".to_string()))
    }

    async fn roster_entry(
        &self,
        hackathon_id: Uuid,
        user_id: Uuid,
        role: AssignmentRole,
    ) -> Result<Option<RosterEntry>> {
        let hackathon_id_str = hackathon_id.to_string();
        let user_id_str = user_id.to_string();
        let row = sqlx::query_as::<_, RosterRow>(
            r#"
            SELECT hackathon_id, user_id, role, status, updated_at
            FROM hackathon_roster
            WHERE hackathon_id = ? AND user_id = ? AND role = ?
            "#,
        )
        .bind(&hackathon_id_str)
        .bind(&user_id_str)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_roster_entry(r)?)),
            None => Ok(None),
        }
    }

    async fn roster(&self, hackathon_id: Uuid, role: AssignmentRole) -> Result<Vec<RosterEntry>> {
        let hackathon_id_str = hackathon_id.to_string();
        let rows = sqlx::query_as::<_, RosterRow>(
            r#"
            SELECT hackathon_id, user_id, role, status, updated_at
            FROM hackathon_roster
            WHERE hackathon_id = ? AND role = ?
            ORDER BY updated_at DESC
            "#,
        )
        .bind(&hackathon_id_str)
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_roster_entry).collect()
    }

    async fn is_staff(&self, hackathon_id: Uuid, user_id: Uuid) -> Result<bool> {
        let hackathon_id_str = hackathon_id.to_string();
        let user_id_str = user_id.to_string();
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM hackathon_roster WHERE hackathon_id = ? AND user_id = ?",
        )
        .bind(&hackathon_id_str)
        .bind(&user_id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.0 > 0)
    }
}
