use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Team, TeamMember},
    error::{AppError, Result},
    repository::TeamRepository,
};

#[derive(FromRow)]
struct TeamRow {
    id: String,
    hackathon_id: String,
    category_id: Option<String>,
    name: String,
    leader_id: String,
    is_locked: i32,
    is_solo: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct TeamMemberRow {
    team_id: String,
    user_id: String,
    joined_at: NaiveDateTime,
}

const TEAM_COLUMNS: &str =
    "id, hackathon_id, category_id, name, leader_id, is_locked, is_solo, created_at, updated_at";

pub struct SqliteTeamRepository {
    pool: SqlitePool,
}

impl SqliteTeamRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_team(row: TeamRow) -> Result<Team> {
        let category_id = row
            .category_id
            .as_ref()
            .map(|id| Uuid::parse_str(id))
            .transpose()
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Team {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            hackathon_id: Uuid::parse_str(&row.hackathon_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            category_id,
            name: row.name,
            leader_id: Uuid::parse_str(&row.leader_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            is_locked: row.is_locked != 0,
            is_solo: row.is_solo != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_member(row: TeamMemberRow) -> Result<TeamMember> {
        Ok(TeamMember {
            team_id: Uuid::parse_str(&row.team_id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Database(e.to_string()))?,
            joined_at: DateTime::from_naive_utc_and_offset(row.joined_at, Utc),
        })
    }
}

#[async_trait]
impl TeamRepository for SqliteTeamRepository {
    async fn create(&self, team: Team) -> Result<Team> {
        let id_str = team.id.to_string();
        let hackathon_id_str = team.hackathon_id.to_string();
        let category_id_str = team.category_id.map(|id| id.to_string());
        let leader_id_str = team.leader_id.to_string();
        let is_locked_int = if team.is_locked { 1i32 } else { 0i32 };
        let is_solo_int = if team.is_solo { 1i32 } else { 0i32 };
        let now = Utc::now().naive_utc();

        // Team row and leader membership land together or not at all.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO teams (id, hackathon_id, category_id, name, leader_id, is_locked, is_solo, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&hackathon_id_str)
        .bind(&category_id_str)
        .bind(&team.name)
        .bind(&leader_id_str)
        .bind(is_locked_int)
        .bind(is_solo_int)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query("INSERT INTO team_members (team_id, user_id, joined_at) VALUES (?, ?, ?)")
            .bind(&id_str)
            .bind(&leader_id_str)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tx.commit().await?;

        self.find_by_id(team.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created team".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, TeamRow>(&format!(
            "SELECT {} FROM teams WHERE id = ?",
            TEAM_COLUMNS
        ))
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_team(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_name(&self, hackathon_id: Uuid, name: &str) -> Result<Option<Team>> {
        let hackathon_id_str = hackathon_id.to_string();
        let row = sqlx::query_as::<_, TeamRow>(&format!(
            "SELECT {} FROM teams WHERE hackathon_id = ? AND name = ?",
            TEAM_COLUMNS
        ))
        .bind(&hackathon_id_str)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_team(r)?)),
            None => Ok(None),
        }
    }

    async fn list_by_hackathon(&self, hackathon_id: Uuid) -> Result<Vec<Team>> {
        let hackathon_id_str = hackathon_id.to_string();
        let rows = sqlx::query_as::<_, TeamRow>(&format!(
            "SELECT {} FROM teams WHERE hackathon_id = ? ORDER BY created_at ASC",
            TEAM_COLUMNS
        ))
        .bind(&hackathon_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_team).collect()
    }

    async fn find_user_team(&self, hackathon_id: Uuid, user_id: Uuid) -> Result<Option<Team>> {
        let hackathon_id_str = hackathon_id.to_string();
        let user_id_str = user_id.to_string();
        let row = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT t.id, t.hackathon_id, t.category_id, t.name, t.leader_id,
                   t.is_locked, t.is_solo, t.created_at, t.updated_at
            FROM teams t
            INNER JOIN team_members tm ON t.id = tm.team_id
            WHERE t.hackathon_id = ? AND tm.user_id = ?
            "#,
        )
        .bind(&hackathon_id_str)
        .bind(&user_id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_team(r)?)),
            None => Ok(None),
        }
    }

    async fn members(&self, team_id: Uuid) -> Result<Vec<TeamMember>> {
        let team_id_str = team_id.to_string();
        let rows = sqlx::query_as::<_, TeamMemberRow>(
            "SELECT team_id, user_id, joined_at FROM team_members WHERE team_id = ? ORDER BY joined_at ASC",
        )
        .bind(&team_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_member).collect()
    }

    async fn member_count(&self, team_id: Uuid) -> Result<i64> {
        let team_id_str = team_id.to_string();
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM team_members WHERE team_id = ?")
                .bind(&team_id_str)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.0)
    }

    async fn is_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool> {
        let team_id_str = team_id.to_string();
        let user_id_str = user_id.to_string();
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM team_members WHERE team_id = ? AND user_id = ?",
        )
        .bind(&team_id_str)
        .bind(&user_id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.0 > 0)
    }

    async fn add_member(&self, team_id: Uuid, user_id: Uuid) -> Result<()> {
        let team_id_str = team_id.to_string();
        let user_id_str = user_id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, joined_at)
            VALUES (?, ?, ?)
            ON CONFLICT (team_id, user_id) DO NOTHING
            "#,
        )
        .bind(&team_id_str)
        .bind(&user_id_str)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn add_member_capped(&self, team_id: Uuid, user_id: Uuid, cap: i64) -> Result<bool> {
        let team_id_str = team_id.to_string();
        let user_id_str = user_id.to_string();
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, joined_at)
            SELECT ?, ?, ?
            WHERE (SELECT COUNT(*) FROM team_members WHERE team_id = ?) < ?
            ON CONFLICT (team_id, user_id) DO NOTHING
            "#,
        )
        .bind(&team_id_str)
        .bind(&user_id_str)
        .bind(now)
        .bind(&team_id_str)
        .bind(cap)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_member(&self, team_id: Uuid, user_id: Uuid) -> Result<()> {
        let team_id_str = team_id.to_string();
        let user_id_str = user_id.to_string();

        sqlx::query("DELETE FROM team_members WHERE team_id = ? AND user_id = ?")
            .bind(&team_id_str)
            .bind(&user_id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn set_locked(&self, team_id: Uuid, locked: bool) -> Result<Team> {
        let team_id_str = team_id.to_string();
        let locked_int = if locked { 1i32 } else { 0i32 };
        let now = Utc::now().naive_utc();

        sqlx::query("UPDATE teams SET is_locked = ?, updated_at = ? WHERE id = ?")
            .bind(locked_int)
            .bind(now)
            .bind(&team_id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Team not found".to_string()))
    }

    async fn set_leader(&self, team_id: Uuid, leader_id: Uuid) -> Result<Team> {
        let team_id_str = team_id.to_string();
        let leader_id_str = leader_id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query("UPDATE teams SET leader_id = ?, updated_at = ? WHERE id = ?")
            .bind(&leader_id_str)
            .bind(now)
            .bind(&team_id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Team not found".to_string()))
    }

    async fn count_in_category(&self, category_id: Uuid) -> Result<i64> {
        let category_id_str = category_id.to_string();
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM teams WHERE category_id = ?")
            .bind(&category_id_str)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.0)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
