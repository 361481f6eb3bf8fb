use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub hackathon_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub leader_id: Uuid,
    /// Frozen membership: join/leave/kick are rejected while set.
    pub is_locked: bool,
    /// Solo teams have the leader as sole member and skip size checks.
    pub is_solo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamRequest {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub is_solo: bool,
}
