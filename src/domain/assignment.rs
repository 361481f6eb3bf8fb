use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A mentor's or judge's relationship to one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub team_id: Uuid,
    pub hackathon_id: Uuid,
    pub user_id: Uuid,
    pub role: AssignmentRole,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssignmentRole {
    Mentor,
    Judge,
}

impl AssignmentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentRole::Mentor => "Mentor",
            AssignmentRole::Judge => "Judge",
        }
    }

    pub fn parse(s: &str) -> Option<AssignmentRole> {
        match s {
            "Mentor" => Some(AssignmentRole::Mentor),
            "Judge" => Some(AssignmentRole::Judge),
            _ => None,
        }
    }
}

/// Tri-state accept/reject machine. `Pending` is the only state with
/// outgoing transitions; `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Rejected,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "Pending",
            AssignmentStatus::Accepted => "Accepted",
            AssignmentStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Option<AssignmentStatus> {
        match s {
            "Pending" => Some(AssignmentStatus::Pending),
            "Accepted" => Some(AssignmentStatus::Accepted),
            "Rejected" => Some(AssignmentStatus::Rejected),
            _ => None,
        }
    }
}

/// Hackathon-level mirror of a user's best assignment status anywhere in
/// the event, so roster membership never requires scanning every team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub hackathon_id: Uuid,
    pub user_id: Uuid,
    pub role: AssignmentRole,
    pub status: AssignmentStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignRequest {
    pub user_id: Uuid,
    pub role: AssignmentRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespondRequest {
    pub response: AssignmentResponse,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentResponse {
    Accept,
    Reject,
}
