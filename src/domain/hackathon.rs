use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timeline::{Phase, Timeline};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hackathon {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub hackathon_type: HackathonType,
    pub status: PublishStatus,
    pub max_team_size: i32,
    pub organization_id: Option<Uuid>,
    pub created_by: Uuid,
    #[serde(flatten)]
    pub timeline: Timeline,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hackathon {
    /// The lifecycle phase is derived from the timeline, never stored.
    pub fn phase(&self, now: DateTime<Utc>) -> Phase {
        self.timeline.phase(now)
    }

    pub fn is_published(&self) -> bool {
        matches!(self.status, PublishStatus::Published)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum HackathonType {
    Online,
    InPerson,
    Hybrid,
}

impl HackathonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HackathonType::Online => "Online",
            HackathonType::InPerson => "InPerson",
            HackathonType::Hybrid => "Hybrid",
        }
    }

    pub fn parse(s: &str) -> Option<HackathonType> {
        match s {
            "Online" => Some(HackathonType::Online),
            "InPerson" => Some(HackathonType::InPerson),
            "Hybrid" => Some(HackathonType::Hybrid),
            _ => None,
        }
    }
}

/// Organizer-controlled publish flag. What phase the event is in is a
/// separate, derived question answered by [`Timeline::phase`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum PublishStatus {
    Draft,
    Published,
    Archived,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Draft => "Draft",
            PublishStatus::Published => "Published",
            PublishStatus::Archived => "Archived",
        }
    }

    pub fn parse(s: &str) -> Option<PublishStatus> {
        match s {
            "Draft" => Some(PublishStatus::Draft),
            "Published" => Some(PublishStatus::Published),
            "Archived" => Some(PublishStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateHackathonRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub hackathon_type: HackathonType,
    /// Filled from the configured default when omitted.
    pub max_team_size: Option<i32>,
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub timeline: Timeline,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateHackathonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub hackathon_type: Option<HackathonType>,
    pub max_team_size: Option<i32>,
    pub timeline: Option<Timeline>,
}

/// Per-hackathon track a team may register under, with an optional cap on
/// how many teams it can hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub hackathon_id: Uuid,
    pub name: String,
    pub capacity: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub capacity: Option<i32>,
}
