use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One rating per (submission, judge). Re-rating overwrites in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub judge_id: Uuid,
    pub innovation: i32,
    pub execution: i32,
    pub ux: i32,
    pub feasibility: i32,
    pub total_score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateSubmissionRequest {
    #[validate(range(min = 1, max = 10))]
    pub innovation: i32,
    #[validate(range(min = 1, max = 10))]
    pub execution: i32,
    #[validate(range(min = 1, max = 10))]
    pub ux: i32,
    #[validate(range(min = 1, max = 10))]
    pub feasibility: i32,
}

impl RateSubmissionRequest {
    pub fn total(&self) -> i32 {
        self.innovation + self.execution + self.ux + self.feasibility
    }
}
