use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{
        AssignmentRepository, HackathonRepository, RatingAggregate, RatingRepository,
        SubmissionRepository,
    },
};

pub struct RatingService {
    ratings: Arc<dyn RatingRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    hackathons: Arc<dyn HackathonRepository>,
    assignments: Arc<dyn AssignmentRepository>,
}

impl RatingService {
    pub fn new(
        ratings: Arc<dyn RatingRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        hackathons: Arc<dyn HackathonRepository>,
        assignments: Arc<dyn AssignmentRepository>,
    ) -> Self {
        Self {
            ratings,
            submissions,
            hackathons,
            assignments,
        }
    }

    /// Score a submission. Re-rating by the same judge overwrites the
    /// existing row rather than adding a second one.
    pub async fn rate(
        &self,
        actor: &User,
        submission_id: Uuid,
        request: RateSubmissionRequest,
    ) -> Result<Rating> {
        request.validate()?;

        if !policy::allows(actor.role, policy::Capability::RateSubmissions) {
            return Err(AppError::Forbidden(
                "Your role does not permit rating submissions".to_string(),
            ));
        }

        let submission = self
            .submissions
            .find_by_id(submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;
        let hackathon = self
            .hackathons
            .find_by_id(submission.hackathon_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Hackathon not found".to_string()))?;

        let now = Utc::now();

        if !hackathon.is_published() || hackathon.phase(now) != Phase::Judging {
            return Err(AppError::Conflict(
                "Ratings can only be submitted while judging is underway".to_string(),
            ));
        }

        if let Some(close) = hackathon.timeline.judging_close() {
            if now > close {
                return Err(AppError::Timeline(format!(
                    "Judging has ended ({})",
                    close.to_rfc3339()
                )));
            }
        }

        let accepted_judge = self
            .assignments
            .roster_entry(hackathon.id, actor.id, AssignmentRole::Judge)
            .await?
            .map(|entry| entry.status == AssignmentStatus::Accepted)
            .unwrap_or(false);
        if !accepted_judge {
            return Err(AppError::Forbidden(
                "Only accepted judges of this hackathon may rate submissions".to_string(),
            ));
        }

        self.ratings
            .upsert(Rating {
                id: Uuid::new_v4(),
                submission_id,
                judge_id: actor.id,
                innovation: request.innovation,
                execution: request.execution,
                ux: request.ux,
                feasibility: request.feasibility,
                total_score: request.total(),
                created_at: now,
                updated_at: now,
            })
            .await
    }

    pub async fn list_for_submission(
        &self,
        actor: &User,
        submission_id: Uuid,
    ) -> Result<Vec<Rating>> {
        if !policy::allows(actor.role, policy::Capability::ViewAllSubmissions) {
            return Err(AppError::Forbidden(
                "You are not allowed to view ratings".to_string(),
            ));
        }
        self.ratings.list_by_submission(submission_id).await
    }

    pub async fn aggregate(
        &self,
        actor: &User,
        submission_id: Uuid,
    ) -> Result<Option<RatingAggregate>> {
        if !policy::allows(actor.role, policy::Capability::ViewAllSubmissions) {
            return Err(AppError::Forbidden(
                "You are not allowed to view ratings".to_string(),
            ));
        }
        self.ratings.aggregate(submission_id).await
    }
}
