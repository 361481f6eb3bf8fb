use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{AssignmentRepository, HackathonRepository, TeamRepository, UserRepository},
};

pub struct AssignmentService {
    assignments: Arc<dyn AssignmentRepository>,
    teams: Arc<dyn TeamRepository>,
    hackathons: Arc<dyn HackathonRepository>,
    users: Arc<dyn UserRepository>,
}

impl AssignmentService {
    pub fn new(
        assignments: Arc<dyn AssignmentRepository>,
        teams: Arc<dyn TeamRepository>,
        hackathons: Arc<dyn HackathonRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            assignments,
            teams,
            hackathons,
            users,
        }
    }

    /// Stage a mentor or judge on a team, pending their acceptance.
    ///
    /// Mentors can be staged any time before judging starts. Judges may only
    /// be assigned once submissions have closed. The timeline checks come
    /// first and do not care who is asking; even an admin is turned away
    /// while submissions are open, since judges are never pre-staged.
    pub async fn assign(
        &self,
        actor: &User,
        team_id: Uuid,
        request: AssignRequest,
    ) -> Result<Assignment> {
        let team = self
            .teams
            .find_by_id(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Team not found".to_string()))?;
        let hackathon = self
            .hackathons
            .find_by_id(team.hackathon_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Hackathon not found".to_string()))?;

        if request.role == AssignmentRole::Mentor {
            hackathon
                .timeline
                .mentor_access(Utc::now())
                .require_open("Mentor assignment")?;
        }

        if request.role == AssignmentRole::Judge {
            match hackathon.timeline.submission_close() {
                Some(close) if Utc::now() >= close => {}
                Some(close) => {
                    return Err(AppError::Timeline(format!(
                        "Judges cannot be assigned before submissions close ({})",
                        close.to_rfc3339()
                    )))
                }
                None => {
                    return Err(AppError::Timeline(
                        "Judges cannot be assigned before a submission deadline is configured"
                            .to_string(),
                    ))
                }
            }
        }

        let capability = match request.role {
            AssignmentRole::Mentor => policy::Capability::AssignMentors,
            AssignmentRole::Judge => policy::Capability::AssignJudges,
        };
        if !policy::allows(actor.role, capability) {
            return Err(AppError::Forbidden(
                "You are not allowed to assign to teams".to_string(),
            ));
        }

        let assignee = self
            .users
            .find_by_id(request.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if self
            .assignments
            .find(team_id, assignee.id, request.role)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "This user is already assigned to the team".to_string(),
            ));
        }

        let now = Utc::now();
        self.assignments
            .create(Assignment {
                id: Uuid::new_v4(),
                team_id,
                hackathon_id: team.hackathon_id,
                user_id: assignee.id,
                role: request.role,
                status: AssignmentStatus::Pending,
                created_at: now,
                updated_at: now,
            })
            .await
    }

    /// Accept or reject a pending assignment. Only the assignee may respond,
    /// and only once; accepted and rejected are terminal.
    pub async fn respond(
        &self,
        actor: &User,
        assignment_id: Uuid,
        response: AssignmentResponse,
    ) -> Result<Assignment> {
        let assignment = self
            .assignments
            .find_by_id(assignment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?;

        if assignment.user_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the assignee can respond to an assignment".to_string(),
            ));
        }

        if assignment.status != AssignmentStatus::Pending {
            return Err(AppError::Conflict(format!(
                "This assignment was already {}",
                assignment.status.as_str().to_lowercase()
            )));
        }

        match response {
            AssignmentResponse::Accept => self.assignments.accept(assignment_id).await,
            AssignmentResponse::Reject => self.assignments.reject(assignment_id).await,
        }
    }

    pub async fn list_for_team(&self, team_id: Uuid) -> Result<Vec<Assignment>> {
        self.assignments.list_by_team(team_id).await
    }

    /// Assignments addressed to the caller within one hackathon, so a
    /// mentor or judge can see what is awaiting their response.
    pub async fn list_for_user(
        &self,
        actor: &User,
        hackathon_id: Uuid,
    ) -> Result<Vec<Assignment>> {
        self.assignments.list_by_user(hackathon_id, actor.id).await
    }

    pub async fn roster(
        &self,
        hackathon_id: Uuid,
        role: AssignmentRole,
    ) -> Result<Vec<RosterEntry>> {
        self.assignments.roster(hackathon_id, role).await
    }
}
