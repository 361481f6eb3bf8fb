use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::{Validate, ValidateUrl};

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{HackathonRepository, SubmissionRepository, TeamRepository},
};

pub struct SubmissionService {
    submissions: Arc<dyn SubmissionRepository>,
    teams: Arc<dyn TeamRepository>,
    hackathons: Arc<dyn HackathonRepository>,
}

impl SubmissionService {
    pub fn new(
        submissions: Arc<dyn SubmissionRepository>,
        teams: Arc<dyn TeamRepository>,
        hackathons: Arc<dyn HackathonRepository>,
    ) -> Self {
        Self {
            submissions,
            teams,
            hackathons,
        }
    }

    async fn get_team(&self, id: Uuid) -> Result<Team> {
        self.teams
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Team not found".to_string()))
    }

    async fn get_hackathon(&self, id: Uuid) -> Result<Hackathon> {
        self.hackathons
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Hackathon not found".to_string()))
    }

    fn check_attachment(attachment: &AttachmentRef) -> Result<()> {
        if attachment.size_bytes > MAX_ATTACHMENT_BYTES {
            return Err(AppError::Validation(
                "Attachment exceeds the 10MB limit".to_string(),
            ));
        }
        let ext = attachment
            .extension()
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_ATTACHMENT_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AppError::Validation(format!(
                "Attachment type '.{}' is not allowed",
                ext
            )));
        }
        Ok(())
    }

    // Same rule the create-path DTO enforces through its derive.
    fn check_url(url: &str) -> Result<()> {
        if url.validate_url() {
            Ok(())
        } else {
            Err(AppError::Validation(format!("Invalid URL: {}", url)))
        }
    }

    pub async fn create(
        &self,
        actor: &User,
        team_id: Uuid,
        request: CreateSubmissionRequest,
    ) -> Result<Submission> {
        request.validate()?;

        let team = self.get_team(team_id).await?;
        let hackathon = self.get_hackathon(team.hackathon_id).await?;

        if team.leader_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the team leader can submit".to_string(),
            ));
        }

        hackathon
            .timeline
            .submission(Utc::now())
            .require_open("Submission")?;

        if self.submissions.find_by_team(team_id).await?.is_some() {
            return Err(AppError::Conflict(
                "This team already has a submission; update it instead".to_string(),
            ));
        }

        if let Some(readme) = &request.readme {
            Self::check_attachment(readme)?;
        }
        if let Some(ppt) = &request.ppt {
            Self::check_attachment(ppt)?;
        }

        let now = Utc::now();
        self.submissions
            .create(Submission {
                id: Uuid::new_v4(),
                team_id,
                hackathon_id: team.hackathon_id,
                github_url: Some(request.github_url),
                video_url: Some(request.video_url),
                live_url: request.live_url,
                readme_path: request.readme.map(|a| a.path),
                ppt_path: request.ppt.map(|a| a.path),
                created_at: now,
                updated_at: now,
            })
            .await
    }

    pub async fn update(
        &self,
        actor: &User,
        team_id: Uuid,
        request: UpdateSubmissionRequest,
    ) -> Result<Submission> {
        let team = self.get_team(team_id).await?;
        let hackathon = self.get_hackathon(team.hackathon_id).await?;

        if team.leader_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the team leader can update the submission".to_string(),
            ));
        }

        hackathon
            .timeline
            .submission(Utc::now())
            .require_open("Submission")?;

        let mut submission = self
            .submissions
            .find_by_team(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        if let Some(github_url) = request.github_url {
            if let Some(url) = &github_url {
                Self::check_url(url)?;
            }
            submission.github_url = github_url;
        }
        if let Some(video_url) = request.video_url {
            if let Some(url) = &video_url {
                Self::check_url(url)?;
            }
            submission.video_url = video_url;
        }
        if let Some(live_url) = request.live_url {
            if let Some(url) = &live_url {
                Self::check_url(url)?;
            }
            submission.live_url = live_url;
        }
        if let Some(readme) = request.readme {
            if let Some(attachment) = &readme {
                Self::check_attachment(attachment)?;
            }
            submission.readme_path = readme.map(|a| a.path);
        }
        if let Some(ppt) = request.ppt {
            if let Some(attachment) = &ppt {
                Self::check_attachment(attachment)?;
            }
            submission.ppt_path = ppt.map(|a| a.path);
        }

        if !submission.has_content_reference() {
            return Err(AppError::Conflict(
                "A submission must retain at least one content reference".to_string(),
            ));
        }

        self.submissions.update(submission.id, submission).await
    }

    /// Role-dependent visibility fan-out. Organizer/admin/judges always see
    /// everything; team members see their own pre-deadline and all of them
    /// once submissions close or the event finishes; mentors and sponsors
    /// only see submissions while judging is underway.
    pub async fn list_for_hackathon(
        &self,
        actor: &User,
        hackathon_id: Uuid,
    ) -> Result<Vec<Submission>> {
        let hackathon = self.get_hackathon(hackathon_id).await?;
        let now = Utc::now();

        if policy::allows(actor.role, policy::Capability::ViewAllSubmissions)
            || hackathon.created_by == actor.id
        {
            return self.submissions.list_by_hackathon(hackathon_id).await;
        }

        match actor.role {
            Role::Mentor | Role::Sponsor => {
                if hackathon.phase(now) == Phase::Judging {
                    self.submissions.list_by_hackathon(hackathon_id).await
                } else {
                    Err(AppError::Forbidden(
                        "Submissions are only visible during judging".to_string(),
                    ))
                }
            }
            _ => {
                let closed = hackathon
                    .timeline
                    .submission_close()
                    .map(|close| now > close)
                    .unwrap_or(false);
                if closed || hackathon.phase(now) == Phase::Finished {
                    return self.submissions.list_by_hackathon(hackathon_id).await;
                }
                // Before the deadline a participant sees only their own
                // team's submission.
                match self.teams.find_user_team(hackathon_id, actor.id).await? {
                    Some(team) => Ok(self
                        .submissions
                        .find_by_team(team.id)
                        .await?
                        .into_iter()
                        .collect()),
                    None => Ok(vec![]),
                }
            }
        }
    }

    pub async fn get(&self, actor: &User, submission_id: Uuid) -> Result<Submission> {
        let submission = self
            .submissions
            .find_by_id(submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        let visible = self
            .list_for_hackathon(actor, submission.hackathon_id)
            .await?;
        if visible.iter().any(|s| s.id == submission.id) {
            Ok(submission)
        } else {
            Err(AppError::Forbidden(
                "You cannot view this submission yet".to_string(),
            ))
        }
    }
}
