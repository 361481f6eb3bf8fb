use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::HackathonRepository,
};

pub struct HackathonService {
    hackathons: Arc<dyn HackathonRepository>,
}

impl HackathonService {
    pub fn new(hackathons: Arc<dyn HackathonRepository>) -> Self {
        Self { hackathons }
    }

    fn check_window(
        name: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(AppError::Validation(format!(
                    "{} window ends before it starts",
                    name
                )));
            }
        }
        Ok(())
    }

    fn validate_timeline(timeline: &Timeline) -> Result<()> {
        Self::check_window(
            "Team joining",
            timeline.team_joining_start,
            timeline.team_joining_end,
        )?;
        Self::check_window(
            "Submission",
            timeline.submission_start,
            timeline.submission_end,
        )?;
        Self::check_window(
            "Mentor assignment",
            timeline.mentor_assignment_start,
            timeline.mentor_assignment_end,
        )?;
        Self::check_window("Judging", timeline.judging_start, timeline.judging_end)?;
        Ok(())
    }

    pub async fn create(
        &self,
        actor: &User,
        mut request: CreateHackathonRequest,
    ) -> Result<Hackathon> {
        if !policy::allows(actor.role, policy::Capability::ManageHackathons) {
            return Err(AppError::Forbidden(
                "Only organizers can create hackathons".to_string(),
            ));
        }

        let max_team_size = request.max_team_size.ok_or_else(|| {
            AppError::Validation("max_team_size is required".to_string())
        })?;
        if max_team_size < 1 {
            return Err(AppError::Validation(
                "max_team_size must be at least 1".to_string(),
            ));
        }

        if self
            .hackathons
            .find_by_slug(&request.slug)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "A hackathon with this slug already exists".to_string(),
            ));
        }

        Self::validate_timeline(&request.timeline)?;
        request.timeline.normalize();

        let now = Utc::now();
        self.hackathons
            .create(Hackathon {
                id: Uuid::new_v4(),
                title: request.title,
                slug: request.slug,
                description: request.description,
                hackathon_type: request.hackathon_type,
                status: PublishStatus::Draft,
                max_team_size,
                organization_id: request.organization_id,
                created_by: actor.id,
                timeline: request.timeline,
                created_at: now,
                updated_at: now,
            })
            .await
    }

    async fn get_owned(&self, actor: &User, id: Uuid) -> Result<Hackathon> {
        let hackathon = self
            .hackathons
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Hackathon not found".to_string()))?;

        if hackathon.created_by != actor.id && actor.role != Role::Admin {
            return Err(AppError::Forbidden(
                "Only the hackathon owner can do that".to_string(),
            ));
        }

        Ok(hackathon)
    }

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        request: UpdateHackathonRequest,
    ) -> Result<Hackathon> {
        let mut hackathon = self.get_owned(actor, id).await?;

        if let Some(title) = request.title {
            hackathon.title = title;
        }
        if let Some(description) = request.description {
            hackathon.description = description;
        }
        if let Some(hackathon_type) = request.hackathon_type {
            hackathon.hackathon_type = hackathon_type;
        }
        if let Some(max_team_size) = request.max_team_size {
            if max_team_size < 1 {
                return Err(AppError::Validation(
                    "max_team_size must be at least 1".to_string(),
                ));
            }
            hackathon.max_team_size = max_team_size;
        }
        if let Some(timeline) = request.timeline {
            Self::validate_timeline(&timeline)?;
            hackathon.timeline = timeline;
        }

        // Legacy aliases are re-derived on every write so the two
        // representations cannot drift.
        hackathon.timeline.normalize();

        self.hackathons.update(id, hackathon).await
    }

    pub async fn set_status(
        &self,
        actor: &User,
        id: Uuid,
        status: PublishStatus,
    ) -> Result<Hackathon> {
        self.get_owned(actor, id).await?;
        self.hackathons.set_status(id, status).await
    }

    /// Remove a hackathon entirely. A published event must be archived
    /// first so it cannot vanish out from under its participants.
    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<()> {
        let hackathon = self.get_owned(actor, id).await?;
        if hackathon.status == PublishStatus::Published {
            return Err(AppError::Conflict(
                "Archive a published hackathon before deleting it".to_string(),
            ));
        }
        self.hackathons.delete(id).await
    }

    pub async fn add_category(
        &self,
        actor: &User,
        hackathon_id: Uuid,
        request: CreateCategoryRequest,
    ) -> Result<Category> {
        self.get_owned(actor, hackathon_id).await?;

        if request.name.trim().is_empty() {
            return Err(AppError::Validation(
                "Category name is required".to_string(),
            ));
        }
        if let Some(capacity) = request.capacity {
            if capacity < 1 {
                return Err(AppError::Validation(
                    "Category capacity must be at least 1".to_string(),
                ));
            }
        }

        let existing = self.hackathons.list_categories(hackathon_id).await?;
        if existing.iter().any(|c| c.name == request.name) {
            return Err(AppError::Conflict(
                "A category with this name already exists".to_string(),
            ));
        }

        self.hackathons
            .create_category(Category {
                id: Uuid::new_v4(),
                hackathon_id,
                name: request.name,
                capacity: request.capacity,
                created_at: Utc::now(),
            })
            .await
    }
}
