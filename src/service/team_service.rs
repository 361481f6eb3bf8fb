use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{AssignmentRepository, HackathonRepository, TeamRepository},
};

pub struct TeamService {
    teams: Arc<dyn TeamRepository>,
    hackathons: Arc<dyn HackathonRepository>,
    assignments: Arc<dyn AssignmentRepository>,
}

impl TeamService {
    pub fn new(
        teams: Arc<dyn TeamRepository>,
        hackathons: Arc<dyn HackathonRepository>,
        assignments: Arc<dyn AssignmentRepository>,
    ) -> Self {
        Self {
            teams,
            hackathons,
            assignments,
        }
    }

    async fn get_hackathon(&self, id: Uuid) -> Result<Hackathon> {
        self.hackathons
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Hackathon not found".to_string()))
    }

    async fn get_team(&self, id: Uuid) -> Result<Team> {
        self.teams
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Team not found".to_string()))
    }

    pub async fn create_team(
        &self,
        actor: &User,
        hackathon_id: Uuid,
        request: CreateTeamRequest,
    ) -> Result<Team> {
        let hackathon = self.get_hackathon(hackathon_id).await?;

        hackathon
            .timeline
            .team_joining(Utc::now())
            .require_open("Team joining")?;

        if matches!(actor.role, Role::Judge | Role::Mentor)
            || self.assignments.is_staff(hackathon_id, actor.id).await?
        {
            return Err(AppError::Forbidden(
                "Judges and mentors cannot form teams".to_string(),
            ));
        }

        if self
            .teams
            .find_user_team(hackathon_id, actor.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "You already belong to a team in this hackathon".to_string(),
            ));
        }

        let categories = self.hackathons.list_categories(hackathon_id).await?;

        let (name, category_id) = if request.is_solo {
            // Solo teams skip the name/category requirements and take the
            // leader's name.
            (format!("{} (solo)", actor.full_name), None)
        } else {
            let name = request
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| AppError::Validation("Team name is required".to_string()))?;

            let category_id = match (&categories[..], request.category_id) {
                ([], None) => None,
                ([], Some(_)) => {
                    return Err(AppError::Validation(
                        "This hackathon has no categories".to_string(),
                    ))
                }
                (_, None) => {
                    return Err(AppError::Validation(
                        "A category is required for this hackathon".to_string(),
                    ))
                }
                (_, Some(category_id)) => {
                    let category = categories
                        .iter()
                        .find(|c| c.id == category_id)
                        .ok_or_else(|| {
                            AppError::NotFound("Category not found in this hackathon".to_string())
                        })?;

                    if let Some(capacity) = category.capacity {
                        let occupied = self.teams.count_in_category(category_id).await?;
                        if occupied >= capacity as i64 {
                            return Err(AppError::Conflict(format!(
                                "Category '{}' is full",
                                category.name
                            )));
                        }
                    }
                    Some(category_id)
                }
            };

            if self
                .teams
                .find_by_name(hackathon_id, &name)
                .await?
                .is_some()
            {
                return Err(AppError::Conflict(
                    "A team with this name already exists in this hackathon".to_string(),
                ));
            }

            (name, category_id)
        };

        let now = Utc::now();
        self.teams
            .create(Team {
                id: Uuid::new_v4(),
                hackathon_id,
                category_id,
                name,
                leader_id: actor.id,
                is_locked: false,
                is_solo: request.is_solo,
                created_at: now,
                updated_at: now,
            })
            .await
    }

    /// Joining the team you already belong to is a no-op.
    pub async fn join_team(&self, actor: &User, team_id: Uuid) -> Result<Team> {
        let team = self.get_team(team_id).await?;
        let hackathon = self.get_hackathon(team.hackathon_id).await?;

        hackathon
            .timeline
            .team_joining(Utc::now())
            .require_open("Team joining")?;

        if self.teams.is_member(team_id, actor.id).await? {
            return Ok(team);
        }

        if team.is_locked {
            return Err(AppError::Conflict("This team is locked".to_string()));
        }

        if team.is_solo {
            return Err(AppError::Conflict(
                "Solo teams do not accept members".to_string(),
            ));
        }

        if self
            .teams
            .find_user_team(team.hackathon_id, actor.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "You already belong to a team in this hackathon".to_string(),
            ));
        }

        // Count and insert happen in one statement so two concurrent joins
        // on the last seat cannot both get in.
        let added = self
            .teams
            .add_member_capped(team_id, actor.id, hackathon.max_team_size as i64)
            .await?;
        if !added {
            return Err(AppError::Conflict("This team is full".to_string()));
        }

        self.get_team(team_id).await
    }

    pub async fn leave_team(&self, actor: &User, team_id: Uuid) -> Result<()> {
        let team = self.get_team(team_id).await?;

        if team.is_locked {
            return Err(AppError::Conflict("This team is locked".to_string()));
        }

        if team.leader_id == actor.id {
            return Err(AppError::Conflict(
                "The leader must transfer leadership before leaving".to_string(),
            ));
        }

        if !self.teams.is_member(team_id, actor.id).await? {
            return Err(AppError::Conflict(
                "You are not a member of this team".to_string(),
            ));
        }

        self.teams.remove_member(team_id, actor.id).await
    }

    /// Freeze or unfreeze membership. Organizers/admins may lock any team;
    /// a mentor may lock only a team they mentor with an accepted assignment.
    pub async fn set_locked(&self, actor: &User, team_id: Uuid, locked: bool) -> Result<Team> {
        let team = self.get_team(team_id).await?;

        if !policy::allows(actor.role, policy::Capability::LockTeams) {
            return Err(AppError::Forbidden(
                "You are not allowed to lock teams".to_string(),
            ));
        }

        if actor.role == Role::Mentor {
            let accepted = self
                .assignments
                .find(team_id, actor.id, AssignmentRole::Mentor)
                .await?
                .map(|a| a.status == AssignmentStatus::Accepted)
                .unwrap_or(false);
            if !accepted {
                return Err(AppError::Forbidden(
                    "Mentors may only lock teams they mentor".to_string(),
                ));
            }
        }

        self.teams.set_locked(team.id, locked).await
    }

    pub async fn transfer_leadership(
        &self,
        actor: &User,
        team_id: Uuid,
        new_leader_id: Uuid,
    ) -> Result<Team> {
        let team = self.get_team(team_id).await?;

        if team.leader_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the team leader can transfer leadership".to_string(),
            ));
        }

        if !self.teams.is_member(team_id, new_leader_id).await? {
            return Err(AppError::Conflict(
                "The new leader must already be a team member".to_string(),
            ));
        }

        self.teams.set_leader(team_id, new_leader_id).await
    }

    pub async fn kick_member(&self, actor: &User, team_id: Uuid, member_id: Uuid) -> Result<()> {
        let team = self.get_team(team_id).await?;

        if team.leader_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the team leader can remove members".to_string(),
            ));
        }

        if member_id == actor.id {
            return Err(AppError::Conflict(
                "You cannot kick yourself; leave or transfer leadership instead".to_string(),
            ));
        }

        if team.is_locked {
            return Err(AppError::Conflict("This team is locked".to_string()));
        }

        if !self.teams.is_member(team_id, member_id).await? {
            return Err(AppError::Conflict(
                "That user is not a member of this team".to_string(),
            ));
        }

        self.teams.remove_member(team_id, member_id).await
    }

    /// Disband a team. Leader only, while joining is still open, so a team
    /// cannot dissolve mid-event; organizers/admins are not restricted by
    /// the window.
    pub async fn disband(&self, actor: &User, team_id: Uuid) -> Result<()> {
        let team = self.get_team(team_id).await?;

        let privileged = policy::allows(actor.role, policy::Capability::ManageHackathons);
        if team.leader_id != actor.id && !privileged {
            return Err(AppError::Forbidden(
                "Only the team leader can disband the team".to_string(),
            ));
        }

        if team.is_locked {
            return Err(AppError::Conflict("This team is locked".to_string()));
        }

        if !privileged {
            let hackathon = self.get_hackathon(team.hackathon_id).await?;
            hackathon
                .timeline
                .team_joining(Utc::now())
                .require_open("Disbanding a team")?;
        }

        self.teams.delete(team_id).await
    }
}
