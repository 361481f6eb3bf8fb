use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreateTeamRequest, Team, TeamMember},
    error::Result,
    repository::TeamRepository,
};

#[derive(Debug, Serialize)]
pub struct TeamDto {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMember>,
}

pub async fn list_for_hackathon(
    State(state): State<AppState>,
    Path(hackathon_id): Path<Uuid>,
) -> Result<Json<Vec<Team>>> {
    let teams = state
        .service_context
        .team_repo
        .list_by_hackathon(hackathon_id)
        .await?;

    Ok(Json(teams))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamDto>> {
    let team = state
        .service_context
        .team_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound("Team not found".to_string()))?;

    let members = state.service_context.team_repo.members(id).await?;

    Ok(Json(TeamDto { team, members }))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(hackathon_id): Path<Uuid>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Team>)> {
    let team = state
        .service_context
        .team_service
        .create_team(&current.user, hackathon_id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn join(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Team>> {
    let team = state
        .service_context
        .team_service
        .join_team(&current.user, id)
        .await?;

    Ok(Json(team))
}

pub async fn leave(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .team_service
        .leave_team(&current.user, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct LockRequest {
    pub locked: bool,
}

pub async fn set_locked(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<LockRequest>,
) -> Result<Json<Team>> {
    let team = state
        .service_context
        .team_service
        .set_locked(&current.user, id, req.locked)
        .await?;

    Ok(Json(team))
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub new_leader_id: Uuid,
}

pub async fn transfer_leadership(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<Team>> {
    let team = state
        .service_context
        .team_service
        .transfer_leadership(&current.user, id, req.new_leader_id)
        .await?;

    Ok(Json(team))
}

pub async fn disband(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .team_service
        .disband(&current.user, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn kick(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    state
        .service_context
        .team_service
        .kick_member(&current.user, id, member_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
