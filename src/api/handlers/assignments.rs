use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{AssignRequest, Assignment, AssignmentRole, RespondRequest, RosterEntry},
    error::Result,
};

pub async fn assign(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> Result<(StatusCode, Json<Assignment>)> {
    let assignment = state
        .service_context
        .assignment_service
        .assign(&current.user, team_id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn respond(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<Assignment>> {
    let assignment = state
        .service_context
        .assignment_service
        .respond(&current.user, id, req.response)
        .await?;

    Ok(Json(assignment))
}

pub async fn list_for_team(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<Vec<Assignment>>> {
    let assignments = state
        .service_context
        .assignment_service
        .list_for_team(team_id)
        .await?;

    Ok(Json(assignments))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(hackathon_id): Path<Uuid>,
) -> Result<Json<Vec<Assignment>>> {
    let assignments = state
        .service_context
        .assignment_service
        .list_for_user(&current.user, hackathon_id)
        .await?;

    Ok(Json(assignments))
}

#[derive(Debug, Deserialize)]
pub struct RosterParams {
    pub role: AssignmentRole,
}

pub async fn roster(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Path(hackathon_id): Path<Uuid>,
    Query(params): Query<RosterParams>,
) -> Result<Json<Vec<RosterEntry>>> {
    let roster = state
        .service_context
        .assignment_service
        .roster(hackathon_id, params.role)
        .await?;

    Ok(Json(roster))
}
