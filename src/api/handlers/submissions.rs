use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreateSubmissionRequest, Submission, UpdateSubmissionRequest},
    error::Result,
};

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<Submission>)> {
    let submission = state
        .service_context
        .submission_service
        .create(&current.user, team_id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<UpdateSubmissionRequest>,
) -> Result<Json<Submission>> {
    let submission = state
        .service_context
        .submission_service
        .update(&current.user, team_id, req)
        .await?;

    Ok(Json(submission))
}

pub async fn list_for_hackathon(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(hackathon_id): Path<Uuid>,
) -> Result<Json<Vec<Submission>>> {
    let submissions = state
        .service_context
        .submission_service
        .list_for_hackathon(&current.user, hackathon_id)
        .await?;

    Ok(Json(submissions))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Submission>> {
    let submission = state
        .service_context
        .submission_service
        .get(&current.user, id)
        .await?;

    Ok(Json(submission))
}
