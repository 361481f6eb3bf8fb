use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{
        Category, CreateCategoryRequest, CreateHackathonRequest, Hackathon, HackathonType, Phase,
        PublishStatus, Timeline, UpdateHackathonRequest,
    },
    error::{AppError, Result},
    repository::HackathonRepository,
};

use super::users::ListParams;

#[derive(Debug, Serialize)]
pub struct HackathonDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub hackathon_type: HackathonType,
    pub status: PublishStatus,
    /// Derived from the timeline at response time; never stored.
    pub phase: Phase,
    pub max_team_size: i32,
    pub organization_id: Option<Uuid>,
    pub created_by: Uuid,
    pub timeline: Timeline,
    pub created_at: String,
}

impl From<Hackathon> for HackathonDto {
    fn from(hackathon: Hackathon) -> Self {
        let phase = hackathon.phase(Utc::now());
        Self {
            id: hackathon.id,
            title: hackathon.title,
            slug: hackathon.slug,
            description: hackathon.description,
            hackathon_type: hackathon.hackathon_type,
            status: hackathon.status,
            phase,
            max_team_size: hackathon.max_team_size,
            organization_id: hackathon.organization_id,
            created_by: hackathon.created_by,
            timeline: hackathon.timeline,
            created_at: hackathon.created_at.to_rfc3339(),
        }
    }
}

pub async fn list_published(State(state): State<AppState>) -> Result<Json<Vec<HackathonDto>>> {
    let hackathons = state.service_context.hackathon_repo.list_published().await?;
    Ok(Json(hackathons.into_iter().map(Into::into).collect()))
}

pub async fn list_all(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<HackathonDto>>> {
    let hackathons = state
        .service_context
        .hackathon_repo
        .list(params.limit, params.offset)
        .await?;
    Ok(Json(hackathons.into_iter().map(Into::into).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HackathonDto>> {
    let hackathon = state
        .service_context
        .hackathon_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".to_string()))?;

    Ok(Json(hackathon.into()))
}

pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<HackathonDto>> {
    let hackathon = state
        .service_context
        .hackathon_repo
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".to_string()))?;

    Ok(Json(hackathon.into()))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(mut req): Json<CreateHackathonRequest>,
) -> Result<(StatusCode, Json<HackathonDto>)> {
    if req.max_team_size.is_none() {
        req.max_team_size = Some(state.settings.hackathon.default_max_team_size);
    }

    let hackathon = state
        .service_context
        .hackathon_service
        .create(&current.user, req)
        .await?;

    Ok((StatusCode::CREATED, Json(hackathon.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateHackathonRequest>,
) -> Result<Json<HackathonDto>> {
    let hackathon = state
        .service_context
        .hackathon_service
        .update(&current.user, id, req)
        .await?;

    Ok(Json(hackathon.into()))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: PublishStatus,
}

pub async fn set_status(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<HackathonDto>> {
    let hackathon = state
        .service_context
        .hackathon_service
        .set_status(&current.user, id, req.status)
        .await?;

    Ok(Json(hackathon.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .hackathon_service
        .delete(&current.user, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = state
        .service_context
        .hackathon_service
        .add_category(&current.user, id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Category>>> {
    let categories = state
        .service_context
        .hackathon_repo
        .list_categories(id)
        .await?;

    Ok(Json(categories))
}
