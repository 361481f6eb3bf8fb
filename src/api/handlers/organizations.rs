use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{policy, policy::Capability, CreateOrganizationRequest, Organization},
    error::{AppError, Result},
    repository::OrganizationRepository,
};

use super::users::ListParams;

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<Organization>)> {
    if !policy::allows(current.user.role, Capability::ManageOrganizations) {
        return Err(AppError::Forbidden(
            "Only organizers can create organizations".to_string(),
        ));
    }

    let orgs = &state.service_context.organization_repo;
    if orgs.find_by_slug(&req.slug).await?.is_some() {
        return Err(AppError::Conflict(
            "An organization with this slug already exists".to_string(),
        ));
    }

    let now = Utc::now();
    let organization = orgs
        .create(Organization {
            id: Uuid::new_v4(),
            name: req.name,
            slug: req.slug,
            description: req.description,
            created_by: current.user.id,
            created_at: now,
            updated_at: now,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(organization)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Organization>>> {
    let organizations = state
        .service_context
        .organization_repo
        .list(params.limit, params.offset)
        .await?;

    Ok(Json(organizations))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Organization>> {
    let organization = state
        .service_context
        .organization_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    Ok(Json(organization))
}
