use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{RateSubmissionRequest, Rating},
    error::Result,
    repository::RatingAggregate,
};

pub async fn rate(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(submission_id): Path<Uuid>,
    Json(req): Json<RateSubmissionRequest>,
) -> Result<Json<Rating>> {
    let rating = state
        .service_context
        .rating_service
        .rate(&current.user, submission_id, req)
        .await?;

    Ok(Json(rating))
}

pub async fn list_for_submission(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(submission_id): Path<Uuid>,
) -> Result<Json<Vec<Rating>>> {
    let ratings = state
        .service_context
        .rating_service
        .list_for_submission(&current.user, submission_id)
        .await?;

    Ok(Json(ratings))
}

pub async fn aggregate(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(submission_id): Path<Uuid>,
) -> Result<Json<Option<RatingAggregate>>> {
    let aggregate = state
        .service_context
        .rating_service
        .aggregate(&current.user, submission_id)
        .await?;

    Ok(Json(aggregate))
}
