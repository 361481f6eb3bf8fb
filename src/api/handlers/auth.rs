use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::AuthService,
    domain::{CreateUserRequest, Role},
    error::{AppError, Result},
    repository::UserRepository,
};

use super::users::UserDto;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserDto>)> {
    if !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let users = &state.service_context.user_repo;

    if users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }
    if users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let password_hash = AuthService::hash_password(&req.password).await?;
    let user = users
        .create(
            CreateUserRequest {
                email: req.email,
                username: req.username,
                full_name: req.full_name,
                password: String::new(),
                // Self-registration always lands as a participant; elevated
                // roles are granted by an admin afterwards.
                role: Role::Participant,
            },
            password_hash,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let user = state
        .service_context
        .user_repo
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !AuthService::verify_password(&req.password, &user.password_hash).await? {
        return Err(AppError::Unauthorized);
    }

    let (_session, token) = state
        .service_context
        .auth_service
        .create_session(user.id, state.settings.auth.session_duration_hours)
        .await?;

    let cookie = state
        .service_context
        .auth_service
        .create_session_cookie(&token, state.settings.auth.secure_cookies);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    if let Some(session_cookie) = jar.get("session") {
        state
            .service_context
            .auth_service
            .invalidate_session(session_cookie.value())
            .await?;
    }

    Ok((
        jar.add(AuthService::create_logout_cookie()),
        Json(LoginResponse {
            message: "Logged out".to_string(),
        }),
    ))
}

pub async fn me(Extension(current): Extension<CurrentUser>) -> Result<Json<UserDto>> {
    Ok(Json(current.user.into()))
}
