//! Signup, login, logout and session lookup

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    middleware::CurrentUser,
    models::{
        LoginRequest, MessageResponse, NewUser, Role, SignupRequest, UserResponse,
        user::normalize_email,
    },
    state::AppState,
    validation::{validate_email, validate_name, validate_password},
};

/// Register a regular user account
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;

    let name = payload.name.trim().to_string();
    let email = normalize_email(&payload.email);

    validate_name(&name).map_err(ApiError::BadRequest)?;
    validate_email(&email).map_err(ApiError::BadRequest)?;
    validate_password(&payload.password).map_err(ApiError::BadRequest)?;

    let password_hash = state
        .passwords
        .hash_blocking(&payload.password)
        .await
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            ApiError::InternalServerError
        })?;

    let user = state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
            role: Role::User,
        })
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::Conflict("Email already registered".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

    info!("New user signed up: {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Signup success",
            "user": UserResponse::from(&user),
        })),
    ))
}

/// Verify credentials and set the session cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let email = normalize_email(&payload.email);

    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let throttle_key = format!("login:{}", email);
    if !state.login_limiter.is_allowed(&throttle_key).await {
        warn!("Login throttled for {}", email);
        return Err(ApiError::TooManyRequests);
    }

    // Unknown e-mails still cost one Argon2 verification
    let user = state.users.find_by_email(&email).await?;
    let verified = state
        .passwords
        .verify_blocking(
            &payload.password,
            user.as_ref().map(|u| u.password_hash.as_str()),
        )
        .await;

    let user = user
        .filter(|_| verified)
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    state.login_limiter.reset(&throttle_key).await;

    let token = state.sessions.issue(&user).map_err(|e| {
        error!("Failed to issue session token: {}", e);
        ApiError::InternalServerError
    })?;

    info!("User logged in: {}", user.id);

    Ok((
        jar.add(state.sessions.session_cookie(token)),
        Json(json!({
            "message": "Login success",
            "user": UserResponse::from(&user),
        })),
    ))
}

/// Clear the session cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(state.sessions.removal_cookie()),
        Json(MessageResponse::new("Logout success")),
    )
}

/// Current session user, or `null`
pub async fn me(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(json!({
        "user": user.as_ref().map(UserResponse::from),
    }))
}
