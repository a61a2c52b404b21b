//! Admin account management

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use common::error::DatabaseError;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult, parse_id},
    middleware::AdminUser,
    models::{
        CreateAdminRequest, MessageResponse, NewUser, Role, UpdateAdminRequest, UserChanges,
        UserResponse, user::normalize_email,
    },
    state::AppState,
    validation::{validate_email, validate_name, validate_password},
};

fn email_conflict(e: DatabaseError) -> ApiError {
    if e.is_unique_violation() {
        ApiError::Conflict("Email already in use".to_string())
    } else {
        ApiError::Database(e)
    }
}

async fn hash_password(state: &AppState, password: &str) -> ApiResult<String> {
    state.passwords.hash_blocking(password).await.map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::InternalServerError
    })
}

/// List admin accounts, newest first
pub async fn list_admins(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let admins = state.users.list_by_role(Role::Admin).await?;
    let admins: Vec<UserResponse> = admins.iter().map(UserResponse::from).collect();
    Ok(Json(admins))
}

/// Create another admin account
pub async fn create_admin(
    AdminUser(actor): AdminUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateAdminRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;

    let name = payload.name.trim().to_string();
    let email = normalize_email(&payload.email);

    validate_name(&name).map_err(ApiError::BadRequest)?;
    validate_email(&email).map_err(ApiError::BadRequest)?;
    validate_password(&payload.password).map_err(ApiError::BadRequest)?;

    let password_hash = hash_password(&state, &payload.password).await?;

    let admin = state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
            role: Role::Admin,
        })
        .await
        .map_err(email_conflict)?;

    info!("Admin {} created by {}", admin.id, actor.id);
    Ok((StatusCode::CREATED, Json(UserResponse::from(&admin))))
}

/// Edit an account.
///
/// Changing name, e-mail or password requires the target account's current
/// password. Role-only changes do not.
pub async fn update_admin(
    AdminUser(actor): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateAdminRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;

    let target = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    match payload.current_password.as_deref().filter(|p| !p.is_empty()) {
        Some(current) => {
            let verified = state
                .passwords
                .verify_blocking(current, Some(&target.password_hash))
                .await;
            if !verified {
                return Err(ApiError::Unauthorized("Incorrect password".to_string()));
            }
        }
        None if payload.changes_credentials() => {
            return Err(ApiError::BadRequest(
                "Current password is required".to_string(),
            ));
        }
        None => {}
    }

    let name = payload.name.as_deref().map(str::trim).map(str::to_string);
    if let Some(name) = &name {
        validate_name(name).map_err(ApiError::BadRequest)?;
    }

    let email = payload.email.as_deref().map(normalize_email);
    if let Some(email) = &email {
        validate_email(email).map_err(ApiError::BadRequest)?;
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => {
            validate_password(password).map_err(ApiError::BadRequest)?;
            Some(hash_password(&state, password).await?)
        }
        None => None,
    };

    let changes = UserChanges {
        name,
        email,
        role: payload.role,
        password_hash,
    };

    let updated = state
        .users
        .update(id, &changes)
        .await
        .map_err(email_conflict)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!("User {} updated by {}", updated.id, actor.id);
    Ok(Json(UserResponse::from(&updated)))
}

/// Delete an account
pub async fn delete_admin(
    AdminUser(actor): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;

    if !state.users.delete(id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!("User {} deleted by {}", id, actor.id);
    Ok(Json(MessageResponse::new("Deleted")))
}
