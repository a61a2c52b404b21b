//! Public contact form and its admin inbox

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult, parse_id},
    middleware::AdminUser,
    models::{CreateContactRequest, MessageResponse, NewContactMessage},
    state::AppState,
    validation::validate_text,
};

const MAX_NAME_CHARS: usize = 100;
const MAX_MESSAGE_CHARS: usize = 5000;

/// Leave a message through the contact form
pub async fn create_contact(
    State(state): State<AppState>,
    payload: Result<Json<CreateContactRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;

    validate_text("First name", &payload.first_name, MAX_NAME_CHARS)
        .map_err(ApiError::BadRequest)?;
    validate_text("Last name", &payload.last_name, MAX_NAME_CHARS)
        .map_err(ApiError::BadRequest)?;
    validate_text("Message", &payload.message, MAX_MESSAGE_CHARS)
        .map_err(ApiError::BadRequest)?;

    let message = state
        .contacts
        .create(NewContactMessage {
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            message: payload.message.trim().to_string(),
        })
        .await?;

    info!("Contact message {} received", message.id);
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_contacts(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.contacts.list().await?))
}

pub async fn delete_contact(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;

    if !state.contacts.delete(id).await? {
        return Err(ApiError::NotFound("Contact message not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Contact deleted successfully")))
}
