//! Issue submission and management

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult, parse_id},
    middleware::{CurrentUser, can_modify_issue},
    models::{
        CreateIssueRequest, Issue, IssueChanges, IssueFilter, IssueQuery, MessageResponse,
        NewIssue, UpdateIssueRequest, User,
        issue::{DEFAULT_IMAGE_URL, DEFAULT_REPORTER, submission_date},
    },
    state::AppState,
    validation::validate_text,
};

const MAX_TITLE_CHARS: usize = 200;
const MAX_LOCATION_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 5000;
const MAX_REPORTER_CHARS: usize = 100;

/// Trimmed value, or `None` when blank
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Submit a new issue
pub async fn create_issue(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreateIssueRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;

    validate_text("Title", &payload.title, MAX_TITLE_CHARS).map_err(ApiError::BadRequest)?;
    validate_text("Location", &payload.location, MAX_LOCATION_CHARS)
        .map_err(ApiError::BadRequest)?;
    validate_text("Description", &payload.description, MAX_DESCRIPTION_CHARS)
        .map_err(ApiError::BadRequest)?;
    let category = payload
        .category
        .ok_or_else(|| ApiError::BadRequest("Category is required".to_string()))?;

    let reporter = match &user {
        Some(user) => user.name.clone(),
        None => non_blank(payload.reporter).unwrap_or_else(|| DEFAULT_REPORTER.to_string()),
    };
    validate_text("Reporter", &reporter, MAX_REPORTER_CHARS).map_err(ApiError::BadRequest)?;

    let new_issue = NewIssue {
        title: payload.title.trim().to_string(),
        location: payload.location.trim().to_string(),
        description: payload.description.trim().to_string(),
        category,
        reporter,
        reporter_id: user.as_ref().map(|u| u.id),
        image_url: non_blank(payload.image_url).unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
        date: submission_date(Utc::now()),
    };

    let issue = state.issues.create(new_issue).await?;
    info!("Issue {} submitted in {}", issue.id, issue.category);

    Ok((StatusCode::CREATED, Json(issue)))
}

/// List issues, newest first
pub async fn list_issues(
    State(state): State<AppState>,
    query: Result<Query<IssueQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let issues = state.issues.list(&IssueFilter::from(query)).await?;
    Ok(Json(issues))
}

/// Get a single issue
pub async fn get_issue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let issue = state
        .issues
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Issue not found".to_string()))?;

    Ok(Json(issue))
}

/// Load an issue the current user is allowed to change.
///
/// Existence is checked before permission.
async fn modifiable_issue(
    state: &AppState,
    user: Option<&User>,
    raw_id: &str,
) -> ApiResult<Issue> {
    let id = parse_id(raw_id)?;
    let issue = state
        .issues
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Issue not found".to_string()))?;

    if !can_modify_issue(user, &issue) {
        return Err(ApiError::Forbidden);
    }
    Ok(issue)
}

/// Edit an issue. Owner or admin only.
pub async fn update_issue(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateIssueRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let issue = modifiable_issue(&state, user.as_ref(), &id).await?;
    let Json(payload) = payload?;

    let text_fields = [
        ("Title", &payload.title, MAX_TITLE_CHARS),
        ("Location", &payload.location, MAX_LOCATION_CHARS),
        ("Description", &payload.description, MAX_DESCRIPTION_CHARS),
    ];
    for (field, value, max_chars) in text_fields {
        if let Some(value) = value {
            validate_text(field, value, max_chars).map_err(ApiError::BadRequest)?;
        }
    }

    let changes = IssueChanges {
        title: payload.title.map(|v| v.trim().to_string()),
        location: payload.location.map(|v| v.trim().to_string()),
        description: payload.description.map(|v| v.trim().to_string()),
        category: payload.category,
        status: payload.status,
        image_url: non_blank(payload.image_url),
    };

    let updated = state
        .issues
        .update(issue.id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("Issue not found".to_string()))?;

    info!("Issue {} updated, status {}", updated.id, updated.status);
    Ok(Json(updated))
}

/// Delete an issue. Owner or admin only.
pub async fn delete_issue(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let issue = modifiable_issue(&state, user.as_ref(), &id).await?;

    if !state.issues.delete(issue.id).await? {
        return Err(ApiError::NotFound("Issue not found".to_string()));
    }

    info!("Issue {} deleted", issue.id);
    Ok(Json(MessageResponse::new("Deleted")))
}
