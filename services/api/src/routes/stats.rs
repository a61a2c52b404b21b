//! Admin dashboard figures

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;

use crate::{
    error::ApiResult,
    middleware::AdminUser,
    models::{DashboardStats, IssueFilter, Role},
    state::AppState,
};

pub async fn get_stats(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let issues = state.issues.list(&IssueFilter::default()).await?;
    let admin_count = state.users.count_by_role(Role::Admin).await?;
    let contact_count = state.contacts.count().await?;

    Ok(Json(DashboardStats::from_issues(
        &issues,
        admin_count,
        contact_count,
        Utc::now(),
    )))
}
