//! Session extractors and access rules

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::{
    error::ApiError,
    models::{Issue, User},
    session::SESSION_COOKIE,
    state::AppState,
};

/// The account behind the session cookie, if any.
///
/// A missing, forged or expired cookie, or one naming a deleted account,
/// yields `CurrentUser(None)`. The account is re-read from storage so role
/// changes apply on the next request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(CurrentUser(None));
        };

        let claims = match state.sessions.verify(cookie.value()) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Ignoring invalid session cookie: {}", e);
                return Ok(CurrentUser(None));
            }
        };

        let user = state.users.find_by_id(claims.sub).await?;
        Ok(CurrentUser(user))
    }
}

/// A session whose account currently holds the admin role.
///
/// Rejects anonymous requests with 401 and other accounts with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        match user {
            Some(user) if user.is_admin() => Ok(AdminUser(user)),
            Some(_) => Err(ApiError::Forbidden),
            None => Err(ApiError::Unauthorized("Authentication required".to_string())),
        }
    }
}

/// Owners may change their own issues; admins may change any.
/// Anonymous submissions have no owner.
pub fn can_modify_issue(user: Option<&User>, issue: &Issue) -> bool {
    match user {
        Some(user) if user.is_admin() => true,
        Some(user) => issue.reporter_id == Some(user.id),
        None => false,
    }
}
