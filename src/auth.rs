/// Authentication extractors
use crate::{api::middleware::extract_bearer_token, context::AppContext, error::CamError};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Logged-in admin, resolved from the bearer session token
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub username: String,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminSession {
    type Rejection = CamError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| CamError::Authentication("Missing authorization header".to_string()))?;

        let session = state
            .sessions
            .validate(&token)
            .await
            .ok_or_else(|| CamError::Authentication("Invalid or expired session".to_string()))?;

        Ok(AdminSession {
            username: session.username,
            token,
        })
    }
}
