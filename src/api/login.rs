/// Admin login and logout
use crate::{
    api::run_blocking,
    auth::AdminSession,
    context::AppContext,
    error::CamResult,
};
use axum::{extract::State, response::Json, routing::post, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Denied logins still answer 200 with `{"access":"denied"}`
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> CamResult<Json<Value>> {
    let credentials = ctx.credentials.clone();
    let LoginRequest { username, password } = req;

    let attempted = username.clone();
    let granted = run_blocking(move || credentials.verify(&attempted, &password)).await?;

    if !granted {
        warn!("login denied for {}", username);
        return Ok(Json(json!({ "access": "denied" })));
    }

    let token = ctx.sessions.create(&username).await;
    info!("login granted for {}", username);

    Ok(Json(json!({
        "access": "granted",
        "token": token
    })))
}

async fn logout(session: AdminSession, State(ctx): State<AppContext>) -> Json<Value> {
    if let Some(revoked) = ctx.sessions.revoke(&session.token).await {
        let age = Utc::now() - revoked.created_at;
        info!(
            username = %revoked.username,
            session_age_secs = age.num_seconds(),
            "logout"
        );
    }

    Json(json!({ "status": "ok" }))
}
