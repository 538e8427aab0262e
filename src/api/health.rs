/// Health check endpoints
use crate::{api::run_blocking, context::AppContext};
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};

/// Build health check routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health_basic))
        .route("/health/ready", get(readiness_probe))
}

/// Returns simple JSON with status and version
pub async fn health_basic() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready once the store answers a read and carries a schema stamp
pub async fn readiness_probe(
    State(ctx): State<AppContext>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let db = ctx.db.clone();

    match run_blocking(move || db.schema_version()).await {
        Ok(Some(schema_version)) => Ok(Json(serde_json::json!({
            "status": "ready",
            "version": env!("CARGO_PKG_VERSION"),
            "schema_version": schema_version
        }))),
        Ok(None) => {
            tracing::warn!("readiness_probe_failed: schema version missing");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
        Err(e) => {
            tracing::warn!(error = %e, "readiness_probe_failed: store check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
