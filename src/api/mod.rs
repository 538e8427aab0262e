/// API routes and handlers
pub mod health;
pub mod login;
pub mod middleware;
pub mod records;

use crate::{
    context::AppContext,
    error::{CamError, CamResult},
    models::{Audio, Device, Location, Photo, Request, Video},
};
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(health::routes())
        .merge(login::routes())
        .merge(records::entity_routes::<Device>("devices"))
        .merge(records::entity_routes::<Location>("locations"))
        .merge(records::entity_routes::<Photo>("photos"))
        .merge(records::entity_routes::<Video>("videos"))
        .merge(records::entity_routes::<Audio>("audios"))
        .merge(records::entity_routes::<Request>("requests"))
}

/// Run a blocking store call off the async executor
pub async fn run_blocking<T, F>(f: F) -> CamResult<T>
where
    F: FnOnce() -> CamResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CamError::Internal(format!("blocking task failed: {}", e)))?
}
