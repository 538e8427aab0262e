/// Background task implementations
use crate::{
    api::run_blocking,
    context::AppContext,
    error::{CamError, CamResult},
};

/// Drop idle admin sessions
pub async fn cleanup_expired_sessions(ctx: &AppContext) -> usize {
    ctx.sessions.purge_expired().await
}

/// Verify the store still answers reads and carries its schema stamp
pub async fn health_check(ctx: &AppContext) -> CamResult<()> {
    let db = ctx.db.clone();

    match run_blocking(move || db.schema_version()).await? {
        Some(_) => Ok(()),
        None => Err(CamError::Internal("schema version stamp missing".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ServerConfig, db::Database};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context() -> (TempDir, AppContext) {
        let dir = TempDir::new().unwrap();
        let db = Database::init(&dir.path().join("homecam.db")).unwrap();
        (dir, AppContext::from_parts(ServerConfig::default(), Arc::new(db)))
    }

    #[tokio::test]
    async fn test_health_check_passes_on_stamped_store() {
        let (_dir, ctx) = context();
        assert!(health_check(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_fresh_sessions() {
        let (_dir, ctx) = context();
        ctx.sessions.create("camadmin").await;

        assert_eq!(cleanup_expired_sessions(&ctx).await, 0);
        assert_eq!(ctx.sessions.len().await, 1);
    }
}
