/// Application context and dependency injection
use crate::{
    admin::{AdminCredentials, SessionStore},
    config::ServerConfig,
    db::Database,
    error::{CamError, CamResult},
    store::{Entity, Repository},
};
use std::path::Path;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: Arc<Database>,
    pub credentials: AdminCredentials,
    pub sessions: SessionStore,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> CamResult<Self> {
        config.validate()?;

        Self::ensure_directories(&config).await?;

        let db = Arc::new(Database::init(&config.storage.db_location)?);
        tracing::info!("record store ready at {:?}", db.path());

        let ctx = Self::from_parts(config, db);

        ctx.credentials.bootstrap(
            ctx.config.admin.username.as_deref(),
            ctx.config.admin.password.as_deref(),
            ctx.config.admin.reset,
        )?;

        Ok(ctx)
    }

    /// Assemble a context around an already opened store
    pub fn from_parts(config: ServerConfig, db: Arc<Database>) -> Self {
        let idle_seconds = i64::try_from(config.admin.session_idle_timeout)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        let idle_timeout = chrono::Duration::seconds(idle_seconds);

        Self {
            credentials: AdminCredentials::new(db.clone()),
            sessions: SessionStore::new(idle_timeout),
            config: Arc::new(config),
            db,
        }
    }

    /// Repository for one entity type over the shared store
    pub fn repository<E: Entity>(&self) -> Repository<E> {
        Repository::new(self.db.clone())
    }

    /// Ensure the configuration directory and the store's parent exist
    async fn ensure_directories(config: &ServerConfig) -> CamResult<()> {
        let mut dirs = vec![config.storage.config_directory.as_path()];
        if let Some(parent) = config.storage.db_location.parent() {
            if !parent.as_os_str().is_empty() {
                dirs.push(parent);
            }
        }

        for dir in dirs {
            if !dir.exists() {
                tokio::fs::create_dir_all(dir).await.map_err(|e| {
                    CamError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
                })?;
                restrict_to_owner(dir).await?;
            }
        }

        Ok(())
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}

#[cfg(unix)]
async fn restrict_to_owner(dir: &Path) -> CamResult<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_to_owner(_dir: &Path) -> CamResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.storage.config_directory = dir.join("conf");
        config.storage.db_location = dir.join("conf").join("homecam.db");
        config
    }

    #[tokio::test]
    async fn test_new_creates_private_config_directory() {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::new(config_in(dir.path())).await.unwrap();

        assert!(ctx.config.storage.db_location.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(dir.path().join("conf"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }

    #[tokio::test]
    async fn test_new_bootstraps_admin() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(dir.path());
        config.admin.username = Some("camadmin".into());
        config.admin.password = Some("secret".into());

        let ctx = AppContext::new(config).await.unwrap();
        assert!(ctx.credentials.verify("camadmin", "secret").unwrap());
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(dir.path());
        config.service.port = 0;

        assert!(AppContext::new(config).await.is_err());
    }
}
