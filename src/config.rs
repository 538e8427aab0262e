/// Configuration management for the homecam controller
use crate::error::{CamError, CamResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Created owner-only on startup
    pub config_directory: PathBuf,
    pub db_location: PathBuf,
}

/// Admin bootstrap and session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Overwrite stored credentials with the configured ones
    pub reset: bool,
    /// Seconds of inactivity before a session expires
    pub session_idle_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Upper bound on `limit` for list queries
    pub list_max_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info` or `homecam=debug,tower_http=info`
    pub level: String,
}

impl LoggingConfig {
    /// Build the subscriber filter, falling back to `info` on unparsable directives
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let config_directory = default_config_directory();
        let db_location = config_directory.join("homecam.db");

        Self {
            service: ServiceConfig {
                hostname: "0.0.0.0".to_string(),
                port: 8443,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            storage: StorageConfig {
                config_directory,
                db_location,
            },
            admin: AdminConfig {
                username: None,
                password: None,
                reset: false,
                session_idle_timeout: 20 * 60,
            },
            api: ApiConfig { list_max_limit: 100 },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables (and `.env`)
    pub fn from_env() -> CamResult<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        let hostname = env::var("HOMECAM_HOSTNAME").unwrap_or(defaults.service.hostname);
        let port = env::var("HOMECAM_PORT")
            .unwrap_or_else(|_| defaults.service.port.to_string())
            .parse()
            .map_err(|_| CamError::validation("Invalid port number"))?;

        let config_directory: PathBuf = env::var("HOMECAM_CONFIG_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage.config_directory);
        let db_location = env::var("HOMECAM_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_directory.join("homecam.db"));

        let username = env::var("HOMECAM_ADMIN_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("HOMECAM_ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());
        let reset = env::var("HOMECAM_RESET_ADMIN")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);
        let session_idle_timeout = env::var("HOMECAM_SESSION_IDLE_TIMEOUT")
            .unwrap_or_else(|_| defaults.admin.session_idle_timeout.to_string())
            .parse()
            .map_err(|_| CamError::validation("Invalid session idle timeout"))?;

        let list_max_limit = env::var("HOMECAM_LIST_MAX_LIMIT")
            .unwrap_or_else(|_| defaults.api.list_max_limit.to_string())
            .parse()
            .map_err(|_| CamError::validation("Invalid list max limit"))?;

        let level = env::var("RUST_LOG").unwrap_or(defaults.logging.level);

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version: defaults.service.version,
            },
            storage: StorageConfig {
                config_directory,
                db_location,
            },
            admin: AdminConfig {
                username,
                password,
                reset,
                session_idle_timeout,
            },
            api: ApiConfig { list_max_limit },
            logging: LoggingConfig { level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> CamResult<()> {
        if self.service.hostname.is_empty() {
            return Err(CamError::validation("Hostname cannot be empty"));
        }

        if self.service.port == 0 {
            return Err(CamError::validation("Port cannot be zero"));
        }

        if self.admin.session_idle_timeout == 0 {
            return Err(CamError::validation("Session idle timeout cannot be zero"));
        }

        if self.api.list_max_limit == 0 {
            return Err(CamError::validation("List max limit cannot be zero"));
        }

        if self.admin.username.is_some() != self.admin.password.is_some() {
            return Err(CamError::validation(
                "Admin username and password must be set together",
            ));
        }

        Ok(())
    }

    /// Bind address in `host:port` form
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.hostname, self.service.port)
    }
}

fn default_config_directory() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".homecam")
}
