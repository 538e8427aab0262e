/// Admin credential storage and verification
use crate::{
    db::Database,
    error::{CamError, CamResult},
    store::validation,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use tracing::{info, warn};

pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";

pub const USERNAME_MIN_LENGTH: usize = 6;
pub const USERNAME_MAX_LENGTH: usize = 25;

/// Username (plaintext) and argon2id password hash in the configuration bucket
#[derive(Clone)]
pub struct AdminCredentials {
    db: Arc<Database>,
}

impl AdminCredentials {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Both keys are present
    pub fn is_configured(&self) -> CamResult<bool> {
        Ok(self.db.get_config(USERNAME_KEY)?.is_some() && self.db.get_config(PASSWORD_KEY)?.is_some())
    }

    /// Validate and store a new username/password pair
    pub fn set(&self, username: &str, password: &str) -> CamResult<()> {
        validation::username(username, USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH)?;
        if password.is_empty() {
            return Err(CamError::validation("admin password must not be empty"));
        }

        let hash = hash_password(password)?;
        self.db.set_config(USERNAME_KEY, username.as_bytes())?;
        self.db.set_config(PASSWORD_KEY, hash.as_bytes())?;

        info!("admin account stored for {}", username);
        Ok(())
    }

    /// Exact username match plus password hash verification
    pub fn verify(&self, username: &str, password: &str) -> CamResult<bool> {
        let (Some(stored_username), Some(stored_hash)) = (
            self.db.get_config(USERNAME_KEY)?,
            self.db.get_config(PASSWORD_KEY)?,
        ) else {
            return Ok(false);
        };

        if stored_username != username.as_bytes() {
            return Ok(false);
        }

        let stored_hash = String::from_utf8(stored_hash)
            .map_err(|_| CamError::Internal("stored password hash is not UTF-8".to_string()))?;
        verify_password(password, &stored_hash)
    }

    /// Store the configured credentials when none exist yet, or when `reset` is set.
    /// Without configured credentials an unconfigured store only logs a warning.
    pub fn bootstrap(&self, username: Option<&str>, password: Option<&str>, reset: bool) -> CamResult<()> {
        let configured = self.is_configured()?;
        if configured && !reset {
            return Ok(());
        }

        match (username, password) {
            (Some(username), Some(password)) => self.set(username, password),
            _ if configured => {
                warn!("admin reset requested without credentials; keeping the stored account");
                Ok(())
            }
            _ => {
                warn!("no admin account configured; set HOMECAM_ADMIN_USERNAME and HOMECAM_ADMIN_PASSWORD");
                Ok(())
            }
        }
    }
}

/// argon2id PHC string with a random salt
pub fn hash_password(password: &str) -> CamResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CamError::Internal(format!("password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> CamResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| CamError::Internal(format!("stored password hash is invalid: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn credentials() -> (TempDir, AdminCredentials) {
        let dir = TempDir::new().unwrap();
        let db = Database::init(&dir.path().join("homecam.db")).unwrap();
        (dir, AdminCredentials::new(Arc::new(db)))
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn test_set_and_verify() {
        let (_dir, creds) = credentials();
        assert!(!creds.is_configured().unwrap());
        assert!(!creds.verify("camadmin", "secret").unwrap());

        creds.set("camadmin", "secret").unwrap();
        assert!(creds.is_configured().unwrap());
        assert!(creds.verify("camadmin", "secret").unwrap());
        assert!(!creds.verify("camadmin", "wrong").unwrap());
        assert!(!creds.verify("otheradmin", "secret").unwrap());
    }

    #[test]
    fn test_username_rules() {
        let (_dir, creds) = credentials();
        assert!(creds.set("short", "secret").is_err());
        assert!(creds.set("Cam-Admin", "secret").is_err());
        assert!(creds.set("cam_admin-1", "secret").is_ok());
        assert!(creds.set("cam_admin-1", "").is_err());
    }

    #[test]
    fn test_bootstrap_respects_reset() {
        let (_dir, creds) = credentials();

        creds.bootstrap(None, None, false).unwrap();
        assert!(!creds.is_configured().unwrap());

        creds.bootstrap(Some("camadmin"), Some("first"), false).unwrap();
        creds.bootstrap(Some("camadmin"), Some("second"), false).unwrap();
        assert!(creds.verify("camadmin", "first").unwrap());

        creds.bootstrap(Some("camadmin"), Some("second"), true).unwrap();
        assert!(creds.verify("camadmin", "second").unwrap());

        creds.bootstrap(None, None, true).unwrap();
        assert!(creds.verify("camadmin", "second").unwrap());
    }
}
