/// Admin account and session management
///
/// The controller has a single admin. Its username and password hash live in
/// the configuration bucket; logged-in sessions are held in memory only.

pub mod credentials;
pub mod sessions;

pub use credentials::AdminCredentials;
pub use sessions::{Session, SessionStore};
