/// homecam - home camera controller
///
/// An admin-authenticated web server that keeps device, location, photo,
/// video, audio and request records in an embedded key/value store, with a
/// generic filtered and sorted query engine over every record type.

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod jobs;
pub mod models;
pub mod server;
pub mod store;

pub use context::AppContext;
pub use error::{CamError, CamResult};
