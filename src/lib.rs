//! JobTrack client
//!
//! Client-side mirror of the JobTrack job board: an in-memory store of the
//! signed-in user's jobs, the unassigned job pool and form UI state, kept in
//! sync through the REST API and the realtime broker.

pub mod actions;
pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod models;
pub mod realtime;
pub mod store;

pub use api::ApiClient;
pub use config::Config;
pub use errors::{ClientError, Result};
pub use store::{Store, StoreChange};
