//! Network-bound actions.
//!
//! Each action issues one request through [`ApiClient`], waits for the
//! response and, on success, commits the payload into the [`Store`]. Errors
//! are returned to the caller as-is and nothing is committed.
//!
//! [`ApiClient`]: crate::api::ApiClient
//! [`Store`]: crate::store::Store

mod files;
mod form;
mod jobs;
mod messages;
mod user;

pub use files::*;
pub use form::*;
pub use jobs::*;
pub use messages::*;
pub use user::*;
