//! Transient UI state for the job form dialog.

use serde::Serialize;

use super::Job;

/// Job form dialog state. Never sent to the server.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FormData {
    pub dialog: bool,
    /// Job used to pre-fill the form, if any
    pub initial_job: Option<Job>,
}
