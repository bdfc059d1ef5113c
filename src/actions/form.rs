//! Job form dialog actions. Local only.

use crate::models::Job;
use crate::store::Store;

/// Show the job form, pre-filled from `initial_job` when given.
pub fn open_job_form(store: &Store, initial_job: Option<Job>) {
    store.open_job_form(initial_job);
}

pub fn close_job_form(store: &Store) {
    store.close_job_form();
}
