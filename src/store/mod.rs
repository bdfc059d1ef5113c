//! Client-side state store.
//!
//! `Store` is a cheap, cloneable handle shared by the UI layer, the actions
//! and the realtime dispatcher. Mutations are the only write path; each one
//! runs to completion under the lock and then announces what changed.

mod state;

pub use state::*;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;
use tracing::debug;

use crate::errors::Result;
use crate::models::{FormData, Job, JobPatch, Message, User};

/// Capacity of the change notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Which slice of state a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Jobs,
    UnassignedJobs,
    User,
    FormData,
}

/// Shared handle to the application state.
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<StoreState>>,
    changes: broadcast::Sender<StoreChange>,
}

impl Store {
    pub fn new(user: User) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(StoreState::new(user))),
            changes,
        }
    }

    /// Receive a `StoreChange` after every mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    // Reducers validate before writing, so a poisoned lock still guards
    // consistent state.
    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, changes: &[StoreChange]) {
        for change in changes {
            // No receivers is fine
            let _ = self.changes.send(*change);
        }
    }

    // ==================== GETTERS ====================

    pub fn jobs(&self) -> Vec<Job> {
        self.read().jobs.clone()
    }

    pub fn job(&self, id: i64) -> Option<Job> {
        self.read().jobs.iter().find(|job| job.id == id).cloned()
    }

    pub fn unassigned_jobs(&self) -> Vec<Job> {
        self.read().unassigned_jobs.clone()
    }

    pub fn user(&self) -> User {
        self.read().user.clone()
    }

    pub fn form_data(&self) -> FormData {
        self.read().form_data.clone()
    }

    /// Number of jobs with unseen activity for the current user.
    pub fn notifications(&self) -> usize {
        self.read().notifications()
    }

    /// Full copy of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.read().clone()
    }

    // ==================== MUTATIONS ====================

    pub fn set_jobs(&self, jobs: Vec<Job>) {
        debug!(count = jobs.len(), "Commit set_jobs");
        self.write().set_jobs(jobs);
        self.notify(&[StoreChange::Jobs]);
    }

    pub fn set_unassigned_jobs(&self, jobs: Vec<Job>) {
        debug!(count = jobs.len(), "Commit set_unassigned_jobs");
        self.write().set_unassigned_jobs(jobs);
        self.notify(&[StoreChange::UnassignedJobs]);
    }

    pub fn add_or_update_job(&self, patch: JobPatch) {
        self.add_or_update_jobs(vec![patch]);
    }

    /// Merge job updates by id; unassigned membership follows each merged job.
    pub fn add_or_update_jobs(&self, patches: impl IntoIterator<Item = JobPatch>) {
        let mut applied = 0;
        {
            let mut state = self.write();
            for patch in patches {
                debug!(job_id = patch.id, "Commit add_or_update_job");
                state.add_or_update_job(patch);
                applied += 1;
            }
        }
        if applied > 0 {
            self.notify(&[StoreChange::Jobs, StoreChange::UnassignedJobs]);
        }
    }

    pub fn add_or_remove_unassigned_job(&self, patch: JobPatch) {
        self.add_or_remove_unassigned_jobs(vec![patch]);
    }

    pub fn add_or_remove_unassigned_jobs(&self, patches: impl IntoIterator<Item = JobPatch>) {
        let mut applied = 0;
        {
            let mut state = self.write();
            for patch in patches {
                debug!(job_id = patch.id, "Commit add_or_remove_unassigned_job");
                state.add_or_remove_unassigned_job(patch);
                applied += 1;
            }
        }
        if applied > 0 {
            self.notify(&[StoreChange::UnassignedJobs]);
        }
    }

    /// Remove a job by id. Returns whether it was in the job list.
    pub fn remove_job(&self, id: i64) -> bool {
        debug!(job_id = id, "Commit remove_job");
        let removed = self.write().remove_job(id);
        self.notify(&[StoreChange::Jobs, StoreChange::UnassignedJobs]);
        removed
    }

    pub fn remove_unassigned_job(&self, id: i64) -> bool {
        debug!(job_id = id, "Commit remove_unassigned_job");
        let removed = self.write().remove_unassigned_job(id);
        self.notify(&[StoreChange::UnassignedJobs]);
        removed
    }

    pub fn add_message(&self, message: Message) -> Result<()> {
        debug!(
            message_id = message.id,
            job_id = message.job_id,
            "Commit add_message"
        );
        self.write().add_message(message)?;
        self.notify(&[StoreChange::Jobs]);
        Ok(())
    }

    pub fn clear_all_notify(&self, job_id: i64) -> Result<()> {
        self.write().clear_all_notify(job_id)?;
        self.notify(&[StoreChange::Jobs]);
        Ok(())
    }

    pub fn set_user(&self, user: User) {
        debug!(user_id = user.id, "Commit set_user");
        self.write().set_user(user);
        self.notify(&[StoreChange::User]);
    }

    pub fn open_job_form(&self, initial_job: Option<Job>) {
        self.write().open_job_form(initial_job);
        self.notify(&[StoreChange::FormData]);
    }

    pub fn close_job_form(&self) {
        self.write().close_job_form();
        self.notify(&[StoreChange::FormData]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> Store {
        Store::new(serde_json::from_value(json!({"id": 1, "is_technician": false})).unwrap())
    }

    #[test]
    fn test_mutations_announce_changes() {
        let store = store();
        let mut changes = store.subscribe();

        store.set_jobs(Vec::new());
        store.open_job_form(None);

        assert_eq!(changes.try_recv().unwrap(), StoreChange::Jobs);
        assert_eq!(changes.try_recv().unwrap(), StoreChange::FormData);
        assert!(changes.try_recv().is_err());
    }

    #[test]
    fn test_failed_mutation_is_silent() {
        let store = store();
        let mut changes = store.subscribe();

        let message = serde_json::from_value(json!({"id": 1, "job_id": 3, "text": "x"})).unwrap();
        assert!(store.add_message(message).is_err());
        assert!(changes.try_recv().is_err());
    }

    #[test]
    fn test_empty_batch_is_silent() {
        let store = store();
        let mut changes = store.subscribe();

        store.add_or_update_jobs(Vec::new());
        store.add_or_remove_unassigned_jobs(Vec::new());
        assert!(changes.try_recv().is_err());

        store.add_or_update_jobs(vec![JobPatch::new(4)]);
        assert_eq!(changes.try_recv().unwrap(), StoreChange::Jobs);
        assert_eq!(changes.try_recv().unwrap(), StoreChange::UnassignedJobs);
    }

    #[test]
    fn test_clones_share_state() {
        let store = store();
        let other = store.clone();

        other.add_or_update_job(JobPatch::new(9));

        assert_eq!(store.job(9).map(|job| job.id), Some(9));
        assert_eq!(store.unassigned_jobs().len(), 1);
        assert!(store.form_data() == FormData::default());
    }
}
