//! In-memory state and the reducers that mutate it.
//!
//! Reducers are plain synchronous functions over `StoreState`; the `Store`
//! handle serializes access to them.

use tracing::debug;

use crate::errors::{ClientError, Result};
use crate::models::{FormData, Job, JobPatch, Message, User};

/// Everything the client mirrors from the server, plus form UI state.
#[derive(Debug, Clone)]
pub struct StoreState {
    pub jobs: Vec<Job>,
    pub unassigned_jobs: Vec<Job>,
    pub user: User,
    pub form_data: FormData,
}

impl StoreState {
    pub fn new(user: User) -> Self {
        Self {
            jobs: Vec::new(),
            unassigned_jobs: Vec::new(),
            user,
            form_data: FormData::default(),
        }
    }

    // ==================== JOBS ====================

    pub fn set_jobs(&mut self, jobs: Vec<Job>) {
        self.jobs = jobs;
    }

    pub fn set_unassigned_jobs(&mut self, jobs: Vec<Job>) {
        self.unassigned_jobs = jobs;
    }

    /// Merge a job update by id, then keep the unassigned list in line with
    /// the merged job's assignment.
    pub fn add_or_update_job(&mut self, patch: JobPatch) {
        let merged = merge_into(&mut self.jobs, patch).clone();
        self.sync_unassigned(merged);
    }

    /// Unassigned-list maintenance for a job that may not be in the job list.
    pub fn add_or_remove_unassigned_job(&mut self, patch: JobPatch) {
        let id = patch.id;
        let position = self.unassigned_jobs.iter().position(|job| job.id == id);

        // Judge the assignment on the merged result so a partial update of a
        // listed job does not evict it.
        let still_unassigned = match position {
            Some(index) => {
                let mut candidate = self.unassigned_jobs[index].clone();
                candidate.apply(patch.clone());
                candidate.is_unassigned()
            }
            None => patch.is_unassigned(),
        };

        if still_unassigned {
            merge_into(&mut self.unassigned_jobs, patch);
        } else if let Some(index) = position {
            debug!(job_id = id, "Job assigned, leaving unassigned list");
            self.unassigned_jobs.remove(index);
        }
    }

    /// Remove a job from both lists. Returns whether the job list held it.
    pub fn remove_job(&mut self, id: i64) -> bool {
        self.remove_unassigned_job(id);

        match self.jobs.iter().position(|job| job.id == id) {
            Some(index) => {
                self.jobs.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop a job from the unassigned list only.
    pub fn remove_unassigned_job(&mut self, id: i64) -> bool {
        match self.unassigned_jobs.iter().position(|job| job.id == id) {
            Some(index) => {
                self.unassigned_jobs.remove(index);
                true
            }
            None => false,
        }
    }

    /// Mirror a merged job into the unassigned list.
    fn sync_unassigned(&mut self, job: Job) {
        let position = self.unassigned_jobs.iter().position(|j| j.id == job.id);

        match (job.is_unassigned(), position) {
            (true, Some(index)) => self.unassigned_jobs[index] = job,
            (true, None) => self.unassigned_jobs.insert(0, job),
            (false, Some(index)) => {
                self.unassigned_jobs.remove(index);
            }
            (false, None) => {}
        }
    }

    // ==================== MESSAGES ====================

    /// Append a message to its job and flag the job for the recipient.
    ///
    /// A message already present (same id) is not appended twice.
    pub fn add_message(&mut self, message: Message) -> Result<()> {
        let role = self.user.role();
        let is_recipient = message.recipient_id == Some(self.user.id);

        let job = self
            .jobs
            .iter_mut()
            .find(|job| job.id == message.job_id)
            .ok_or(ClientError::JobNotFound(message.job_id))?;

        if !job.messages.iter().any(|m| m.id == message.id) {
            job.messages.push(message);
        }
        if is_recipient {
            job.set_notify_for(role, true);
        }
        Ok(())
    }

    /// Locally clear unseen markers on a job for the current user's role.
    pub fn clear_all_notify(&mut self, job_id: i64) -> Result<()> {
        let role = self.user.role();
        let job = self
            .jobs
            .iter_mut()
            .find(|job| job.id == job_id)
            .ok_or(ClientError::JobNotFound(job_id))?;
        job.clear_notifications(role);
        Ok(())
    }

    // ==================== USER / FORM ====================

    pub fn set_user(&mut self, user: User) {
        self.user = user;
    }

    pub fn open_job_form(&mut self, initial_job: Option<Job>) {
        self.form_data.dialog = true;
        self.form_data.initial_job = initial_job;
    }

    pub fn close_job_form(&mut self) {
        self.form_data.dialog = false;
    }

    // ==================== DERIVED ====================

    /// Number of jobs with unseen activity for the current user's role.
    pub fn notifications(&self) -> usize {
        let role = self.user.role();
        self.jobs.iter().filter(|job| job.notify_for(role)).count()
    }
}

/// Merge `patch` into the job with the same id, or prepend it as a new job.
fn merge_into(list: &mut Vec<Job>, patch: JobPatch) -> &Job {
    match list.iter().position(|job| job.id == patch.id) {
        Some(index) => {
            if !list[index].apply(patch) {
                debug!(job_id = list[index].id, "Stale job update, kept cached fields");
            }
            &list[index]
        }
        None => {
            list.insert(0, Job::from(patch));
            &list[0]
        }
    }
}
