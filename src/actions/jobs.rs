//! Job actions.

use tracing::info;

use crate::api::ApiClient;
use crate::errors::Result;
use crate::models::{NewJob, UploadFile};
use crate::store::Store;

/// Replace the job list with the current user's jobs.
pub async fn retrieve_jobs(api: &ApiClient, store: &Store) -> Result<()> {
    let user_id = store.user().id;
    let jobs = api.list_jobs(user_id).await?;
    info!(user_id, count = jobs.len(), "Retrieved jobs");
    store.set_jobs(jobs);
    Ok(())
}

/// Replace the unassigned list. Meant for technicians.
pub async fn retrieve_unassigned_jobs(api: &ApiClient, store: &Store) -> Result<()> {
    let jobs = api.list_unassigned_jobs().await?;
    info!(count = jobs.len(), "Retrieved unassigned jobs");
    store.set_unassigned_jobs(jobs);
    Ok(())
}

/// Create a job with its attachments and merge the result.
pub async fn store_job(
    api: &ApiClient,
    store: &Store,
    job: &NewJob,
    files: Vec<UploadFile>,
) -> Result<()> {
    let created = api.store_job(job, files).await?;
    store.add_or_update_jobs(created.into_vec());
    Ok(())
}

pub async fn update_job_status(api: &ApiClient, store: &Store, id: i64, status: &str) -> Result<()> {
    let updated = api.update_job_status(id, status).await?;
    store.add_or_update_jobs(updated.into_vec());
    Ok(())
}

/// Clear the job's notify flag server side and merge the result.
pub async fn update_job_notify(api: &ApiClient, store: &Store, id: i64) -> Result<()> {
    let updated = api.update_job_notify(id).await?;
    store.add_or_update_jobs(updated.into_vec());
    Ok(())
}

/// Assign a batch of jobs to the signed-in technician.
pub async fn assign_jobs(api: &ApiClient, store: &Store, ids: &[i64]) -> Result<()> {
    let assigned = api.assign_jobs(ids).await?;
    store.add_or_update_jobs(assigned.into_vec());
    Ok(())
}

/// Soft-delete a job and drop it from the cache.
pub async fn terminate_job(
    api: &ApiClient,
    store: &Store,
    id: i64,
    rating: Option<u8>,
) -> Result<()> {
    let terminated = api.terminate_job(id, rating).await?;
    store.remove_job(terminated.id);
    Ok(())
}

/// Locally clear unseen markers on a job. Pair with [`update_job_notify`]
/// to persist the change.
pub fn clear_all_notify(store: &Store, job_id: i64) -> Result<()> {
    store.clear_all_notify(job_id)
}
