//! File actions.

use crate::api::ApiClient;
use crate::errors::Result;
use crate::models::UploadFile;
use crate::store::Store;

/// Attach files to an existing job and merge the returned job.
pub async fn store_files(
    api: &ApiClient,
    store: &Store,
    job_id: i64,
    files: Vec<UploadFile>,
) -> Result<()> {
    let updated = api.store_files(job_id, files).await?;
    store.add_or_update_jobs(updated.into_vec());
    Ok(())
}

/// Download a stored file. The store is not touched.
pub async fn download_file(api: &ApiClient, id: i64) -> Result<Vec<u8>> {
    api.download_file(id).await
}
