//! Message actions.

use crate::api::ApiClient;
use crate::errors::Result;
use crate::store::Store;

/// Post a message on a job and append the stored message locally.
pub async fn send_message(api: &ApiClient, store: &Store, job_id: i64, text: &str) -> Result<()> {
    let message = api.store_message(job_id, text).await?;
    store.add_message(message)
}
