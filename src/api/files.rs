//! File endpoints.

use reqwest::multipart::Form;

use super::{attach_files, ApiClient};
use crate::errors::Result;
use crate::models::{JobPatch, OneOrMany, UploadFile};

impl ApiClient {
    /// POST /api/file/store - Attach files to an existing job.
    pub async fn store_files(
        &self,
        job_id: i64,
        files: Vec<UploadFile>,
    ) -> Result<OneOrMany<JobPatch>> {
        let form = attach_files(Form::new().text("job_id", job_id.to_string()), files)?;

        let response = self
            .client
            .post(self.url("/file/store"))
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// GET /api/file/download/{id} - Raw file contents.
    pub async fn download_file(&self, id: i64) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.url(&format!("/file/download/{}", id)))
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
