//! Job endpoints.

use reqwest::multipart::Form;
use tracing::debug;

use super::{attach_files, ApiClient};
use crate::errors::Result;
use crate::models::{
    AssignRequest, Job, JobIdRequest, JobPatch, NewJob, OneOrMany, TerminateRequest,
    UpdateStatusRequest, UploadFile,
};

/// Path segment the API uses for "no technician".
pub const UNASSIGNED_OWNER_ID: i64 = 0;

impl ApiClient {
    /// GET /api/jobs/{userId} - All jobs of a user, with timeline and files.
    pub async fn list_jobs(&self, user_id: i64) -> Result<Vec<Job>> {
        let response = self
            .client
            .get(self.url(&format!("/jobs/{}", user_id)))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// GET /api/jobs/0 - Jobs with no technician assigned.
    pub async fn list_unassigned_jobs(&self) -> Result<Vec<Job>> {
        self.list_jobs(UNASSIGNED_OWNER_ID).await
    }

    /// POST /api/job/store - Create a job, optionally with attachments.
    pub async fn store_job(
        &self,
        job: &NewJob,
        files: Vec<UploadFile>,
    ) -> Result<OneOrMany<JobPatch>> {
        debug!(client_id = job.client_id, files = files.len(), "Storing job");

        let form = Form::new()
            .text("client_id", job.client_id.to_string())
            .text("job_type", job.job_type.clone())
            .text("deadline", job.deadline_json())
            .text("description", job.description.clone());
        let form = attach_files(form, files)?;

        let response = self
            .client
            .post(self.url("/job/store"))
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// POST /api/job/update-status
    pub async fn update_job_status(&self, id: i64, status: &str) -> Result<OneOrMany<JobPatch>> {
        let body = UpdateStatusRequest {
            id,
            status: status.to_string(),
        };

        let response = self
            .client
            .post(self.url("/job/update-status"))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// POST /api/job/update-notify - Mark the job as seen server side.
    pub async fn update_job_notify(&self, id: i64) -> Result<OneOrMany<JobPatch>> {
        let response = self
            .client
            .post(self.url("/job/update-notify"))
            .json(&JobIdRequest { id })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// POST /api/job/assign - Assign jobs to the signed-in technician.
    pub async fn assign_jobs(&self, ids: &[i64]) -> Result<OneOrMany<JobPatch>> {
        let body = AssignRequest {
            id_array: ids.to_vec(),
        };

        let response = self
            .client
            .post(self.url("/job/assign"))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// POST /api/job/terminate - Soft-delete a job, with an optional rating.
    pub async fn terminate_job(&self, id: i64, rating: Option<u8>) -> Result<JobPatch> {
        let response = self
            .client
            .post(self.url("/job/terminate"))
            .json(&TerminateRequest { id, rating })
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
