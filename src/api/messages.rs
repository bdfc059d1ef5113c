//! Message endpoints.

use super::ApiClient;
use crate::errors::Result;
use crate::models::{Message, StoreMessageRequest};

impl ApiClient {
    /// POST /api/message/store
    pub async fn store_message(&self, job_id: i64, text: &str) -> Result<Message> {
        let body = StoreMessageRequest {
            job_id,
            text: text.to_string(),
        };

        let response = self
            .client
            .post(self.url("/message/store"))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
