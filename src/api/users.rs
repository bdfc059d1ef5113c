//! User endpoints.

use super::ApiClient;
use crate::errors::Result;
use crate::models::{SettingField, UpdateSettingsRequest, User};

impl ApiClient {
    /// POST /api/user/logout
    pub async fn logout(&self) -> Result<()> {
        let response = self.client.post(self.url("/user/logout")).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// POST /api/user/update-settings
    pub async fn update_settings(&self, fields: Vec<SettingField>) -> Result<User> {
        let response = self
            .client
            .post(self.url("/user/update-settings"))
            .json(&UpdateSettingsRequest { fields })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// GET /api/user/retrieve
    pub async fn retrieve_user(&self) -> Result<User> {
        let response = self.client.get(self.url("/user/retrieve")).send().await?;
        Self::parse_response(response).await
    }
}
