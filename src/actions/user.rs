//! User actions.

use tracing::info;

use crate::api::ApiClient;
use crate::errors::Result;
use crate::models::SettingField;
use crate::store::Store;

/// End the server session. Local state is left as is.
pub async fn logout(api: &ApiClient) -> Result<()> {
    api.logout().await?;
    info!("Logged out");
    Ok(())
}

pub async fn update_settings(
    api: &ApiClient,
    store: &Store,
    fields: Vec<SettingField>,
) -> Result<()> {
    let user = api.update_settings(fields).await?;
    store.set_user(user);
    Ok(())
}

pub async fn retrieve_user(api: &ApiClient, store: &Store) -> Result<()> {
    let user = api.retrieve_user().await?;
    store.set_user(user);
    Ok(())
}
