//! JobTrack sync daemon
//!
//! Loads the signed-in user, mirrors their jobs and keeps them current from
//! the realtime broker until interrupted.

use jobtrack_client::actions;
use jobtrack_client::config::{Config, LogFormat};
use jobtrack_client::realtime::{run_dispatcher, RealtimeListener};
use jobtrack_client::{ApiClient, Store, StoreChange};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting JobTrack sync");
    tracing::info!("API: {}", config.api_url);
    tracing::info!("Broker: {}", config.ws_url);

    if config.api_token.is_none() {
        tracing::warn!("No API token configured (JOBTRACK_API_TOKEN). Requests are anonymous!");
    }

    let api = ApiClient::new(&config)?;

    // The page-embedded user is optional here; fall back to asking the API
    let user = match config.initial_user.clone() {
        Some(user) => user,
        None => api.retrieve_user().await?,
    };
    tracing::info!(user_id = user.id, role = ?user.role(), "Signed in");

    let store = Store::new(user.clone());

    actions::retrieve_jobs(&api, &store).await?;
    if user.is_technician {
        actions::retrieve_unassigned_jobs(&api, &store).await?;
    }

    let listener = RealtimeListener::connect(&config, &user).await?;
    tracing::info!(
        socket_id = listener.socket_id(),
        channels = listener.subscriptions().len(),
        "Listening for updates"
    );
    let mut dispatcher = tokio::spawn(run_dispatcher(store.clone(), listener.into_events()));

    let mut changes = store.subscribe();
    let mut last_notifications = store.notifications();
    tracing::info!(
        jobs = store.jobs().len(),
        unassigned = store.unassigned_jobs().len(),
        notifications = last_notifications,
        "Initial state loaded"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
            _ = &mut dispatcher => {
                tracing::warn!("Realtime connection lost; no further updates will arrive");
                break;
            }
            change = changes.recv() => match change {
                Ok(StoreChange::Jobs) => {
                    let notifications = store.notifications();
                    if notifications != last_notifications {
                        tracing::info!(notifications, "Unseen activity changed");
                        last_notifications = notifications;
                    }
                }
                Ok(StoreChange::UnassignedJobs) => {
                    tracing::debug!(unassigned = store.unassigned_jobs().len(), "Unassigned jobs changed");
                }
                Ok(change) => tracing::debug!("State changed: {:?}", change),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Change feed lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}
