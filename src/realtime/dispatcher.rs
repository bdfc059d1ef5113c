//! Maps realtime events to store commits.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::protocol::{JobFeed, RealtimeEvent};
use crate::errors::Result;
use crate::store::Store;

/// Commit one event into the store.
pub fn dispatch(store: &Store, event: RealtimeEvent) -> Result<()> {
    match event {
        RealtimeEvent::Message(message) => store.add_message(message)?,
        RealtimeEvent::Job {
            feed: JobFeed::Own,
            job,
        } => {
            if job.is_terminated() {
                store.remove_job(job.id);
            } else {
                store.add_or_update_job(job);
            }
        }
        RealtimeEvent::Job {
            feed: JobFeed::Unassigned,
            job,
        } => {
            if job.is_terminated() {
                store.remove_unassigned_job(job.id);
            } else {
                store.add_or_remove_unassigned_job(job);
            }
        }
    }
    Ok(())
}

/// Drain `events` into the store until the channel closes.
///
/// Events that fail to commit are logged and dropped.
pub async fn run_dispatcher(store: Store, mut events: mpsc::Receiver<RealtimeEvent>) {
    while let Some(event) = events.recv().await {
        debug!("Dispatching {:?}", event);
        if let Err(e) = dispatch(&store, event) {
            warn!(code = e.error_code(), "Dropped realtime event: {}", e);
        }
    }
    info!("Realtime event channel closed, dispatcher stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobPatch, Message};
    use serde_json::json;

    fn technician_store() -> Store {
        Store::new(serde_json::from_value(json!({"id": 3, "is_technician": true})).unwrap())
    }

    fn patch(value: serde_json::Value) -> JobPatch {
        serde_json::from_value(value).unwrap()
    }

    fn own(job: JobPatch) -> RealtimeEvent {
        RealtimeEvent::Job {
            feed: JobFeed::Own,
            job,
        }
    }

    fn shared(job: JobPatch) -> RealtimeEvent {
        RealtimeEvent::Job {
            feed: JobFeed::Unassigned,
            job,
        }
    }

    #[test]
    fn test_own_job_events() {
        let store = technician_store();

        dispatch(&store, own(patch(json!({"id": 1, "technician_id": 3})))).unwrap();
        assert_eq!(store.jobs().len(), 1);

        dispatch(&store, own(patch(json!({"id": 1, "terminated": true})))).unwrap();
        assert!(store.jobs().is_empty());
    }

    #[test]
    fn test_shared_feed_only_touches_unassigned_list() {
        let store = technician_store();

        dispatch(&store, shared(patch(json!({"id": 6, "technician_id": null})))).unwrap();
        assert_eq!(store.unassigned_jobs().len(), 1);
        assert!(store.jobs().is_empty());

        dispatch(&store, shared(patch(json!({"id": 6, "technician_id": null, "terminated": true}))))
            .unwrap();
        assert!(store.unassigned_jobs().is_empty());
    }

    #[test]
    fn test_message_event_flags_job() {
        let store = technician_store();
        store.add_or_update_job(patch(json!({"id": 2, "technician_id": 3})));

        let message: Message = serde_json::from_value(
            json!({"id": 1, "job_id": 2, "sender_id": 8, "recipient_id": 3, "text": "ping"}),
        )
        .unwrap();
        dispatch(&store, RealtimeEvent::Message(message)).unwrap();

        assert_eq!(store.notifications(), 1);
        assert_eq!(store.job(2).unwrap().messages.len(), 1);
    }

    #[tokio::test]
    async fn test_run_dispatcher_survives_bad_events() {
        let store = technician_store();
        let (tx, rx) = mpsc::channel(8);

        let orphan: Message =
            serde_json::from_value(json!({"id": 1, "job_id": 404, "text": "lost"})).unwrap();
        tx.send(RealtimeEvent::Message(orphan)).await.unwrap();
        tx.send(own(patch(json!({"id": 7, "technician_id": 3})))).await.unwrap();
        drop(tx);

        run_dispatcher(store.clone(), rx).await;

        assert_eq!(store.jobs().len(), 1);
        assert_eq!(store.jobs()[0].id, 7);
    }
}
