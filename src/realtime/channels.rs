//! Broadcast channel naming.

use crate::models::{Role, User};

/// Event carrying `{ "message": Message }`.
pub const MESSAGE_EVENT: &str = "MessagePusherEvent";

/// Event carrying `{ "job": Job }`.
pub const JOB_EVENT: &str = "JobPusherEvent";

/// Owner id of the shared unassigned-jobs feed.
pub const UNASSIGNED_FEED_ID: i64 = 0;

/// What a subscribed channel carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Messages addressed to the user
    Messages,
    /// Changes to the user's own jobs
    Jobs,
    /// Shared feed of jobs without a technician
    UnassignedJobs,
}

impl ChannelKind {
    /// Short name of the event this channel carries.
    pub fn event_name(self) -> &'static str {
        match self {
            ChannelKind::Messages => MESSAGE_EVENT,
            ChannelKind::Jobs | ChannelKind::UnassignedJobs => JOB_EVENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub channel: String,
    pub kind: ChannelKind,
}

pub fn message_channel(user_id: i64) -> String {
    format!("message.channel.{}", user_id)
}

pub fn job_channel(user_id: i64) -> String {
    format!("job.channel.{}", user_id)
}

/// Channels a user listens on. Technicians also get the unassigned feed.
pub fn subscriptions_for(user: &User) -> Vec<Subscription> {
    let mut subscriptions = vec![
        Subscription {
            channel: message_channel(user.id),
            kind: ChannelKind::Messages,
        },
        Subscription {
            channel: job_channel(user.id),
            kind: ChannelKind::Jobs,
        },
    ];

    if user.role() == Role::Technician {
        subscriptions.push(Subscription {
            channel: job_channel(UNASSIGNED_FEED_ID),
            kind: ChannelKind::UnassignedJobs,
        });
    }

    subscriptions
}

/// Whether a wire event name refers to `event`.
///
/// Laravel broadcasts the fully qualified class name (`App\Events\JobPusherEvent`);
/// a leading `.` or `\` opts out of the namespace.
pub fn event_matches(wire_name: &str, event: &str, namespace: &str) -> bool {
    let wire_name = wire_name.trim_start_matches(['.', '\\']);
    if wire_name == event {
        return true;
    }

    let namespace = namespace.replace('.', "\\");
    wire_name
        .strip_prefix(namespace.trim_matches('\\'))
        .and_then(|rest| rest.strip_prefix('\\'))
        == Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(is_technician: bool) -> User {
        serde_json::from_value(json!({"id": 42, "is_technician": is_technician})).unwrap()
    }

    #[test]
    fn test_client_subscriptions() {
        let channels: Vec<String> = subscriptions_for(&user(false))
            .into_iter()
            .map(|s| s.channel)
            .collect();
        assert_eq!(channels, vec!["message.channel.42", "job.channel.42"]);
    }

    #[test]
    fn test_technician_gets_unassigned_feed() {
        let subscriptions = subscriptions_for(&user(true));
        assert_eq!(subscriptions.len(), 3);
        assert_eq!(subscriptions[2].channel, "job.channel.0");
        assert_eq!(subscriptions[2].kind, ChannelKind::UnassignedJobs);
        assert_eq!(subscriptions[2].kind.event_name(), JOB_EVENT);
        assert_eq!(subscriptions[0].kind.event_name(), MESSAGE_EVENT);
    }

    #[test]
    fn test_event_matches() {
        let ns = "App\\Events";
        assert!(event_matches("App\\Events\\JobPusherEvent", JOB_EVENT, ns));
        assert!(event_matches("JobPusherEvent", JOB_EVENT, ns));
        assert!(event_matches(".JobPusherEvent", JOB_EVENT, ns));
        assert!(event_matches("App\\Events\\JobPusherEvent", JOB_EVENT, "App.Events"));
        assert!(!event_matches("App\\Events\\MessagePusherEvent", JOB_EVENT, ns));
        assert!(!event_matches("Other\\JobPusherEvent", JOB_EVENT, ns));
    }
}
