//! Pusher wire protocol (version 7), as served by laravel-websockets.
//!
//! Every frame is a JSON object `{event, channel?, data?}`. Application
//! events carry `data` as a JSON-encoded string; protocol events may send
//! an object instead.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::channels::{event_matches, ChannelKind, Subscription};
use crate::errors::{ClientError, Result};
use crate::models::{JobPatch, Message};

pub const PROTOCOL_VERSION: u8 = 7;

pub const CONNECTION_ESTABLISHED: &str = "pusher:connection_established";
pub const SUBSCRIBE: &str = "pusher:subscribe";
pub const SUBSCRIPTION_SUCCEEDED: &str = "pusher_internal:subscription_succeeded";
pub const PING: &str = "pusher:ping";
pub const PONG: &str = "pusher:pong";
pub const ERROR: &str = "pusher:error";

/// A single protocol frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Frame {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode `data`, unwrapping the string encoding when present.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.data {
            Some(Value::String(encoded)) => Ok(serde_json::from_str(encoded)?),
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Err(ClientError::realtime(format!(
                "Frame '{}' has no data",
                self.event
            ))),
        }
    }
}

/// Payload of `pusher:connection_established`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionEstablished {
    pub socket_id: String,
    #[serde(default)]
    pub activity_timeout: Option<u64>,
}

impl ConnectionEstablished {
    /// Seconds of silence after which the client should ping. Falls back to
    /// `default` when the broker does not announce one; never below a second.
    pub fn activity_timeout_or(&self, default: Duration) -> Duration {
        self.activity_timeout
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or(default)
    }
}

/// Payload of `pusher:error`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct JobPayload {
    job: JobPatch,
}

/// Which feed a job event arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFeed {
    /// The user's own job channel
    Own,
    /// The shared unassigned-jobs channel
    Unassigned,
}

/// An application event decoded from the broker.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    Message(Message),
    Job { feed: JobFeed, job: JobPatch },
}

/// URL of the broker's application endpoint.
pub fn connect_url(ws_url: &str, app_key: &str) -> String {
    format!(
        "{}/app/{}?protocol={}&client=jobtrack-rust&version={}&flash=false",
        ws_url.trim_end_matches('/'),
        app_key,
        PROTOCOL_VERSION,
        env!("CARGO_PKG_VERSION")
    )
}

pub fn subscribe_frame(channel: &str) -> String {
    json!({"event": SUBSCRIBE, "data": {"channel": channel}}).to_string()
}

pub fn pong_frame() -> String {
    json!({"event": PONG, "data": {}}).to_string()
}

/// Client keepalive, sent after a quiet `activity_timeout`.
pub fn ping_frame() -> String {
    json!({"event": PING, "data": {}}).to_string()
}

/// Map a frame to an application event.
///
/// Returns `Ok(None)` for frames on channels we did not subscribe to and for
/// events those channels do not carry.
pub fn decode_event(
    frame: &Frame,
    subscriptions: &[Subscription],
    namespace: &str,
) -> Result<Option<RealtimeEvent>> {
    let Some(channel) = frame.channel.as_deref() else {
        return Ok(None);
    };
    let Some(subscription) = subscriptions.iter().find(|s| s.channel == channel) else {
        return Ok(None);
    };
    if !event_matches(&frame.event, subscription.kind.event_name(), namespace) {
        return Ok(None);
    }

    let event = match subscription.kind {
        ChannelKind::Messages => RealtimeEvent::Message(frame.data::<MessagePayload>()?.message),
        ChannelKind::Jobs => RealtimeEvent::Job {
            feed: JobFeed::Own,
            job: frame.data::<JobPayload>()?.job,
        },
        ChannelKind::UnassignedJobs => RealtimeEvent::Job {
            feed: JobFeed::Unassigned,
            job: frame.data::<JobPayload>()?.job,
        },
    };
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::channels::{job_channel, message_channel};

    const NS: &str = "App\\Events";

    fn subscriptions() -> Vec<Subscription> {
        vec![
            Subscription {
                channel: message_channel(3),
                kind: ChannelKind::Messages,
            },
            Subscription {
                channel: job_channel(3),
                kind: ChannelKind::Jobs,
            },
            Subscription {
                channel: job_channel(0),
                kind: ChannelKind::UnassignedJobs,
            },
        ]
    }

    fn app_frame(event: &str, channel: &str, payload: Value) -> Frame {
        Frame {
            event: event.to_string(),
            channel: Some(channel.to_string()),
            data: Some(Value::String(payload.to_string())),
        }
    }

    #[test]
    fn test_decode_message_event() {
        let frame = app_frame(
            "App\\Events\\MessagePusherEvent",
            "message.channel.3",
            json!({"message": {"id": 1, "job_id": 9, "recipient_id": 3, "text": "hi"}}),
        );

        let event = decode_event(&frame, &subscriptions(), NS).unwrap().unwrap();
        let RealtimeEvent::Message(message) = event else {
            panic!("expected message event");
        };
        assert_eq!(message.job_id, 9);
        assert_eq!(message.text, "hi");
    }

    #[test]
    fn test_decode_job_events_by_feed() {
        let own = app_frame(
            "App\\Events\\JobPusherEvent",
            "job.channel.3",
            json!({"job": {"id": 4, "terminated": true}}),
        );
        let shared = app_frame(
            "App\\Events\\JobPusherEvent",
            "job.channel.0",
            json!({"job": {"id": 5, "technician_id": null}}),
        );

        match decode_event(&own, &subscriptions(), NS).unwrap() {
            Some(RealtimeEvent::Job { feed, job }) => {
                assert_eq!(feed, JobFeed::Own);
                assert!(job.is_terminated());
            }
            other => panic!("unexpected {:?}", other),
        }
        match decode_event(&shared, &subscriptions(), NS).unwrap() {
            Some(RealtimeEvent::Job { feed, job }) => {
                assert_eq!(feed, JobFeed::Unassigned);
                assert_eq!(job.technician_id, Some(None));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_ignores_foreign_frames() {
        let wrong_event = app_frame("App\\Events\\JobPusherEvent", "message.channel.3", json!({}));
        let unknown_channel = app_frame("App\\Events\\JobPusherEvent", "job.channel.8", json!({}));
        let protocol = Frame::parse(r#"{"event":"pusher:ping","data":{}}"#).unwrap();

        for frame in [wrong_event, unknown_channel, protocol] {
            assert!(decode_event(&frame, &subscriptions(), NS).unwrap().is_none());
        }
    }

    #[test]
    fn test_decode_malformed_payload() {
        let frame = app_frame("JobPusherEvent", "job.channel.3", json!({"nope": 1}));
        assert!(decode_event(&frame, &subscriptions(), NS).is_err());
    }

    #[test]
    fn test_connection_established_object_or_string() {
        let encoded = Frame::parse(
            r#"{"event":"pusher:connection_established","data":"{\"socket_id\":\"1.2\",\"activity_timeout\":30}"}"#,
        )
        .unwrap();
        let established: ConnectionEstablished = encoded.data().unwrap();
        assert_eq!(established.socket_id, "1.2");
        assert_eq!(established.activity_timeout, Some(30));
        assert_eq!(
            established.activity_timeout_or(Duration::from_secs(120)),
            Duration::from_secs(30)
        );

        let object = Frame::parse(r#"{"event":"pusher:error","data":{"message":"Over quota","code":4004}}"#)
            .unwrap();
        let error: ProtocolError = object.data().unwrap();
        assert_eq!(error.code, Some(4004));

        let silent: ConnectionEstablished =
            serde_json::from_str(r#"{"socket_id":"1.3","activity_timeout":0}"#).unwrap();
        assert_eq!(silent.activity_timeout_or(Duration::from_secs(120)), Duration::from_secs(1));
        let bare: ConnectionEstablished = serde_json::from_str(r#"{"socket_id":"1.4"}"#).unwrap();
        assert_eq!(bare.activity_timeout_or(Duration::from_secs(120)), Duration::from_secs(120));
    }

    #[test]
    fn test_connect_url_and_frames() {
        let url = connect_url("ws://localhost:6001/", "key");
        assert!(url.starts_with("ws://localhost:6001/app/key?protocol=7&"));

        let subscribe: Value = serde_json::from_str(&subscribe_frame("job.channel.0")).unwrap();
        assert_eq!(subscribe["event"], SUBSCRIBE);
        assert_eq!(subscribe["data"]["channel"], "job.channel.0");

        let pong: Value = serde_json::from_str(&pong_frame()).unwrap();
        assert_eq!(pong["event"], PONG);

        let ping: Value = serde_json::from_str(&ping_frame()).unwrap();
        assert_eq!(ping["event"], PING);
    }
}
