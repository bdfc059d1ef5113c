//! WebSocket connection to the broker.
//!
//! The connection is opened once. When the socket closes the event channel
//! closes with it; there is no reconnection.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::channels::{subscriptions_for, Subscription};
use super::protocol::{
    self, connect_url, decode_event, ping_frame, pong_frame, subscribe_frame,
    ConnectionEstablished, Frame, ProtocolError, RealtimeEvent,
};
use crate::config::Config;
use crate::errors::{ClientError, Result};
use crate::models::User;

/// How long to wait for `pusher:connection_established`.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Keepalive interval when the broker announces no `activity_timeout`.
const DEFAULT_ACTIVITY_TIMEOUT: Duration = Duration::from_secs(120);

/// Capacity of the decoded event channel.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// A live broker connection and the events it produces.
pub struct RealtimeListener {
    socket_id: String,
    activity_timeout: Duration,
    subscriptions: Vec<Subscription>,
    events: mpsc::Receiver<RealtimeEvent>,
    task: JoinHandle<()>,
}

impl RealtimeListener {
    /// Connect, wait for the handshake and subscribe to the user's channels.
    pub async fn connect(config: &Config, user: &User) -> Result<Self> {
        let url = connect_url(&config.ws_url, &config.app_key);
        info!("Connecting to broker at {}", config.ws_url);

        let (mut socket, _) = connect_async(url.as_str()).await?;

        let established = tokio::time::timeout(HANDSHAKE_TIMEOUT, await_established(&mut socket))
            .await
            .map_err(|_| ClientError::realtime("Timed out waiting for connection handshake"))??;
        let activity_timeout = established.activity_timeout_or(DEFAULT_ACTIVITY_TIMEOUT);
        info!(
            socket_id = %established.socket_id,
            activity_timeout_secs = activity_timeout.as_secs(),
            "Broker connection established"
        );

        let subscriptions = subscriptions_for(user);
        for subscription in &subscriptions {
            debug!(channel = %subscription.channel, "Subscribing");
            socket
                .send(WsMessage::Text(subscribe_frame(&subscription.channel).into()))
                .await?;
        }

        let (tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let task = tokio::spawn(read_loop(
            socket,
            subscriptions.clone(),
            config.event_namespace.clone(),
            activity_timeout,
            tx,
        ));

        Ok(Self {
            socket_id: established.socket_id,
            activity_timeout,
            subscriptions,
            events,
            task,
        })
    }

    pub fn socket_id(&self) -> &str {
        &self.socket_id
    }

    /// Silence after which the listener pings the broker.
    pub fn activity_timeout(&self) -> Duration {
        self.activity_timeout
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Whether the socket is still being read.
    pub fn is_connected(&self) -> bool {
        !self.task.is_finished()
    }

    /// Next decoded event; `None` once the connection is gone.
    pub async fn next_event(&mut self) -> Option<RealtimeEvent> {
        self.events.recv().await
    }

    /// Hand the event stream to a dispatcher, keeping the reader task running.
    pub fn into_events(self) -> mpsc::Receiver<RealtimeEvent> {
        self.events
    }
}

/// Read frames until the broker confirms the connection.
async fn await_established(socket: &mut Socket) -> Result<ConnectionEstablished> {
    while let Some(message) = socket.next().await {
        let WsMessage::Text(text) = message? else {
            continue;
        };
        let frame = Frame::parse(text.as_str())?;

        match frame.event.as_str() {
            protocol::CONNECTION_ESTABLISHED => return frame.data(),
            protocol::ERROR => {
                let error: ProtocolError = frame.data()?;
                return Err(ClientError::realtime(format!(
                    "Broker refused connection ({}): {}",
                    error.code.unwrap_or_default(),
                    error.message.unwrap_or_default()
                )));
            }
            other => debug!("Ignoring '{}' before handshake", other),
        }
    }
    Err(ClientError::realtime("Connection closed during handshake"))
}

/// Decode frames and forward application events until the socket closes or
/// nobody is listening any more.
///
/// After `activity_timeout` without inbound frames the broker is pinged; a
/// second quiet period without any reply drops the connection.
async fn read_loop(
    socket: Socket,
    subscriptions: Vec<Subscription>,
    namespace: String,
    activity_timeout: Duration,
    tx: mpsc::Sender<RealtimeEvent>,
) {
    let (mut sink, mut stream) = socket.split();
    let idle = tokio::time::sleep(activity_timeout);
    tokio::pin!(idle);
    let mut awaiting_pong = false;

    loop {
        let message = tokio::select! {
            message = stream.next() => message,
            _ = &mut idle => {
                if awaiting_pong {
                    warn!("Broker silent for {:?} after ping, dropping connection", activity_timeout);
                    break;
                }
                debug!("Connection idle, pinging broker");
                if let Err(e) = sink.send(WsMessage::Text(ping_frame().into())).await {
                    warn!("Failed to ping broker: {}", e);
                    break;
                }
                awaiting_pong = true;
                idle.as_mut().reset(Instant::now() + activity_timeout);
                continue;
            }
        };
        let Some(message) = message else {
            break;
        };
        idle.as_mut().reset(Instant::now() + activity_timeout);
        awaiting_pong = false;

        let text = match message {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Close(frame)) => {
                info!("Broker closed the connection: {:?}", frame);
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!("WebSocket read failed: {}", e);
                break;
            }
        };

        let frame = match Frame::parse(text.as_str()) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Unparseable broker frame: {} ({})", text.as_str(), e);
                continue;
            }
        };

        match frame.event.as_str() {
            protocol::PING => {
                if let Err(e) = sink.send(WsMessage::Text(pong_frame().into())).await {
                    warn!("Failed to answer ping: {}", e);
                    break;
                }
            }
            protocol::PONG => debug!("Broker answered ping"),
            protocol::SUBSCRIPTION_SUCCEEDED => {
                debug!(channel = ?frame.channel, "Subscription succeeded");
            }
            protocol::ERROR => match frame.data::<ProtocolError>() {
                Ok(error) => warn!(code = ?error.code, "Broker error: {:?}", error.message),
                Err(_) => warn!("Broker error without payload"),
            },
            _ => match decode_event(&frame, &subscriptions, &namespace) {
                Ok(Some(event)) => {
                    if tx.send(event).await.is_err() {
                        debug!("Event receiver dropped, stopping listener");
                        break;
                    }
                }
                Ok(None) => debug!(event = %frame.event, "Ignoring frame"),
                Err(e) => error!(event = %frame.event, "Failed to decode event: {}", e),
            },
        }
    }

    info!("Realtime listener stopped");
}
