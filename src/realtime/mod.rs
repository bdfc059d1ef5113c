//! Real-time sync over the broker.
//!
//! [`RealtimeListener`] owns the WebSocket and turns broker frames into
//! [`RealtimeEvent`]s on a channel; [`run_dispatcher`] drains that channel
//! into the store.

mod channels;
mod dispatcher;
mod listener;
mod protocol;

pub use channels::*;
pub use dispatcher::*;
pub use listener::*;
pub use protocol::{
    connect_url, decode_event, Frame, JobFeed, RealtimeEvent, PROTOCOL_VERSION,
};
