//! Niri IPC plumbing
//!
//! Niri exposes a Unix socket at `$NIRI_SOCKET`. Clients send JSON-formatted
//! `Request` messages (one per line) and receive JSON `Reply` responses.
//!
//! - `NiriClient`: request/reply connection for queries
//! - `SocketPool`: reusable connections for sending actions
//! - `NiriEventStream` / `NiriEventReader`: the notification subscription
//! - `EventRegistry`: decodes notification lines into `Notification`s

mod client;
mod error;
mod events;
mod notification;
mod pool;
mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{get_socket_path, NiriClient};
pub use error::NiriError;
pub use events::{
    EventReaderHandle, NiriEventReader, NiriEventStream, NotificationStream,
    DEFAULT_CHANNEL_BUFFER,
};
pub use notification::*;
pub use pool::{ActionSink, PooledClient, SocketPool, DEFAULT_MAX_IDLE};
pub use types::{KeyboardLayouts, Output, Timestamp, Window, WindowLayout, Workspace};

#[cfg(test)]
pub(crate) use types::fixtures;
