//! Niri IPC event stream implementation
//!
//! This module provides the `NiriEventStream` for subscribing to compositor
//! notifications. Unlike `NiriClient`, which uses request/reply, the event
//! stream is a one-way connection that continuously receives notifications.
//!
//! ## Protocol
//!
//! 1. Connect to the niri socket (separate connection from any `NiriClient`)
//! 2. Send `Request::EventStream` as JSON + newline
//! 3. Receive the initial `Ok(Handled)` reply
//! 4. Receive one notification per line until niri closes the connection
//!
//! ## Architecture
//!
//! ```text
//! +-----------------+      +--------+      +------------+
//! | NiriEventStream | ---> | mpsc   | ---> | Dispatcher |
//! | (reader task)   |      | channel|      |            |
//! +-----------------+      +--------+      +------------+
//! ```
//!
//! The reader task decodes lines through the [`EventRegistry`] and forwards
//! notifications in arrival order. Lines that fail to decode are logged and
//! skipped. The task ends when niri closes the stream, which closes the
//! channel and lets the consumer finish.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedReadHalf;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use super::client::{get_socket_path, open_socket};
use super::notification::{EventRegistry, Notification};
use super::NiriError;

/// Default capacity of the notification channel
pub const DEFAULT_CHANNEL_BUFFER: usize = 64;

/// Lines shorter than this carry no notification
const MIN_LINE_LEN: usize = 2;

/// Stream of decoded notifications fed by the reader task
pub type NotificationStream = ReceiverStream<Notification>;

/// Handle for the spawned reader task
///
/// Resolves to `Ok(())` when niri closed the stream or the consumer went away.
pub type EventReaderHandle = tokio::task::JoinHandle<Result<(), NiriError>>;

/// Subscription to niri's event stream
pub struct NiriEventStream {
    reader: BufReader<OwnedReadHalf>,
    socket_path: PathBuf,
}

impl NiriEventStream {
    /// Connect to the socket named by `$NIRI_SOCKET` and subscribe
    ///
    /// # Errors
    ///
    /// Returns `NiriError::SocketNotSet` if `$NIRI_SOCKET` is not set.
    /// Returns `NiriError::SocketNotFound` if the socket path doesn't exist.
    /// Returns any error from [`connect_to`](Self::connect_to).
    pub async fn connect() -> Result<Self, NiriError> {
        Self::connect_to(&get_socket_path()?).await
    }

    /// Connect to a niri socket at an explicit path and subscribe
    ///
    /// # Errors
    ///
    /// Returns `NiriError::ConnectionFailed` if the connection fails.
    /// Returns `NiriError::SendFailed` if sending the request fails.
    /// Returns `NiriError::ReceiveFailed` or `NiriError::ConnectionClosed` if
    /// the handshake reply can't be read.
    /// Returns `NiriError::NiriError` if niri refuses the subscription.
    pub async fn connect_to(path: &Path) -> Result<Self, NiriError> {
        let socket = open_socket(path).await?;
        let (read_half, mut write_half) = socket.into_split();

        let mut request = serde_json::to_string(&niri_ipc::Request::EventStream)
            .map_err(NiriError::SerializeFailed)?;
        request.push('\n');
        write_half
            .write_all(request.as_bytes())
            .await
            .map_err(NiriError::SendFailed)?;
        write_half.flush().await.map_err(NiriError::SendFailed)?;

        let mut reader = BufReader::new(read_half);
        let mut reply_line = String::new();
        let bytes_read = reader
            .read_line(&mut reply_line)
            .await
            .map_err(NiriError::ReceiveFailed)?;
        if bytes_read == 0 {
            return Err(NiriError::ConnectionClosed);
        }

        let reply: niri_ipc::Reply =
            serde_json::from_str(&reply_line).map_err(NiriError::DeserializeFailed)?;
        match reply {
            Ok(niri_ipc::Response::Handled) => {}
            Ok(_) => {
                return Err(NiriError::UnexpectedResponse {
                    request: "EventStream",
                })
            }
            Err(message) => return Err(NiriError::NiriError { message }),
        }

        // Dropping the write half shuts down our side only; niri keeps writing.
        info!(path = %path.display(), "Subscribed to niri event stream");

        Ok(Self {
            reader,
            socket_path: path.to_path_buf(),
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Read the next raw line, without its trailing newline
    ///
    /// Returns `NiriError::ConnectionClosed` at EOF and
    /// `NiriError::InvalidUtf8` for a line that isn't UTF-8; the stream stays
    /// usable after the latter.
    pub async fn next_line(&mut self) -> Result<String, NiriError> {
        let mut buf = Vec::new();
        let bytes_read = self
            .reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(NiriError::ReceiveFailed)?;

        if bytes_read == 0 {
            return Err(NiriError::ConnectionClosed);
        }

        let mut line = String::from_utf8(buf).map_err(NiriError::InvalidUtf8)?;
        let trimmed_len = line.trim_end().len();
        line.truncate(trimmed_len);
        Ok(line)
    }

    /// Read lines until one decodes to a known notification
    ///
    /// Short lines and unknown names are skipped. A line that isn't UTF-8 or
    /// fails to decode is returned as an error; the stream stays usable
    /// afterwards.
    pub async fn next_notification(
        &mut self,
        registry: &EventRegistry,
    ) -> Result<Notification, NiriError> {
        loop {
            let line = self.next_line().await?;
            if line.len() < MIN_LINE_LEN {
                continue;
            }
            if let Some(notification) = registry.decode_line(&line)? {
                return Ok(notification);
            }
        }
    }
}

/// Forwards notifications from a [`NiriEventStream`] into a channel
pub struct NiriEventReader {
    sender: mpsc::Sender<Notification>,
    registry: Arc<EventRegistry>,
}

impl NiriEventReader {
    /// Create a reader and the stream it feeds
    pub fn new(registry: Arc<EventRegistry>, buffer_size: usize) -> (Self, NotificationStream) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (Self { sender, registry }, ReceiverStream::new(receiver))
    }

    /// Spawn the reader task on an already subscribed stream
    pub fn spawn(self, stream: NiriEventStream) -> EventReaderHandle {
        tokio::spawn(async move { self.run(stream).await })
    }

    async fn run(self, mut stream: NiriEventStream) -> Result<(), NiriError> {
        loop {
            let notification = match stream.next_notification(&self.registry).await {
                Ok(notification) => notification,
                Err(NiriError::ConnectionClosed) => {
                    info!("Niri closed the event stream");
                    return Ok(());
                }
                Err(e) if e.is_decode_error() => {
                    warn!(error = %e, "Skipping undecodable notification");
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "Niri event stream error");
                    return Err(e);
                }
            };

            debug!(name = notification.name(), "Received notification");
            if self.sender.send(notification).await.is_err() {
                debug!("Notification receiver dropped, shutting down event reader");
                return Ok(());
            }
        }
    }
}
