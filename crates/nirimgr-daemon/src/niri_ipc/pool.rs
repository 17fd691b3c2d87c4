//! Connection pool for sending actions to niri
//!
//! Actions are fire-and-forget from the engine's point of view, but every
//! request still needs its own reply line, so a connection is busy until the
//! reply arrives. The pool hands out idle connections, opens new ones when
//! none is free, and drops connections whose transport failed.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use super::client::{get_socket_path, NiriClient};
use super::NiriError;

/// Idle connections kept around by default
pub const DEFAULT_MAX_IDLE: usize = 4;

/// Something that can deliver a serialized action request to the compositor
#[async_trait]
pub trait ActionSink: Send + Sync {
    /// Deliver one request line, e.g. `{"Action":{"FocusWindow":{"id":1}}}`
    async fn send_action(&self, request: &str) -> Result<(), NiriError>;
}

/// Pool of request connections to one niri socket
#[derive(Debug)]
pub struct SocketPool {
    socket_path: PathBuf,
    idle: Mutex<Vec<NiriClient>>,
    max_idle: usize,
}

impl SocketPool {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            idle: Mutex::new(Vec::new()),
            max_idle: DEFAULT_MAX_IDLE,
        }
    }

    /// Pool for the socket named by `$NIRI_SOCKET`
    pub fn from_env() -> Result<Self, NiriError> {
        Ok(Self::new(get_socket_path()?))
    }

    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Number of connections waiting to be reused
    pub fn idle_count(&self) -> usize {
        self.lock().len()
    }

    /// Take an idle connection, or open a new one
    pub async fn acquire(&self) -> Result<PooledClient<'_>, NiriError> {
        let idle = self.lock().pop();
        let client = match idle {
            Some(client) => client,
            None => {
                debug!(path = %self.socket_path.display(), "Opening new niri connection");
                NiriClient::connect_to(&self.socket_path).await?
            }
        };

        Ok(PooledClient {
            pool: self,
            client: Some(client),
        })
    }

    fn release(&self, client: NiriClient) {
        let mut idle = self.lock();
        if idle.len() < self.max_idle {
            idle.push(client);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<NiriClient>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A connection borrowed from a [`SocketPool`]
///
/// Goes back to the pool when dropped, unless its transport failed.
#[derive(Debug)]
pub struct PooledClient<'a> {
    pool: &'a SocketPool,
    client: Option<NiriClient>,
}

impl PooledClient<'_> {
    /// Send a request line on the borrowed connection
    pub async fn send_line(&mut self, line: &str) -> Result<niri_ipc::Response, NiriError> {
        let client = self.client.as_mut().ok_or(NiriError::ConnectionClosed)?;
        let result = client.send_line(line).await;

        if let Err(e) = &result {
            if e.breaks_connection() {
                debug!(error = %e, "Discarding broken niri connection");
                self.client = None;
            }
        }

        result
    }
}

impl Drop for PooledClient<'_> {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client);
        }
    }
}

#[async_trait]
impl ActionSink for SocketPool {
    async fn send_action(&self, request: &str) -> Result<(), NiriError> {
        let mut connection = self.acquire().await?;
        match connection.send_line(request).await? {
            niri_ipc::Response::Handled => Ok(()),
            other => {
                debug!(response = ?other, "Unexpected reply to action request");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::niri_ipc::fake::{handled, FakeNiri};

    const FOCUS: &str = r#"{"Action":{"FocusWindow":{"id":1}}}"#;

    #[tokio::test]
    async fn test_connection_is_reused() {
        let niri = FakeNiri::serve(|_| handled());
        let pool = SocketPool::new(&niri.path);

        pool.send_action(FOCUS).await.unwrap();
        pool.send_action(FOCUS).await.unwrap();

        assert_eq!(niri.connections(), 1);
        assert_eq!(niri.requests().len(), 2);
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_borrows_open_separate_connections() {
        let niri = FakeNiri::serve(|_| handled());
        let pool = SocketPool::new(&niri.path);

        let mut first = pool.acquire().await.unwrap();
        let mut second = pool.acquire().await.unwrap();
        first.send_line(FOCUS).await.unwrap();
        second.send_line(FOCUS).await.unwrap();
        drop(first);
        drop(second);

        assert_eq!(niri.connections(), 2);
        assert_eq!(pool.idle_count(), 2);
    }

    #[tokio::test]
    async fn test_idle_connections_are_capped() {
        let niri = FakeNiri::serve(|_| handled());
        let pool = SocketPool::new(&niri.path).with_max_idle(1);

        let first = pool.acquire().await.unwrap();
        let second = pool.acquire().await.unwrap();
        drop(first);
        drop(second);

        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn test_error_reply_keeps_connection() {
        let niri = FakeNiri::serve(|_| r#"{"Err":"window not found"}"#.to_string());
        let pool = SocketPool::new(&niri.path);

        let err = pool.send_action(FOCUS).await.unwrap_err();

        assert!(matches!(err, NiriError::NiriError { .. }));
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn test_garbled_reply_discards_connection() {
        let niri = FakeNiri::serve(|_| "not json".to_string());
        let pool = SocketPool::new(&niri.path);

        let err = pool.send_action(FOCUS).await.unwrap_err();

        assert!(matches!(err, NiriError::DeserializeFailed(_)));
        assert_eq!(pool.idle_count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_socket_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let pool = SocketPool::new(dir.path().join("missing.sock"));

        let err = pool.send_action(FOCUS).await.unwrap_err();
        assert!(matches!(err, NiriError::ConnectionFailed { .. }));
    }
}
