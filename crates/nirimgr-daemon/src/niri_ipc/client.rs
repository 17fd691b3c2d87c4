//! Niri IPC client implementation
//!
//! This module provides the `NiriClient` for request/reply exchanges with the
//! niri compositor. The client handles socket discovery and the
//! newline-delimited JSON protocol.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use super::types::{Output, Window, Workspace};
use super::NiriError;

/// Environment variable name for the niri socket path
pub(crate) const NIRI_SOCKET_ENV: &str = "NIRI_SOCKET";

/// Discover the niri IPC socket path from the environment
///
/// Reads the `NIRI_SOCKET` environment variable and validates that
/// the path exists.
///
/// # Errors
///
/// Returns `NiriError::SocketNotSet` if `$NIRI_SOCKET` is not set.
/// Returns `NiriError::SocketNotFound` if the path doesn't exist.
pub fn get_socket_path() -> Result<PathBuf, NiriError> {
    let socket_path =
        PathBuf::from(std::env::var(NIRI_SOCKET_ENV).map_err(|_| NiriError::SocketNotSet)?);

    if !socket_path.exists() {
        return Err(NiriError::SocketNotFound { path: socket_path });
    }

    Ok(socket_path)
}

/// Open a raw connection to the socket at `path`
pub(crate) async fn open_socket(path: &Path) -> Result<UnixStream, NiriError> {
    UnixStream::connect(path)
        .await
        .map_err(|source| NiriError::ConnectionFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// Client for request/reply exchanges with the niri compositor
///
/// One client owns one socket connection. Requests are answered in order,
/// so a client can be reused for any number of sequential requests.
///
/// # Example
///
/// ```ignore
/// let mut client = NiriClient::connect().await?;
/// let focused = client.get_focused_window().await?;
/// ```
#[derive(Debug)]
pub struct NiriClient {
    socket: UnixStream,
    socket_path: PathBuf,
}

impl NiriClient {
    /// Connect to the socket named by `$NIRI_SOCKET`
    ///
    /// # Errors
    ///
    /// Returns `NiriError::SocketNotSet` if `$NIRI_SOCKET` is not set.
    /// Returns `NiriError::SocketNotFound` if the socket path doesn't exist.
    /// Returns `NiriError::ConnectionFailed` if the connection fails.
    pub async fn connect() -> Result<Self, NiriError> {
        Self::connect_to(&get_socket_path()?).await
    }

    /// Connect to a niri socket at an explicit path
    pub async fn connect_to(path: &Path) -> Result<Self, NiriError> {
        let socket = open_socket(path).await?;
        Ok(Self {
            socket,
            socket_path: path.to_path_buf(),
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Send a request to niri and receive a response
    ///
    /// # Errors
    ///
    /// Returns `NiriError::SerializeFailed` if the request cannot be serialized,
    /// and any error from [`send_line`](Self::send_line).
    pub async fn send_request(
        &mut self,
        request: &niri_ipc::Request,
    ) -> Result<niri_ipc::Response, NiriError> {
        let line = serde_json::to_string(request).map_err(NiriError::SerializeFailed)?;
        self.send_line(&line).await
    }

    /// Send an already serialized request and read the reply
    ///
    /// Niri uses a JSON-over-newline protocol:
    /// 1. Client writes the request followed by a newline
    /// 2. Server responds with `{"Ok":...}` or `{"Err":"..."}` and a newline
    ///
    /// # Errors
    ///
    /// Returns `NiriError::SendFailed` if writing to the socket fails.
    /// Returns `NiriError::ReceiveFailed` if reading from the socket fails.
    /// Returns `NiriError::ConnectionClosed` if the socket closes unexpectedly.
    /// Returns `NiriError::DeserializeFailed` if the reply cannot be parsed.
    /// Returns `NiriError::NiriError` if niri returns an error reply.
    pub async fn send_line(&mut self, line: &str) -> Result<niri_ipc::Response, NiriError> {
        self.socket
            .write_all(line.as_bytes())
            .await
            .map_err(NiriError::SendFailed)?;
        self.socket
            .write_all(b"\n")
            .await
            .map_err(NiriError::SendFailed)?;
        self.socket.flush().await.map_err(NiriError::SendFailed)?;

        let (read_half, _write_half) = self.socket.split();
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

        reply.map_err(|message| NiriError::NiriError { message })
    }

    /// Query the currently focused window, if any
    pub async fn get_focused_window(&mut self) -> Result<Option<Window>, NiriError> {
        match self.send_request(&niri_ipc::Request::FocusedWindow).await? {
            niri_ipc::Response::FocusedWindow(window) => Ok(window.map(Window::from)),
            _ => Err(NiriError::UnexpectedResponse {
                request: "FocusedWindow",
            }),
        }
    }

    /// Query all open windows
    pub async fn get_windows(&mut self) -> Result<Vec<Window>, NiriError> {
        match self.send_request(&niri_ipc::Request::Windows).await? {
            niri_ipc::Response::Windows(windows) => {
                Ok(windows.into_iter().map(Window::from).collect())
            }
            _ => Err(NiriError::UnexpectedResponse { request: "Windows" }),
        }
    }

    /// Query all workspaces across outputs
    pub async fn get_workspaces(&mut self) -> Result<Vec<Workspace>, NiriError> {
        match self.send_request(&niri_ipc::Request::Workspaces).await? {
            niri_ipc::Response::Workspaces(workspaces) => {
                Ok(workspaces.into_iter().map(Workspace::from).collect())
            }
            _ => Err(NiriError::UnexpectedResponse {
                request: "Workspaces",
            }),
        }
    }

    /// Query all connected outputs
    pub async fn get_outputs(&mut self) -> Result<Vec<Output>, NiriError> {
        match self.send_request(&niri_ipc::Request::Outputs).await? {
            niri_ipc::Response::Outputs(outputs) => {
                Ok(outputs.into_values().map(Output::from).collect())
            }
            _ => Err(NiriError::UnexpectedResponse { request: "Outputs" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::niri_ipc::fake::{handled, reply_ok, FakeNiri};
    use crate::niri_ipc::types::fixtures::{niri_window, niri_workspace};
    use std::env;
    use std::sync::Mutex;

    // Environment variables are global state, so tests modifying them must not run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn with_socket_env<T>(value: Option<&str>, f: impl FnOnce() -> T) -> T {
        let _guard = ENV_MUTEX.lock().unwrap();
        let original = env::var(NIRI_SOCKET_ENV).ok();
        match value {
            Some(value) => env::set_var(NIRI_SOCKET_ENV, value),
            None => env::remove_var(NIRI_SOCKET_ENV),
        }

        let result = f();

        match original {
            Some(original) => env::set_var(NIRI_SOCKET_ENV, original),
            None => env::remove_var(NIRI_SOCKET_ENV),
        }
        result
    }

    #[test]
    fn test_socket_not_set_error() {
        let err = with_socket_env(None, get_socket_path).unwrap_err();

        assert!(matches!(err, NiriError::SocketNotSet), "got: {:?}", err);
        assert!(err.to_string().contains("NIRI_SOCKET"));
    }

    #[test]
    fn test_socket_not_found_error() {
        let fake_path = "/tmp/nonexistent-niri-socket-nirimgr";
        let err = with_socket_env(Some(fake_path), get_socket_path).unwrap_err();

        match &err {
            NiriError::SocketNotFound { path } => assert_eq!(path, Path::new(fake_path)),
            other => panic!("Expected SocketNotFound error, got: {:?}", other),
        }
        assert!(err.to_string().contains(fake_path));
    }

    #[test]
    fn test_existing_socket_path_accepted() {
        let path = with_socket_env(Some("/tmp"), get_socket_path).unwrap();
        assert_eq!(path, PathBuf::from("/tmp"));
    }

    #[tokio::test]
    async fn test_connect_to_plain_file_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let socket_path = temp_dir.path().join("not-a-socket");
        std::fs::write(&socket_path, "").unwrap();

        let err = NiriClient::connect_to(&socket_path).await.unwrap_err();
        match &err {
            NiriError::ConnectionFailed { path, .. } => assert_eq!(path, &socket_path),
            other => panic!("Expected ConnectionFailed error, got: {:?}", other),
        }
        assert!(err.to_string().contains("Failed to connect"));
    }

    #[tokio::test]
    async fn test_send_line_returns_handled() {
        let niri = FakeNiri::serve(|_| handled());
        let mut client = NiriClient::connect_to(&niri.path).await.unwrap();

        let response = client
            .send_line(r#"{"Action":{"FocusWindow":{"id":1}}}"#)
            .await
            .unwrap();

        assert!(matches!(response, niri_ipc::Response::Handled));
        assert_eq!(niri.requests(), [r#"{"Action":{"FocusWindow":{"id":1}}}"#]);
    }

    #[tokio::test]
    async fn test_error_reply_becomes_niri_error() {
        let niri = FakeNiri::serve(|_| r#"{"Err":"no such window"}"#.to_string());
        let mut client = NiriClient::connect_to(&niri.path).await.unwrap();

        let err = client.send_line(r#"{"Action":{"FocusWindow":{"id":9}}}"#).await.unwrap_err();
        match err {
            NiriError::NiriError { message } => assert_eq!(message, "no such window"),
            other => panic!("Expected NiriError, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_windows_converts_to_internal_type() {
        let niri = FakeNiri::serve(|_| {
            reply_ok(niri_ipc::Response::Windows(vec![
                niri_window(1, Some("firefox"), Some("Mozilla Firefox")),
                niri_window(2, None, None),
            ]))
        });
        let mut client = NiriClient::connect_to(&niri.path).await.unwrap();

        let windows = client.get_windows().await.unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].app_id, "firefox");
        assert_eq!(windows[1].title, "");
        assert_eq!(niri.requests(), [r#""Windows""#]);
    }

    #[tokio::test]
    async fn test_get_workspaces_and_focused_window() {
        let niri = FakeNiri::serve(|request| match request {
            r#""Workspaces""# => reply_ok(niri_ipc::Response::Workspaces(vec![niri_workspace(
                3,
                1,
                Some("scratchpad"),
            )])),
            _ => reply_ok(niri_ipc::Response::FocusedWindow(None)),
        });
        let mut client = NiriClient::connect_to(&niri.path).await.unwrap();

        let workspaces = client.get_workspaces().await.unwrap();
        assert_eq!(workspaces[0].name, "scratchpad");
        assert_eq!(client.get_focused_window().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unexpected_response_is_an_error() {
        let niri = FakeNiri::serve(|_| handled());
        let mut client = NiriClient::connect_to(&niri.path).await.unwrap();

        let err = client.get_windows().await.unwrap_err();
        assert!(matches!(err, NiriError::UnexpectedResponse { request: "Windows" }));
    }

    #[tokio::test]
    async fn test_get_outputs() {
        let niri = FakeNiri::serve(|_| {
            r#"{"Ok":{"Outputs":{"eDP-1":{
                "name": "eDP-1", "make": "BOE", "model": "0x0BCA", "serial": null,
                "physical_size": [302, 188], "modes": [], "current_mode": null,
                "is_custom_mode": false, "vrr_supported": false, "vrr_enabled": false,
                "logical": {"x": 0, "y": 0, "width": 1920, "height": 1200, "scale": 1.25, "transform": "Normal"}
            }}}}"#
                .replace('\n', "")
        });
        let mut client = NiriClient::connect_to(&niri.path).await.unwrap();

        let outputs = client.get_outputs().await.unwrap();

        assert_eq!(
            outputs,
            vec![Output {
                name: "eDP-1".to_string(),
                logical_size: Some((1920, 1200)),
            }]
        );
        assert_eq!(niri.requests(), [r#""Outputs""#]);
    }
}
