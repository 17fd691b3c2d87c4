//! In-process stand-in for the niri socket, used by tests

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

pub(crate) fn reply_ok(response: niri_ipc::Response) -> String {
    serde_json::to_string(&niri_ipc::Reply::Ok(response)).unwrap()
}

pub(crate) fn handled() -> String {
    reply_ok(niri_ipc::Response::Handled)
}

pub(crate) struct FakeNiri {
    _dir: TempDir,
    pub path: PathBuf,
    requests: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
}

impl FakeNiri {
    fn bind() -> (TempDir, PathBuf, UnixListener) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("niri.sock");
        let listener = UnixListener::bind(&path).unwrap();
        (dir, path, listener)
    }

    /// Answer every request line with `respond(line)`
    pub fn serve<F>(respond: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let (dir, path, listener) = Self::bind();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let respond = Arc::new(respond);

        let (seen, accepted) = (Arc::clone(&requests), Arc::clone(&connections));
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                accepted.fetch_add(1, Ordering::SeqCst);
                let (respond, seen) = (Arc::clone(&respond), Arc::clone(&seen));
                tokio::spawn(async move {
                    let (read, mut write) = socket.into_split();
                    let mut lines = BufReader::new(read).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        seen.lock().unwrap().push(line.clone());
                        let reply = format!("{}\n", respond(&line));
                        if write.write_all(reply.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        Self {
            _dir: dir,
            path,
            requests,
            connections,
        }
    }

    /// Accept one event stream: answer the handshake with `handshake`,
    /// write `lines`, then hang up
    pub fn event_stream(handshake: String, lines: Vec<String>) -> Self {
        let (dir, path, listener) = Self::bind();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let (seen, accepted) = (Arc::clone(&requests), Arc::clone(&connections));
        tokio::spawn(async move {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            accepted.fetch_add(1, Ordering::SeqCst);
            let (read, mut write) = socket.into_split();
            let mut reader = BufReader::new(read).lines();
            if let Ok(Some(request)) = reader.next_line().await {
                seen.lock().unwrap().push(request);
            }
            let mut output = format!("{}\n", handshake);
            for line in lines {
                output.push_str(&line);
                output.push('\n');
            }
            let _ = write.write_all(output.as_bytes()).await;
        });

        Self {
            _dir: dir,
            path,
            requests,
            connections,
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}
