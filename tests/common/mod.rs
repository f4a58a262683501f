//! Shared fixtures for integration tests: throwaway repositories on disk
//! and a tiny HTTP server on localhost.

#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use markval::{CheckerConfig, ValidationContext, Validator};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A repository in a temporary directory
pub struct Repo {
    dir: TempDir,
}

impl Repo {
    pub fn new() -> Self {
        Repo {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Canonical root path
    pub fn root(&self) -> PathBuf {
        self.dir.path().canonicalize().unwrap()
    }

    /// Writes `content` to `relative`, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn validator(&self) -> Validator {
        self.validator_with(test_config(4))
    }

    pub fn validator_with(&self, config: CheckerConfig) -> Validator {
        let context = ValidationContext::new(self.root(), &config).unwrap();
        Validator::with_link_rule(Arc::new(context))
    }
}

pub fn test_config(max_connections: usize) -> CheckerConfig {
    CheckerConfig {
        max_connections,
        timeout: Duration::from_secs(5),
        use_proxy: false,
        ..CheckerConfig::default()
    }
}

/// Problem descriptions for `file`
pub async fn descriptions(validator: &Validator, file: &Path) -> Vec<String> {
    validator
        .check_document(file)
        .await
        .iter()
        .map(|p| p.description().to_string())
        .collect()
}

/// Localhost HTTP server answering by path prefix:
///   /404...  -> 404 Not Found
///   /500...  -> 500 Internal Server Error
///   anything else -> 200 OK
/// Each request is held for `delay` before answering, and the server
/// records the highest number of requests it was handling at once.
pub struct StubServer {
    pub addr: SocketAddr,
    pub requests: Arc<AtomicUsize>,
    pub max_active: Arc<AtomicUsize>,
}

impl StubServer {
    pub async fn start(delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));

        let counters = (Arc::clone(&requests), Arc::clone(&max_active));
        tokio::spawn(async move {
            let (requests, max_active) = counters;
            while let Ok((mut socket, _)) = listener.accept().await {
                let requests = Arc::clone(&requests);
                let active = Arc::clone(&active);
                let max_active = Arc::clone(&max_active);

                tokio::spawn(async move {
                    let path = read_request_path(&mut socket).await;
                    requests.fetch_add(1, Ordering::SeqCst);
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_active.fetch_max(now, Ordering::SeqCst);

                    tokio::time::sleep(delay).await;

                    let status = if path.starts_with("/404") {
                        "404 Not Found"
                    } else if path.starts_with("/500") {
                        "500 Internal Server Error"
                    } else {
                        "200 OK"
                    };
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                        status
                    );
                    active.fetch_sub(1, Ordering::SeqCst);
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        StubServer {
            addr,
            requests,
            max_active,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn read_request_path(socket: &mut tokio::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = socket.read(&mut chunk).await.unwrap_or(0);
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if buffer.windows(4).any(|window| window == b"\r\n\r\n") {
            break;
        }
    }

    let request = String::from_utf8_lossy(&buffer);
    request
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string()
}

/// A localhost URL nothing is listening on
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/page", port)
}
