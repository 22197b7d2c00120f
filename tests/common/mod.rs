//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::{BoxFuture, FutureExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use strata::{BoxError, HeaderCollection, Transport, TransportRequest, TransportResponse, UserAgent, Version};

/// In-memory transport that records every exchange and answers with a
/// fixed reply, or fails every exchange when built with `failing`.
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    seen: Arc<Mutex<Vec<TransportRequest>>>,
    status: u16,
    headers: HeaderCollection,
    body: &'static str,
    fail: bool,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn replying(status: u16, body: &'static str) -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
            status,
            headers: HeaderCollection::new(),
            body,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::replying(200, "")
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.add(name, value);
        self
    }

    /// Every request handed to the transport so far.
    pub fn seen(&self) -> Vec<TransportRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> TransportRequest {
        self.seen().pop().expect("no request was sent")
    }

    /// Agent wired to this transport.
    pub fn agent(&self) -> UserAgent {
        UserAgent::builder().transport(Arc::new(self.clone())).build()
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: TransportRequest) -> BoxFuture<'static, Result<TransportResponse, BoxError>> {
        self.seen.lock().unwrap().push(request);
        let reply: Result<TransportResponse, BoxError> = if self.fail {
            Err("connection reset by peer".into())
        } else {
            Ok(TransportResponse {
                version: Version::Http11,
                status: self.status,
                headers: self.headers.clone(),
                body: Bytes::from_static(self.body.as_bytes()),
            })
        };
        async move { reply }.boxed()
    }
}

/// Start a mock backend answering every connection with `status` and
/// `body`. Raw request text (head and body) is sent on the returned channel.
#[allow(dead_code)]
pub async fn start_mock_backend(
    status_line: &'static str,
    body: &'static str,
) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let raw = read_request(&mut socket).await;
                        let _ = tx.send(raw);

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nX-Backend: mock\r\nX-Backend: second\r\nConnection: close\r\n\r\n{}",
                            status_line,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Read one request: head up to the blank line, then a body of
/// `content-length` bytes or a chunked body up to its terminator.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(head_end) = text.find("\r\n\r\n") {
            let head = text[..head_end].to_ascii_lowercase();
            let body_len = buf.len() - head_end - 4;
            let complete = if let Some(len) = content_length(&head) {
                body_len >= len
            } else if head.contains("transfer-encoding: chunked") {
                text.ends_with("0\r\n\r\n")
            } else {
                true
            };
            if complete {
                return text;
            }
        }

        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return String::from_utf8_lossy(&buf).to_string(),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

fn content_length(head: &str) -> Option<usize> {
    head.lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse().ok())
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
