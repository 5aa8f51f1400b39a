//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use booking_gateway::config::GatewayConfig;
use booking_gateway::http::HttpServer;
use booking_gateway::lifecycle::Shutdown;

/// What the mock upstream sends back for every request.
#[derive(Clone)]
pub struct MockReply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
    /// Sleep before answering at all.
    pub delay: Option<Duration>,
    /// Send headers and half the body, then hold the connection open.
    pub stall_mid_body: bool,
}

impl MockReply {
    pub fn json(body: &str) -> Self {
        Self::with_type(Some("application/json"), body)
    }

    pub fn text(body: &str) -> Self {
        Self::with_type(Some("text/plain; charset=utf-8"), body)
    }

    pub fn html(body: &str) -> Self {
        Self::with_type(Some("text/html; charset=utf-8"), body)
    }

    pub fn with_type(content_type: Option<&'static str>, body: &str) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.to_string(),
            delay: None,
            stall_mid_body: false,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn stalled(mut self) -> Self {
        self.stall_mid_body = true;
        self
    }
}

/// One request as the mock upstream saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// e.g. `GET /exec?action=slots&barber=ana HTTP/1.1`
    pub request_line: String,
    pub headers: String,
    pub body: String,
}

/// Handle to a running mock upstream.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    /// URL the gateway should be pointed at.
    pub fn url(&self) -> String {
        format!("http://{}/exec", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Start a mock upstream on an ephemeral port answering every request with `reply`.
pub async fn start_mock_upstream(reply: MockReply) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let reply = reply.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        serve_one(socket, reply, recorded).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockUpstream { addr, requests }
}

async fn serve_one(mut socket: TcpStream, reply: MockReply, recorded: Arc<Mutex<Vec<RecordedRequest>>>) {
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    recorded.lock().unwrap().push(request);

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reason_phrase(reply.status),
        reply.body.len()
    );
    if let Some(content_type) = reply.content_type {
        head.push_str(&format!("Content-Type: {}\r\n", content_type));
    }
    head.push_str("\r\n");

    if reply.stall_mid_body {
        let half = &reply.body.as_bytes()[..reply.body.len() / 2];
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(half).await;
        let _ = socket.flush().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        return;
    }

    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(reply.body.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let (request_line, headers) = head.split_once("\r\n").unwrap_or((head.as_str(), ""));
    let content_length = headers
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        request_line: request_line.to_string(),
        headers: headers.to_string(),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Gateway config pointed at `upstream_url`, safe for tests.
pub fn test_config(upstream_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.url = upstream_url.to_string();
    config.upstream.use_system_proxy = false;
    config.upstream.timeout_ms = 2_000;
    config.timeouts.request_secs = 5;
    config
}

/// A gateway running on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    shutdown: Arc<Shutdown>,
}

impl TestGateway {
    pub fn api(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn root(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(Shutdown::new());
    let rx: broadcast::Receiver<()> = shutdown.subscribe();

    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestGateway { addr, shutdown }
}

/// Client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
