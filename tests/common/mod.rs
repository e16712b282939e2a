//! Shared utilities for integration tests.

use serde_json::Value;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use sui_multisend::config::RpcConfig;
use sui_multisend::resilience::retries::RetryPolicy;
use sui_multisend::ProviderPool;

/// JSON-RPC success envelope.
pub fn rpc_result(result: Value) -> String {
    serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string()
}

/// JSON-RPC error envelope.
#[allow(dead_code)]
pub fn rpc_error(code: i64, message: &str) -> String {
    serde_json::json!({"jsonrpc": "2.0", "id": 1, "error": {"code": code, "message": message}})
        .to_string()
}

/// Retry policy with millisecond delays and no jitter.
pub fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        backoff_multiplier: 2.0,
        jitter_factor: 0.0,
        ..RetryPolicy::default()
    }
}

/// Pool over `endpoints`, direct transport, short timeouts.
pub fn pool(endpoints: Vec<String>, max_retries: u32) -> ProviderPool {
    let pool = ProviderPool::new(fast_policy(max_retries));
    let config = RpcConfig {
        endpoints,
        proxies: Vec::new(),
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
    };
    pool.init(&config).unwrap();
    pool
}

/// Start a JSON-RPC backend on an ephemeral port.
///
/// `f` receives the request's method and params and returns the HTTP
/// status and body to answer with. Returns the backend's base URL.
pub async fn start_programmable_backend<F, Fut>(f: F) -> String
where
    F: Fn(String, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let _ = serve_one(socket, f.as_ref()).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    format!("http://{addr}")
}

async fn serve_one<F, Fut>(mut socket: TcpStream, f: &F) -> std::io::Result<()>
where
    F: Fn(String, Value) -> Fut,
    Fut: Future<Output = (u16, String)>,
{
    let body = read_request_body(&mut socket).await?;
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request["params"].clone();

    let (status, body) = f(method, params).await;
    let status_text = match status {
        200 => "200 OK",
        404 => "404 Not Found",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

async fn read_request_body(socket: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(Vec::new());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(buf[header_end..].to_vec())
}
