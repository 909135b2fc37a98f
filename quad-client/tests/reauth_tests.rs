//! `HttpTransport` behavior against a scripted HTTP/1.1 listener: a 401
//! triggers one token refresh and one replay of the original call.

use quad_client::{HttpTransport, RequestDescriptor, Transport};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct SeenRequest {
    method: String,
    path: String,
    authorization: Option<String>,
}

async fn read_request(stream: &mut TcpStream) -> Option<SeenRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut authorization = None;
    let mut content_length = 0usize;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        if name == "authorization" {
            authorization = Some(value.to_string());
        } else if name == "content-length" {
            content_length = value.parse().unwrap_or(0);
        }
    }

    // Drain the body so the client sees a clean close.
    let mut remaining = content_length.saturating_sub(buffer.len() - header_end);
    while remaining > 0 {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        remaining = remaining.saturating_sub(n);
    }

    Some(SeenRequest {
        method,
        path,
        authorization,
    })
}

async fn write_response(stream: &mut TcpStream, status_line: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Scripted backend: first list call is rejected with 401, the refresh
/// endpoint hands out a fresh token, the replay succeeds.
async fn spawn_reauth_server(log: Arc<Mutex<Vec<SeenRequest>>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let Some(request) = read_request(&mut stream).await else {
                continue;
            };
            log.lock().unwrap().push(request.clone());

            match (request.method.as_str(), request.path.as_str()) {
                ("POST", "/api/refreshToken") => {
                    write_response(
                        &mut stream,
                        "200 OK",
                        &json!({"token": "fresh"}).to_string(),
                    )
                    .await;
                }
                ("GET", path) if path.starts_with("/api/helprequest/all") => {
                    if request.authorization.as_deref() == Some("Bearer fresh") {
                        write_response(&mut stream, "200 OK", "[]").await;
                    } else {
                        write_response(&mut stream, "401 Unauthorized", "").await;
                    }
                }
                _ => {
                    write_response(&mut stream, "404 Not Found", "").await;
                }
            }
        }
    });

    address
}

#[tokio::test]
async fn http_401_refreshes_auth_and_replays_once() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let base_url = spawn_reauth_server(log.clone()).await;

    let transport = HttpTransport::new(
        &base_url,
        Some("stale".to_string()),
        Some("refresh-secret".to_string()),
        Duration::from_secs(5),
    )
    .unwrap();

    let body = transport
        .send(&RequestDescriptor::get("/api/helprequest/all"))
        .await
        .unwrap();
    assert_eq!(body, json!([]));

    let seen = log.lock().unwrap().clone();
    let paths: Vec<_> = seen.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/api/helprequest/all",
            "/api/refreshToken",
            "/api/helprequest/all"
        ],
        "exactly one refresh and one replay"
    );
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer stale"));
    assert_eq!(seen[2].authorization.as_deref(), Some("Bearer fresh"));
}

#[tokio::test]
async fn second_401_is_returned_not_retried() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let server_log = log.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let Some(request) = read_request(&mut stream).await else {
                continue;
            };
            server_log.lock().unwrap().push(request.clone());
            if request.path == "/api/refreshToken" {
                write_response(
                    &mut stream,
                    "200 OK",
                    &json!({"token": "still-bad"}).to_string(),
                )
                .await;
            } else {
                // The backend rejects even the refreshed token.
                write_response(&mut stream, "401 Unauthorized", "").await;
            }
        }
    });

    let transport = HttpTransport::new(
        &base_url,
        Some("stale".to_string()),
        Some("refresh-secret".to_string()),
        Duration::from_secs(5),
    )
    .unwrap();

    let error = transport
        .send(&RequestDescriptor::get("/api/helprequest/all"))
        .await
        .unwrap_err();
    assert_eq!(error.status(), Some(401));

    // Original, refresh, replay: three requests, no further retries.
    assert_eq!(log.lock().unwrap().len(), 3);
}
