//! End-to-end: a real listener on an ephemeral port, raw HTTP/1.1 over TCP.

mod common;

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use cicd_backend::{App, Config, Server, routes};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), cicd_backend::Error>>,
}

async fn start(config: Config) -> Running {
    let router = routes::router(&config).unwrap();
    let server = Server::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        server
            .serve_with_shutdown(App::new(config, router), async {
                let _ = stopped.await;
            })
            .await
    });

    Running { addr, stop, handle }
}

/// Sends one request with `Connection: close` and returns (status, body).
async fn raw(addr: SocketAddr, request: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .expect("response within 5s")
        .unwrap();

    let text = String::from_utf8(buf).unwrap();
    let (head, body) = text.split_once("\r\n\r\n").expect("header/body separator");
    let status = head.split(' ').nth(1).unwrap().parse().unwrap();
    (status, body.to_owned())
}

async fn get(addr: SocketAddr, target: &str) -> (u16, Value) {
    let request = format!("GET {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    let (status, body) = raw(addr, &request).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn serves_the_route_table_over_tcp() {
    let running = start(Config::default()).await;

    let (status, body) = get(running.addr, "/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "backend");

    let (status, body) = get(running.addr, "/api/info").await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "cicd-training-backend");

    let (status, body) = get(running.addr, "/api/quote").await;
    assert_eq!(status, 200);
    assert!((1..=3).contains(&body["id"].as_u64().unwrap()));

    let (status, body) = get(running.addr, "/api/unknown").await;
    assert_eq!(status, 404);
    assert_eq!(body, serde_json::json!({ "error": "not_found", "path": "/api/unknown" }));

    running.stop.send(()).unwrap();
    running.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn oversized_declared_body_is_refused_without_reading_it() {
    let running = start(Config::default()).await;

    // Declares 1 MiB but sends nothing: the limit check happens on the
    // header alone, so the server answers instead of waiting for the body.
    let request = "POST /api/quote HTTP/1.1\r\nHost: localhost\r\n\
                   Content-Type: application/json\r\nContent-Length: 1048576\r\n\
                   Connection: close\r\n\r\n";
    let (status, body) = raw(running.addr, request).await;
    assert_eq!(status, 413);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["error"], "payload_too_large");

    running.stop.send(()).unwrap();
    running.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn logs_start_and_stop() {
    let logs = common::capture_logs();
    let running = start(Config { env: "ci".into(), ..Config::default() }).await;

    get(running.addr, "/health").await;

    running.stop.send(()).unwrap();
    running.handle.await.unwrap().unwrap();

    let started = logs.out.tagged("server_started");
    assert_eq!(started.len(), 1);
    assert_eq!(started[0]["port"], running.addr.port());
    assert_eq!(started[0]["env"], "ci");
    assert_eq!(started[0]["api_prefix"], "/api");

    assert_eq!(logs.out.tagged("http_request").len(), 1);
    assert_eq!(logs.out.tagged("server_stopped").len(), 1);
}
