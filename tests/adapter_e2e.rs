//! End-to-end exchanges through a live listener.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use edge_adapter::{Body, HandlerError, Request, Response, Upstream};
use flate2::read::GzDecoder;
use futures_util::stream;
use tokio::sync::Notify;
use url::Url;

mod common;

use common::Reply;

const TODO_JSON: &str = r#"{"userId":1,"id":1,"title":"delectus aut autem","completed":false}"#;

fn relay(upstream: Upstream, target: Url) -> impl edge_adapter::Handler {
    move |request: Request| {
        let upstream = upstream.clone();
        let target = target.clone();
        async move { upstream.forward(request, target).await }
    }
}

#[tokio::test]
async fn json_relay_is_unchanged() {
    let backend = common::start_mock_backend(TODO_JSON).await;
    let target = Url::parse(&format!("http://{backend}/todos/1")).unwrap();
    let server = common::start_adapter(relay(Upstream::new(None).unwrap(), target)).await;

    let res = reqwest::get(format!("http://{}/a.json", server.local_addr()))
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.content_length(), Some(TODO_JSON.len() as u64));
    assert_eq!(res.text().await.unwrap(), TODO_JSON);
}

#[tokio::test]
async fn range_is_forwarded_and_partial_content_relayed() {
    let backend = common::start_programmable_backend(|head| async move {
        let head = head.to_ascii_lowercase();
        if head.contains("range: bytes=0-99") && !head.contains("host: edge.test") {
            Reply {
                status: 206,
                headers: vec![
                    ("Content-Range", "bytes 0-99/1000".to_string()),
                    ("Accept-Ranges", "bytes".to_string()),
                    ("Content-Type", "video/mp4".to_string()),
                ],
                body: "x".repeat(100),
            }
        } else {
            Reply::ok("whole file")
        }
    })
    .await;
    let target = Url::parse(&format!("http://{backend}/video.mp4")).unwrap();
    let server = common::start_adapter(relay(Upstream::new(None).unwrap(), target)).await;

    let res = reqwest::Client::new()
        .get(format!("http://{}/a.mp4", server.local_addr()))
        .header("host", "edge.test")
        .header("range", "bytes=0-99")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 206);
    assert_eq!(res.headers()["content-range"], "bytes 0-99/1000");
    assert_eq!(res.headers()["accept-ranges"], "bytes");
    assert_eq!(res.content_length(), Some(100));
    assert_eq!(res.bytes().await.unwrap().len(), 100);
}

#[tokio::test]
async fn gzip_declared_body_is_compressed_on_the_wire() {
    let text = "compress me please ".repeat(64);
    let body = text.clone();
    let server = common::start_adapter(move |_req: Request| {
        let body = body.clone();
        async move {
            Ok::<_, HandlerError>(
                Response::new(body.clone())
                    .header("content-encoding", "gzip")
                    .header("content-length", body.len().to_string()),
            )
        }
    })
    .await;

    let res = reqwest::get(format!("http://{}/", server.local_addr()))
        .await
        .unwrap();

    assert_eq!(res.headers()["content-encoding"], "gzip");
    assert!(res.headers().get("content-length").is_none());

    let wire = res.bytes().await.unwrap();
    let mut decoded = String::new();
    GzDecoder::new(&wire[..]).read_to_string(&mut decoded).unwrap();
    assert_eq!(decoded, text);
}

#[tokio::test]
async fn bogus_encoding_passes_bytes_through() {
    let server = common::start_adapter(|_req: Request| async move {
        Ok::<_, HandlerError>(Response::new("plain bytes").header("content-encoding", "bogus"))
    })
    .await;

    let res = reqwest::get(format!("http://{}/", server.local_addr()))
        .await
        .unwrap();

    assert_eq!(res.headers()["content-encoding"], "bogus");
    assert_eq!(&res.bytes().await.unwrap()[..], b"plain bytes");
}

#[tokio::test]
async fn every_set_cookie_gets_its_own_line() {
    let server = common::start_adapter(|_req: Request| async move {
        Ok::<_, HandlerError>(
            Response::new("cookies")
                .header("Set-Cookie", "a=1; Path=/")
                .header("Set-Cookie", "b=2; Expires=Wed, 21 Oct 2026 07:28:00 GMT")
                .header("Set-Cookie", "c=3"),
        )
    })
    .await;

    let raw = common::raw_exchange(
        server.local_addr(),
        "GET / HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n",
    )
    .await;
    let head = raw.split("\r\n\r\n").next().unwrap();
    let cookies: Vec<&str> = head
        .lines()
        .filter(|line| line.to_ascii_lowercase().starts_with("set-cookie:"))
        .collect();

    assert_eq!(cookies.len(), 3);
    assert!(cookies[1].ends_with("b=2; Expires=Wed, 21 Oct 2026 07:28:00 GMT"));
}

#[tokio::test]
async fn upstream_timeout_becomes_504() {
    let backend = common::start_silent_backend().await;
    let target = Url::parse(&format!("http://{backend}/slow")).unwrap();
    let upstream = Upstream::new(Some(Duration::from_millis(200))).unwrap();
    let server = common::start_adapter(relay(upstream, target)).await;

    let res = reqwest::get(format!("http://{}/slow", server.local_addr()))
        .await
        .unwrap();

    assert_eq!(res.status(), 504);
    assert!(res.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn handler_failure_becomes_500_with_trace() {
    let server = common::start_adapter(|_req: Request| async move {
        Err::<Response, _>(HandlerError::from("ledger unavailable"))
    })
    .await;

    let res = reqwest::get(format!("http://{}/", server.local_addr()))
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "Error: ledger unavailable");
}

#[tokio::test]
async fn event_stream_chunks_arrive_before_the_body_ends() {
    let release = Arc::new(Notify::new());
    let gate = Arc::clone(&release);
    let server = common::start_adapter(move |_req: Request| {
        let gate = Arc::clone(&gate);
        async move {
            let events = stream::unfold(0u8, move |n| {
                let gate = Arc::clone(&gate);
                async move {
                    match n {
                        0 => Some((Ok::<_, HandlerError>(Bytes::from("data: first\n\n")), 1)),
                        1 => {
                            gate.notified().await;
                            Some((Ok(Bytes::from("data: second\n\n")), 2))
                        }
                        _ => None,
                    }
                }
            });
            Ok::<_, HandlerError>(
                Response::new(Body::from_stream(events)).header("content-type", "text/event-stream"),
            )
        }
    })
    .await;

    let mut res = reqwest::get(format!("http://{}/events", server.local_addr()))
        .await
        .unwrap();

    let first = tokio::time::timeout(Duration::from_secs(2), res.chunk())
        .await
        .expect("first event should not wait for the stream to end")
        .unwrap()
        .unwrap();
    assert_eq!(&first[..], b"data: first\n\n");

    release.notify_one();
    let rest = res.bytes().await.unwrap();
    assert_eq!(&rest[..], b"data: second\n\n");
}

#[tokio::test]
async fn request_body_streams_to_handler() {
    let server = common::start_adapter(|req: Request| async move {
        let method = req.method().to_owned();
        let half_duplex = req.duplex().is_some();
        let body = match req.into_body() {
            Some(body) => body.text().await?,
            None => String::new(),
        };
        Ok::<_, HandlerError>(Response::new(format!("{method} {half_duplex} {body}")))
    })
    .await;

    let res = reqwest::Client::new()
        .post(format!("http://{}/submit", server.local_addr()))
        .body("payload")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "POST true payload");

    let res = reqwest::get(format!("http://{}/", server.local_addr()))
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "GET false ");
}

#[tokio::test]
async fn close_stops_new_connections() {
    let server = common::start_adapter(|_req: Request| async move {
        Ok::<_, HandlerError>(Response::new("up"))
    })
    .await;
    let addr = server.local_addr();

    let res = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(res.text().await.unwrap(), "up");

    server.close();
    server.closed().await;
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}
