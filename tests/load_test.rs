//! Load testing for the adapter.

use std::time::{Duration, Instant};

use edge_adapter::{HandlerError, Request, Response, Upstream};
use url::Url;

mod common;

#[tokio::test]
async fn test_load_performance() {
    // 1. Setup Mock Backend
    let backend_addr = common::start_mock_backend(r#"{"hello":"from backend"}"#).await;
    let target = Url::parse(&format!("http://{}/", backend_addr)).unwrap();

    // 2. Start Adapter: half the paths relay, half answer locally
    let upstream = Upstream::new(Some(Duration::from_secs(5))).unwrap();
    let server = common::start_adapter(move |request: Request| {
        let upstream = upstream.clone();
        let target = target.clone();
        async move {
            if request.url().path() == "/relay" {
                upstream.forward(request, target).await
            } else {
                Ok::<_, HandlerError>(Response::new("local").header("content-encoding", "gzip"))
            }
        }
    })
    .await;
    let adapter_addr = server.local_addr();

    // 3. Run Load Test
    let concurrency = 20;
    let requests_per_task = 50;
    let total_requests = concurrency * requests_per_task;

    let client = reqwest::Client::new();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for task_index in 0..concurrency {
        let client = client.clone();
        let path = if task_index % 2 == 0 { "relay" } else { "local" };
        let url = format!("http://{}/{}", adapter_addr, path);
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for _ in 0..requests_per_task {
                let req_start = Instant::now();
                if let Ok(res) = client.get(&url).send().await {
                    if res.status().is_success() && res.bytes().await.is_ok() {
                        latencies.push(req_start.elapsed());
                    }
                }
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for task in tasks {
        let latencies = task.await.unwrap();
        all_latencies.extend(latencies);
    }

    let duration = start.elapsed();
    let rps = total_requests as f64 / duration.as_secs_f64();

    assert_eq!(all_latencies.len(), total_requests, "every request should succeed");

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p95 = all_latencies[(all_latencies.len() as f64 * 0.95) as usize];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", rps);
    println!("P50 Latency:    {:?}", p50);
    println!("P95 Latency:    {:?}", p95);
    println!("P99 Latency:    {:?}", p99);
    println!("-------------------------\n");

    server.close();
    server.closed().await;
}
