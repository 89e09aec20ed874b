//! Status endpoint over real HTTP

mod common;

use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use common::{RunningEndpoint, test_state};
use shared::{ShortResponse, StatusSnapshot};
use simulator::EndpointPhase;

#[tokio::test]
async fn test_status_as_json() {
    let running = RunningEndpoint::start(test_state(77, 4, 25)).await;

    let response = reqwest::Client::new()
        .get(format!("{}/status", running.base_url))
        .header("Accept", "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let snapshot: StatusSnapshot = response.json().await.unwrap();
    assert_eq!(snapshot.sid, 77);
    assert_eq!(snapshot.loop_count, 4);
    assert_eq!(snapshot.generations_requested, 25);
    assert_eq!(snapshot.config_file, "runs/baseline.json5");
    assert_eq!(snapshot.estimated_completion, "unknown");

    running.shutdown.cancel();
}

#[tokio::test]
async fn test_status_as_text() {
    let running = RunningEndpoint::start(test_state(77, 4, 25)).await;

    let body = reqwest::get(format!("{}/status", running.base_url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.starts_with("SIMULATOR STATUS"));
    let labels: Vec<&str> = body
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(':').map(|(label, _)| label.trim()))
        .collect();
    assert_eq!(labels.first(), Some(&"Program started"));
    assert!(labels.contains(&"Simulation ID"));
    assert!(body.contains("4 loops, 25 generations"));

    running.shutdown.cancel();
}

#[tokio::test]
async fn test_stop_lowers_targets() {
    let state = test_state(31, 10, 300);
    let running = RunningEndpoint::start(state.clone()).await;
    let client = reqwest::Client::new();

    let ack: ShortResponse = client
        .post(format!("{}/stop", running.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(ack.is_success());
    assert_eq!(ack.message, "Stopping after current generation");
    assert_eq!(ack.id, Some(31));
    assert_eq!(state.targets().await, (1, 1));

    // GET is accepted too
    let response = client.get(format!("{}/stop", running.base_url)).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    running.shutdown.cancel();
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let running = RunningEndpoint::start(test_state(1, 1, 1)).await;

    let response = reqwest::get(format!("{}/teapot", running.base_url)).await.unwrap();
    assert_eq!(response.status().as_u16(), 404);

    running.shutdown.cancel();
}

#[tokio::test]
async fn test_shutdown_reaches_stopped_and_releases_port() {
    let running = RunningEndpoint::start(test_state(1, 1, 1)).await;
    reqwest::get(format!("{}/status", running.base_url)).await.unwrap();
    assert_eq!(running.endpoint.phase(), EndpointPhase::Serving);

    running.shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), running.task)
        .await
        .expect("endpoint should stop within the grace period")
        .unwrap();

    assert!(result.is_ok());
    assert_eq!(running.endpoint.phase(), EndpointPhase::Stopped);
    assert!(reqwest::get(format!("{}/status", running.base_url)).await.is_err());
}

/// Read until the peer closes; `true` if that happened within `within`
async fn closed_by_peer(stream: &mut TcpStream, within: Duration) -> bool {
    let mut buf = [0u8; 1024];
    let deadline = Instant::now() + within;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match tokio::time::timeout(remaining, stream.read(&mut buf)).await {
            Ok(Ok(0)) | Ok(Err(_)) => return true,
            Ok(Ok(_)) => continue,
            Err(_) => return false,
        }
    }
}

#[tokio::test]
async fn test_half_sent_request_is_closed_after_grace() {
    let running = RunningEndpoint::start(test_state(1, 1, 1)).await;
    let address = running.base_url.trim_start_matches("http://").to_string();

    // Headers never terminated, so the request stays in flight
    let mut stream = TcpStream::connect(&address).await.unwrap();
    stream.write_all(b"GET /status HTTP/1.1\r\nHost: x\r\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    running.shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), running.task)
        .await
        .expect("endpoint should stop after the grace period")
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(running.endpoint.phase(), EndpointPhase::Stopped);

    assert!(closed_by_peer(&mut stream, Duration::from_secs(1)).await);
}

#[tokio::test]
async fn test_idle_keep_alive_connection_closes_without_waiting_for_grace() {
    let running = RunningEndpoint::start(test_state(1, 1, 1)).await;
    let address = running.base_url.trim_start_matches("http://").to_string();

    let mut stream = TcpStream::connect(&address).await.unwrap();
    stream
        .write_all(b"GET /status HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();
    let mut buf = [0u8; 4096];
    let read = stream.read(&mut buf).await.unwrap();
    assert!(String::from_utf8_lossy(&buf[..read]).starts_with("HTTP/1.1 200"));

    let started = Instant::now();
    running.shutdown.cancel();
    running.task.await.unwrap().unwrap();

    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(closed_by_peer(&mut stream, Duration::from_secs(1)).await);
}
