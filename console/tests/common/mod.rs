//! Common test utilities for console integration tests

#![allow(dead_code)]

use axum::{routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use shared::{ShortResponse, StatusSnapshot};

pub fn snapshot(sid: i64) -> StatusSnapshot {
    StatusSnapshot {
        program_started: "2024-03-01T12:00:00Z".to_string(),
        run_duration: "1 hours, 2 minutes, 3 seconds".to_string(),
        config_file: "fake.json5".to_string(),
        simulation_date_range: "Jan 1, 2020 - Dec 31, 2020".to_string(),
        population_size: 64,
        loop_count: 3,
        generations_requested: 40,
        completed_loops: 1,
        completed_generations: 52,
        elapsed_time_last_gen: "12 seconds".to_string(),
        estimated_time_remaining: "13 minutes, 36 seconds".to_string(),
        estimated_completion: "2024-03-01T13:15:39Z".to_string(),
        sid,
        ..Default::default()
    }
}

/// Minimal stand-in for a simulator's status endpoint
pub struct FakeInstance {
    pub port: u16,
    pub task: JoinHandle<()>,
}

impl FakeInstance {
    pub async fn start(sid: i64) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let router = Router::new()
            .route("/status", get(move || async move { Json(snapshot(sid)) }))
            .route(
                "/stop",
                get(move || async move { Json(ShortResponse::success("Stopping after current generation").with_id(sid)) }),
            );

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { port, task }
    }

    /// Stop serving and release the port
    pub async fn kill(self) {
        self.task.abort();
        let _ = self.task.await;
    }
}
