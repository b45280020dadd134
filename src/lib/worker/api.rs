use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::StatusCode,
    routing::{delete, get},
};
use tokio::{net::TcpListener, sync::Mutex};
use tracing::info;
use uuid::Uuid;

use super::types::{SystemStats, Worker};
use crate::tasks::types::{State, Task, TaskEvent};

pub type SharedWorker = Arc<Mutex<Worker>>;

/// HTTP front of a worker. Handlers only touch the queue and the store;
/// runtime calls happen in the dispatch loop.
pub struct TaskServer {
    pub worker: SharedWorker,
    pub address: String,
    pub port: u16,
}

pub fn router(worker: SharedWorker) -> Router {
    Router::new()
        .route("/tasks", get(get_tasks).post(start_task))
        .route("/tasks/{id}", delete(stop_task))
        .route("/stats", get(get_stats))
        .with_state(worker)
}

async fn get_tasks(AxumState(worker): AxumState<SharedWorker>) -> Json<Vec<Task>> {
    Json(worker.lock().await.get_tasks())
}

async fn start_task(
    AxumState(worker): AxumState<SharedWorker>,
    Json(event): Json<TaskEvent>,
) -> (StatusCode, Json<Task>) {
    info!(event_id = %event.id, task_id = %event.task.id, "task event received");
    worker.lock().await.add_task(event.task.clone());
    (StatusCode::CREATED, Json(event.task))
}

async fn stop_task(
    AxumState(worker): AxumState<SharedWorker>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut worker = worker.lock().await;
    let Some(task) = worker.get_task(&id).cloned() else {
        return Err((StatusCode::NOT_FOUND, format!("task {} not found", id)));
    };

    worker.add_task(task.into_intent(State::Completed));
    info!(task_id = %id, "task queued to stop");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_stats(AxumState(worker): AxumState<SharedWorker>) -> Json<SystemStats> {
    Json(worker.lock().await.collect_stats())
}

impl TaskServer {
    pub fn new(worker: SharedWorker, address: &str, port: u16) -> Self {
        Self {
            worker,
            address: address.to_string(),
            port,
        }
    }

    pub async fn start_server(self) -> std::io::Result<()> {
        let addr = format!("{}:{}", self.address, self.port);
        let listener = TcpListener::bind(&addr).await?;
        info!(%addr, "worker API listening");

        axum::serve(listener, router(self.worker)).await
    }
}
