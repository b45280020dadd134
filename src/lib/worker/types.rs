use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{queue::TaskQueue, store::TaskStore};
use crate::tasks::{
    runtime::{ContainerRuntime, RuntimeError, RuntimeOutput, RuntimeResult},
    state::InvalidTransition,
    types::{Config, State, Task},
};

/// Owns one intake queue and one task store, and drives the runtime for them.
pub struct Worker {
    pub name: String,
    pub(super) queue: TaskQueue,
    pub(super) db: TaskStore,
    pub(super) runtime: Arc<dyn ContainerRuntime>,
    pub(super) sysinfo: sysinfo::System,
}

/// A validated intent, ready for the runtime.
///
/// Built under the worker lock by [`Worker::next_dispatch`], executed without
/// it, and handed back to [`Worker::record`].
pub struct Dispatch {
    pub(super) runtime: Arc<dyn ContainerRuntime>,
    pub(super) action: DispatchAction,
}

pub(super) enum DispatchAction {
    Start { task: Task, config: Config },
    Stop { task: Task, container_id: String },
}

/// What the runtime did with a [`Dispatch`].
pub struct DispatchOutcome {
    pub(super) action: DispatchAction,
    pub(super) result: RuntimeResult<RuntimeOutput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub total_memory: u64,
    pub used_memory: u64,
    pub total_swap: u64,
    pub used_swap: u64,
    pub system_name: String,
    pub hostname: String,
    pub total_cpus: u64,
    pub disk_usage: f32,
    pub task_count: u64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkerError {
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("unsupported processing state {0}")]
    UnsupportedState(State),

    #[error("task {0} has no container to stop")]
    MissingContainerId(Uuid),
}

pub type WorkerResult<T> = Result<T, WorkerError>;
