use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use super::types::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeAction {
    Start,
    Stop,
}

impl fmt::Display for RuntimeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeAction::Start => f.write_str("start"),
            RuntimeAction::Stop => f.write_str("stop"),
        }
    }
}

/// Successful outcome of a runtime call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOutput {
    pub action: RuntimeAction,
    pub container_id: Option<String>,
    pub result: String,
}

impl RuntimeOutput {
    pub fn success(action: RuntimeAction, container_id: impl Into<String>) -> Self {
        RuntimeOutput {
            action,
            container_id: Some(container_id.into()),
            result: "success".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("failed to connect to container runtime: {0}")]
    Connection(String),

    #[error("failed to pull image {image}: {message}")]
    ImagePull { image: String, message: String },

    #[error("failed to create container from image {image}: {message}")]
    Create { image: String, message: String },

    #[error("failed to start container {container_id}: {message}")]
    Start { container_id: String, message: String },

    #[error("failed to stop container {container_id}: {message}")]
    Stop { container_id: String, message: String },

    #[error("failed to remove container {container_id}: {message}")]
    Remove { container_id: String, message: String },
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// The isolated-process backend a worker drives.
///
/// Calls may block for seconds (image pulls, container teardown). Nothing
/// here retries or times out; callers wanting a deadline wrap the call.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Creates and starts a container for `config`, returning its id.
    async fn run(&self, config: &Config) -> RuntimeResult<RuntimeOutput>;

    /// Stops and removes the container, along with its anonymous volumes.
    async fn stop(&self, container_id: &str) -> RuntimeResult<RuntimeOutput>;
}
