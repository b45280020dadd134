use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("no workers are available to handle tasks")]
    NoWorkersAvailable,

    #[error("worker communication failed: {0}")]
    WorkerCommunication(String),
}

pub type ManagerResult<T> = Result<T, ManagerError>;
