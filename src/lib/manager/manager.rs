use async_trait::async_trait;

use super::types::ManagerResult;
use crate::tasks::types::Task;

/// Cluster-level seam that would feed intents to workers.
///
/// No implementor exists; workers accept intents directly through
/// [`crate::worker::api`] or [`crate::worker::types::Worker::add_task`].
#[async_trait]
pub trait Manager: Send {
    fn add_task(&mut self, task: Task);

    /// Picks the worker address the next pending task goes to.
    fn select_worker(&mut self) -> ManagerResult<String>;

    /// Pulls task records back from workers and reconciles them.
    async fn update_tasks(&mut self) -> ManagerResult<()>;

    async fn send_work(&mut self) -> ManagerResult<()>;
}
