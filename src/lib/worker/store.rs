use std::collections::HashMap;

use uuid::Uuid;

use crate::tasks::types::Task;

/// Last recorded snapshot of every task a worker has seen. Last write wins.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: HashMap<Uuid, Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &Uuid) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Overwrites whatever is recorded under the task's id.
    pub fn put(&mut self, task: Task) -> Option<Task> {
        self.tasks.insert(task.id, task)
    }

    pub fn list(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
