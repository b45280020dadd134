use std::collections::VecDeque;

use crate::tasks::types::Task;

/// FIFO of task intents waiting for the dispatch loop.
#[derive(Debug, Default)]
pub struct TaskQueue {
    items: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, intent: Task) {
        self.items.push_back(intent);
    }

    pub fn dequeue(&mut self) -> Option<Task> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
