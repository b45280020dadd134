use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    queue::TaskQueue,
    store::TaskStore,
    types::{Dispatch, DispatchAction, DispatchOutcome, Worker, WorkerError, WorkerResult},
};
use crate::tasks::{
    runtime::{ContainerRuntime, RuntimeError, RuntimeOutput},
    state::check_transition,
    types::{State, Task, new_config},
};

impl Worker {
    pub fn new(name: &str, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Worker {
            name: name.to_string(),
            queue: TaskQueue::new(),
            db: TaskStore::new(),
            runtime,
            sysinfo: sysinfo::System::new(),
        }
    }

    pub fn add_task(&mut self, task: Task) {
        debug!(task_id = %task.id, state = %task.state(), "task queued");
        self.queue.enqueue(task);
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn get_tasks(&self) -> Vec<Task> {
        self.db.list()
    }

    pub fn get_task(&self, id: &Uuid) -> Option<&Task> {
        self.db.get(id)
    }

    pub fn task_count(&self) -> u64 {
        self.db.len() as u64
    }

    /// Takes the next intent off the queue and realizes it.
    ///
    /// Returns `Ok(None)` when the queue is empty. A task seen for the first
    /// time is recorded as-is before it is checked, so its own state is the
    /// "from" side of the transition.
    pub async fn process_one(&mut self) -> WorkerResult<Option<RuntimeOutput>> {
        let Some(dispatch) = self.next_dispatch()? else {
            return Ok(None);
        };
        let outcome = dispatch.execute().await;
        self.record(outcome).map(Some)
    }

    /// Dequeues and validates the next intent without touching the runtime.
    pub fn next_dispatch(&mut self) -> WorkerResult<Option<Dispatch>> {
        let Some(queued) = self.queue.dequeue() else {
            debug!(worker = %self.name, "no tasks in queue");
            return Ok(None);
        };
        let desired = queued.state();
        let intent = queued.into_intent(desired);

        let persisted_state = match self.db.get(&intent.id) {
            Some(persisted) => persisted.state(),
            None => {
                self.db.put(intent.clone());
                desired
            }
        };

        if let Err(err) = check_transition(persisted_state, desired) {
            warn!(task_id = %intent.id, error = %err, "rejecting task intent");
            return Err(err.into());
        }

        let action = match desired {
            State::Scheduled => {
                let config = new_config(&intent);
                DispatchAction::Start {
                    task: intent,
                    config,
                }
            }
            State::Completed => self.stop_action(&intent.id)?,
            other => {
                warn!(task_id = %intent.id, state = %other, "no runtime action for state");
                return Err(WorkerError::UnsupportedState(other));
            }
        };

        Ok(Some(Dispatch {
            runtime: self.runtime.clone(),
            action,
        }))
    }

    // Only the stored record names the container to stop.
    fn stop_action(&self, id: &Uuid) -> WorkerResult<DispatchAction> {
        let task = self
            .db
            .get(id)
            .cloned()
            .ok_or(WorkerError::MissingContainerId(*id))?;

        let Some(container_id) = task.container_id().map(str::to_owned) else {
            warn!(task_id = %task.id, "stop requested for task without a container");
            return Err(WorkerError::MissingContainerId(task.id));
        };

        Ok(DispatchAction::Stop { task, container_id })
    }

    /// Persists what the runtime did. A failed start is recorded as `Failed`;
    /// a failed stop leaves the stored record alone so the task still shows
    /// as needing teardown.
    pub fn record(&mut self, outcome: DispatchOutcome) -> WorkerResult<RuntimeOutput> {
        match outcome.action {
            DispatchAction::Start { mut task, .. } => {
                let started = outcome.result.and_then(|output| {
                    match output.container_id.clone().filter(|id| !id.is_empty()) {
                        Some(container_id) => Ok((container_id, output)),
                        None => Err(RuntimeError::Start {
                            container_id: String::new(),
                            message: "runtime reported no container id".to_string(),
                        }),
                    }
                });

                match started {
                    Ok((container_id, output)) => {
                        task.mark_running(container_id)?;
                        info!(
                            task_id = %task.id,
                            container_id = ?task.container_id(),
                            "task started"
                        );
                        self.db.put(task);
                        Ok(output)
                    }
                    Err(err) => {
                        error!(task_id = %task.id, error = %err, "task failed to start");
                        task.mark_failed()?;
                        self.db.put(task);
                        Err(err.into())
                    }
                }
            }
            DispatchAction::Stop {
                mut task,
                container_id,
            } => match outcome.result {
                Ok(output) => {
                    task.mark_completed()?;
                    info!(task_id = %task.id, container_id = %container_id, "task completed");
                    self.db.put(task);
                    Ok(output)
                }
                Err(err) => {
                    error!(
                        task_id = %task.id,
                        container_id = %container_id,
                        error = %err,
                        "task failed to stop"
                    );
                    Err(err.into())
                }
            },
        }
    }
}

impl Dispatch {
    /// Runs the runtime call. May block for seconds; hold no locks across it.
    pub async fn execute(self) -> DispatchOutcome {
        let result = match &self.action {
            DispatchAction::Start { config, .. } => self.runtime.run(config).await,
            DispatchAction::Stop { container_id, .. } => self.runtime.stop(container_id).await,
        };

        DispatchOutcome {
            action: self.action,
            result,
        }
    }
}

/// Drives the queue forever, sleeping `poll_interval` between rounds.
///
/// The worker lock is only held to dequeue and to record, so API handlers
/// can enqueue while a runtime call is in flight. This is the queue's only
/// consumer, so dispatches never overlap.
pub async fn run_tasks(worker: Arc<Mutex<Worker>>, poll_interval: Duration) {
    loop {
        let next = worker.lock().await.next_dispatch();

        match next {
            Ok(Some(dispatch)) => {
                let outcome = dispatch.execute().await;
                match worker.lock().await.record(outcome) {
                    Ok(output) => info!(
                        action = %output.action,
                        container_id = ?output.container_id,
                        "task processed"
                    ),
                    Err(err) => error!(error = %err, "task processing failed"),
                }
            }
            Ok(None) => {}
            Err(err) => error!(error = %err, "task processing failed"),
        }

        tokio::time::sleep(poll_interval).await;
    }
}
