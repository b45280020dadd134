use std::{fmt, time::SystemTime};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    #[default]
    Pending,
    Scheduled,
    Running,
    Completed,
    Failed,
}

impl State {
    pub const ALL: [State; 5] = [
        State::Pending,
        State::Scheduled,
        State::Running,
        State::Completed,
        State::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            State::Pending => "Pending",
            State::Scheduled => "Scheduled",
            State::Running => "Running",
            State::Completed => "Completed",
            State::Failed => "Failed",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work and its lifecycle record.
///
/// The lifecycle fields (`state`, `container_id`, `start_time`, `finish_time`)
/// are private: they only move through the guarded methods in
/// [`crate::tasks::state`]. Runtime linkage is reported outward but never
/// read back from a request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub(super) state: State,
    pub image: String,
    pub cpu: f64,
    pub memory: u64,
    pub disk: u64,
    pub exposed_ports: Vec<u16>,
    pub env: Vec<String>,
    pub restart_policy: String,
    #[serde(skip_deserializing)]
    pub(super) container_id: Option<String>,
    #[serde(skip_deserializing)]
    pub(super) start_time: Option<SystemTime>,
    #[serde(skip_deserializing)]
    pub(super) finish_time: Option<SystemTime>,
}

impl Task {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Task {
            id: Uuid::new_v4(),
            name: name.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    /// Turns this value into an intent asking for `desired`.
    ///
    /// Intents are requests handed to a worker, never stored records; the
    /// worker checks them against its store before anything changes. Runtime
    /// linkage is dropped: only the worker's own runtime calls set it.
    pub fn into_intent(mut self, desired: State) -> Self {
        self.state = desired;
        self.container_id = None;
        self.start_time = None;
        self.finish_time = None;
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn container_id(&self) -> Option<&str> {
        self.container_id.as_deref()
    }

    pub fn start_time(&self) -> Option<SystemTime> {
        self.start_time
    }

    pub fn finish_time(&self) -> Option<SystemTime> {
        self.finish_time
    }
}

/// Envelope posted to a worker by whoever decides what should run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    pub id: Uuid,
    #[serde(default)]
    pub timestamp: Option<SystemTime>,
    pub task: Task,
}

impl TaskEvent {
    pub fn new(task: Task) -> Self {
        TaskEvent {
            id: Uuid::new_v4(),
            timestamp: Some(SystemTime::now()),
            task,
        }
    }
}

/// What the container runtime needs to start a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub name: String,
    pub attach_stdin: bool,
    pub attach_stdout: bool,
    pub attach_stderr: bool,
    pub exposed_ports: Vec<u16>,
    pub cmd: Vec<String>,
    pub image: String,
    pub cpu: f64,
    pub memory: u64,
    pub disk: u64,
    pub env: Vec<String>,
    pub restart_policy: String,
}

pub fn new_config(task: &Task) -> Config {
    let restart_policy = if task.restart_policy.is_empty() {
        "no".to_string()
    } else {
        task.restart_policy.clone()
    };

    Config {
        name: task.name.clone(),
        attach_stdin: false,
        attach_stdout: true,
        attach_stderr: true,
        exposed_ports: task.exposed_ports.clone(),
        image: task.image.clone(),
        cpu: task.cpu,
        memory: task.memory,
        disk: task.disk,
        env: task.env.clone(),
        restart_policy,
        ..Default::default()
    }
}
