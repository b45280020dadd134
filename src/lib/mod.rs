//! Worker node of the cube orchestrator: guards task lifecycle transitions
//! and drives a container runtime to realize them.

pub mod config;
pub mod manager;
pub mod scheduler;
pub mod tasks;
pub mod worker;
