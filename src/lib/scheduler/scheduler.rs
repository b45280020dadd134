use std::collections::HashMap;

use super::types::Node;
use crate::tasks::types::Task;

/// Placement seam: decides where a task should run.
///
/// Nothing implements this yet and the worker never consults it; a worker
/// only decides whether a requested transition is legal.
pub trait Scheduler {
    fn select_candidate_nodes(&self, task: &Task, nodes: &[Node]) -> Vec<Node>;

    /// Scores keyed by node name, higher is better.
    fn score(&self, task: &Task, candidates: &[Node]) -> HashMap<String, f64>;

    fn pick(&self, scores: &HashMap<String, f64>, candidates: &[Node]) -> Option<Node>;
}
