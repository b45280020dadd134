use std::time::SystemTime;

use thiserror::Error;

use super::types::{State, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid state transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: State,
    pub to: State,
}

/// States reachable from `src` in one step. Terminal states return an empty slice.
pub fn allowed_states(src: State) -> &'static [State] {
    match src {
        State::Pending => &[State::Scheduled],
        State::Scheduled => &[State::Scheduled, State::Running, State::Failed],
        State::Running => &[State::Running, State::Completed, State::Failed],
        State::Completed => &[],
        State::Failed => &[],
    }
}

pub fn valid_state_transition(src: State, dst: State) -> bool {
    allowed_states(src).contains(&dst)
}

pub fn check_transition(src: State, dst: State) -> Result<(), InvalidTransition> {
    if valid_state_transition(src, dst) {
        Ok(())
    } else {
        Err(InvalidTransition { from: src, to: dst })
    }
}

impl Task {
    /// Moves the task to `new_state` if the transition table allows it.
    /// On error the task is left untouched.
    pub fn transition_state(&mut self, new_state: State) -> Result<(), InvalidTransition> {
        check_transition(self.state, new_state)?;
        self.state = new_state;
        Ok(())
    }

    pub fn mark_running(&mut self, container_id: String) -> Result<(), InvalidTransition> {
        self.transition_state(State::Running)?;
        self.container_id = Some(container_id);
        self.start_time.get_or_insert_with(SystemTime::now);
        Ok(())
    }

    pub fn mark_completed(&mut self) -> Result<(), InvalidTransition> {
        self.transition_state(State::Completed)?;
        self.finish_time.get_or_insert_with(SystemTime::now);
        Ok(())
    }

    pub fn mark_failed(&mut self) -> Result<(), InvalidTransition> {
        self.transition_state(State::Failed)
    }
}
