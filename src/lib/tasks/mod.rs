pub mod docker;
pub mod runtime;
pub mod state;
pub mod types;
