pub mod api;
pub mod queue;
pub mod stats;
pub mod store;
pub mod types;
pub mod worker;
