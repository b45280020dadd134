pub mod manager;
pub mod types;

pub use manager::Manager;
pub use types::{ManagerError, ManagerResult};
