pub use crate::config::ServerConfig;
pub use crate::task::{LifecycleState, TaskInstance, TaskStore};
pub use crate::view::ViewModel;

pub mod error;
pub mod handlers;
pub mod server;
