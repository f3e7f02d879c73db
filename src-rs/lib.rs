pub mod config;
pub mod error;

#[path = "task/lib.rs"]
pub mod task;
#[path = "view/lib.rs"]
pub mod view;
#[path = "api/lib.rs"]
pub mod api;

pub use config::ServerConfig;
pub use error::{SerializationError, StoreError};
pub use task::{LifecycleState, TaskInstance, TaskStore};
pub use view::ViewModel;
