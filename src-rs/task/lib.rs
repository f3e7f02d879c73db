pub mod store;
pub mod types;

pub use store::{StoredInstance, TaskFilter, TaskStore};
pub use types::{EntityRef, LifecycleState, LogRecord, NewTaskInstance, TaskClass, TaskInstance};
