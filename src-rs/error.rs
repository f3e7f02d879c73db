#[derive(Debug, thiserror::Error)]
#[error("arguments cannot be serialized: {0}")]
pub struct SerializationError(#[from] pub serde_json::Error);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task instance not found: {0}")]
    NotFound(String),

    #[error("task instance {0} already finished")]
    AlreadyFinished(String),

    #[error("task instance already exists: {0}")]
    Duplicate(String),

    #[error("store lock poisoned")]
    Lock,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
