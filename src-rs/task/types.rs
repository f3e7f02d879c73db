use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle state reported by the scheduler.
///
/// Values outside the known set are kept verbatim in `Unknown` so a newer
/// scheduler never breaks the detail page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LifecycleState {
    Created,
    Published,
    Running,
    Successful,
    Failed,
    Terminated,
    Unknown(String),
}

impl LifecycleState {
    pub const KNOWN: [LifecycleState; 6] = [
        LifecycleState::Created,
        LifecycleState::Published,
        LifecycleState::Running,
        LifecycleState::Successful,
        LifecycleState::Failed,
        LifecycleState::Terminated,
    ];

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "created" => Self::Created,
            "published" => Self::Published,
            "running" => Self::Running,
            "successful" => Self::Successful,
            "failed" => Self::Failed,
            "terminated" => Self::Terminated,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Published => "published",
            Self::Running => "running",
            Self::Successful => "successful",
            Self::Failed => "failed",
            Self::Terminated => "terminated",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for LifecycleState {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<LifecycleState> for String {
    fn from(state: LifecycleState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskClass {
    Executable,
    Container,
}

impl TaskClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Executable => "executable",
            Self::Container => "container",
        }
    }
}

/// A named reference to an entity owned by another collaborator
/// (task type, task queue).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: u64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    pub state: LifecycleState,
    #[serde(default)]
    pub user: Option<String>,
    pub task_class: TaskClass,
    pub task_type: EntityRef,
    pub task_queue: EntityRef,
    pub datetime_created: DateTime<Utc>,
    #[serde(default)]
    pub datetime_finished: Option<DateTime<Utc>>,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Request body for a new instance; identity, state and timestamps are
/// assigned by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTaskInstance {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    pub task_class: TaskClass,
    pub task_type: EntityRef,
    pub task_queue: EntityRef,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Raw log record as handed over by the log storage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_states_case_insensitively() {
        assert_eq!(LifecycleState::parse("Running"), LifecycleState::Running);
        assert_eq!(LifecycleState::parse(" failed "), LifecycleState::Failed);
    }

    #[test]
    fn unknown_state_keeps_raw_value() {
        let state = LifecycleState::parse("paused");
        assert_eq!(state, LifecycleState::Unknown("paused".to_string()));
        assert_eq!(state.as_str(), "paused");
    }

    #[test]
    fn state_serializes_as_plain_string() {
        let json = serde_json::to_string(&LifecycleState::Successful).unwrap();
        assert_eq!(json, "\"successful\"");
        let back: LifecycleState = serde_json::from_str("\"queued\"").unwrap();
        assert_eq!(back, LifecycleState::Unknown("queued".to_string()));
    }
}
