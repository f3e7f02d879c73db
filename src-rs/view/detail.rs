use serde::{Deserialize, Serialize};

use super::arguments::{self, SerializedArguments};
use super::classifier;
use super::links::{ActionKind, ApiLinks, LinkResolver};
use super::logs::{assemble, LogEntry};
use crate::error::SerializationError;
use crate::task::{LogRecord, TaskInstance};

const DISPLAY_UUID_CHARS: usize = 11;
const TRUNCATION_MARKER: &str = "…";
pub const NOT_FINISHED: &str = "not finished";
pub const ARGUMENTS_UNAVAILABLE: &str = "unable to display arguments";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLink {
    pub action: ActionKind,
    pub label: String,
    pub target: String,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArgumentsPanel {
    Empty,
    Pretty { text: String },
    Error { message: String },
}

/// One row of the key/value table. `link` is set for rows that point at
/// another entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRow {
    pub key: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub uuid: String,
    pub display_name: String,
    pub task_class: String,
    pub state: String,
    pub actions: Vec<ActionLink>,
    pub details: Vec<DetailRow>,
    pub created: String,
    pub finished: String,
    pub arguments: ArgumentsPanel,
    pub logs: Vec<LogEntry>,
}

impl ViewModel {
    pub fn build<I, S>(task: &TaskInstance, logs: I) -> Self
    where
        I: IntoIterator<Item = (S, LogRecord)>,
        S: Into<String>,
    {
        Self::build_with(task, logs, &ApiLinks::default())
    }

    pub fn build_with<I, S>(task: &TaskInstance, logs: I, links: &dyn LinkResolver) -> Self
    where
        I: IntoIterator<Item = (S, LogRecord)>,
        S: Into<String>,
    {
        if !classifier::is_known(&task.state) {
            tracing::warn!(uuid = %task.uuid, state = %task.state, "unrecognized task state, treating as active");
        }

        let created = task.datetime_created.to_rfc3339();
        let finished = match &task.datetime_finished {
            Some(at) => at.to_rfc3339(),
            None => NOT_FINISHED.to_string(),
        };

        let details = vec![
            row("User", task.user.clone().unwrap_or_default(), None),
            row("State", task.state.to_string(), None),
            row("Task type", task.task_type.name.clone(), Some(links.task_type(task))),
            row("Task queue", task.task_queue.name.clone(), Some(links.task_queue(task))),
            row("Created", created.clone(), None),
            row("Finished", finished.clone(), None),
        ];

        Self {
            uuid: task.uuid.clone(),
            display_name: display_name(task),
            task_class: task.task_class.as_str().to_string(),
            state: task.state.to_string(),
            actions: action_links(task, links)
                .into_iter()
                .filter(|link| link.enabled)
                .collect(),
            details,
            created,
            finished,
            arguments: arguments_panel(&task.uuid, arguments::serialize(task.arguments.as_ref())),
            logs: assemble(logs),
        }
    }
}

/// The instance name, or the head of its uuid when it has none.
pub fn display_name(task: &TaskInstance) -> String {
    if let Some(name) = task.name.as_deref().filter(|name| !name.trim().is_empty()) {
        return name.to_string();
    }
    if task.uuid.chars().count() <= DISPLAY_UUID_CHARS {
        return task.uuid.clone();
    }
    let head: String = task.uuid.chars().take(DISPLAY_UUID_CHARS).collect();
    format!("{head}{TRUNCATION_MARKER}")
}

/// Every menu action with `enabled` derived from the task state.
pub fn action_links(task: &TaskInstance, links: &dyn LinkResolver) -> Vec<ActionLink> {
    ActionKind::MENU
        .iter()
        .map(|kind| ActionLink {
            action: *kind,
            label: kind.label().to_string(),
            target: links.action(*kind, task),
            enabled: match kind {
                ActionKind::Terminate => classifier::can_terminate(&task.state),
                _ => true,
            },
        })
        .collect()
}

/// Maps a serialization outcome onto the panel; failures become an inline
/// placeholder rather than failing the page.
pub fn arguments_panel(
    uuid: &str,
    serialized: Result<SerializedArguments, SerializationError>,
) -> ArgumentsPanel {
    match serialized {
        Ok(out) if out.present => ArgumentsPanel::Pretty { text: out.pretty },
        Ok(_) => ArgumentsPanel::Empty,
        Err(err) => {
            tracing::warn!(uuid = %uuid, "{err}");
            ArgumentsPanel::Error {
                message: ARGUMENTS_UNAVAILABLE.to_string(),
            }
        }
    }
}

fn row(key: &str, value: String, link: Option<String>) -> DetailRow {
    DetailRow {
        key: key.to_string(),
        value,
        link,
    }
}
