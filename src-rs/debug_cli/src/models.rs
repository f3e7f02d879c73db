use serde::Deserialize;

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub color: bool,
}

#[derive(Debug, Deserialize)]
pub struct TaskSummary {
    pub uuid: String,
    pub display_name: String,
    pub state: String,
    pub task_type: String,
    pub datetime_created: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionLink {
    pub label: String,
    pub target: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailRow {
    pub key: String,
    pub value: String,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArgumentsPanel {
    Empty,
    Pretty { text: String },
    Error { message: String },
}

#[derive(Debug, Deserialize)]
pub struct LogEntry {
    pub name: String,
    pub last_modified: Option<String>,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailPage {
    pub uuid: String,
    pub display_name: String,
    pub task_class: String,
    pub state: String,
    pub actions: Vec<ActionLink>,
    pub details: Vec<DetailRow>,
    pub arguments: ArgumentsPanel,
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TaskInfo {
    pub uuid: String,
    pub name: Option<String>,
    pub state: String,
}
