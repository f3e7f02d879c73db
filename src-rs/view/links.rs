use serde::{Deserialize, Serialize};

use crate::task::{TaskClass, TaskInstance};

/// Administrative actions offered on the detail page, in menu order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Rename,
    Clone,
    OverrideState,
    Terminate,
    Delete,
}

impl ActionKind {
    pub const MENU: [ActionKind; 5] = [
        ActionKind::Rename,
        ActionKind::Clone,
        ActionKind::OverrideState,
        ActionKind::Terminate,
        ActionKind::Delete,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Rename => "Rename",
            Self::Clone => "Clone",
            Self::OverrideState => "Override state",
            Self::Terminate => "Terminate",
            Self::Delete => "Delete",
        }
    }

    /// Path segment of the action endpoint.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Rename => "rename",
            Self::Clone => "clone",
            Self::OverrideState => "state",
            Self::Terminate => "terminate",
            Self::Delete => "delete",
        }
    }
}

/// Routing collaborator: turns references into link targets.
pub trait LinkResolver {
    fn action(&self, kind: ActionKind, task: &TaskInstance) -> String;
    fn task_type(&self, task: &TaskInstance) -> String;
    fn task_queue(&self, task: &TaskInstance) -> String;
}

/// Action links into the HTTP API served by this crate. Task types and
/// queues live in the registry service, addressed through `registry_prefix`.
#[derive(Clone, Debug, Default)]
pub struct ApiLinks {
    pub prefix: String,
    pub registry_prefix: String,
}

impl ApiLinks {
    pub fn new(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/').to_string();
        Self {
            registry_prefix: prefix.clone(),
            prefix,
        }
    }

    pub fn with_registry(mut self, registry_prefix: &str) -> Self {
        self.registry_prefix = registry_prefix.trim_end_matches('/').to_string();
        self
    }
}

impl LinkResolver for ApiLinks {
    fn action(&self, kind: ActionKind, task: &TaskInstance) -> String {
        format!("{}/taskinstances/{}/{}", self.prefix, task.uuid, kind.slug())
    }

    fn task_type(&self, task: &TaskInstance) -> String {
        format!(
            "{}/{}/{}",
            self.registry_prefix,
            task_type_namespace(task.task_class),
            task.task_type.id
        )
    }

    fn task_queue(&self, task: &TaskInstance) -> String {
        format!("{}/taskqueues/{}", self.registry_prefix, task.task_queue.id)
    }
}

fn task_type_namespace(class: TaskClass) -> &'static str {
    match class {
        TaskClass::Executable => "executable-task-types",
        TaskClass::Container => "container-task-types",
    }
}
