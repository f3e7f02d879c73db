use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockWriteGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::types::{LifecycleState, LogRecord, NewTaskInstance, TaskInstance};
use crate::error::StoreError;
use crate::view::classifier;

type TaskMap = HashMap<String, StoredInstance>;

/// An instance together with its log sources, in insertion order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredInstance {
    pub instance: TaskInstance,
    #[serde(default)]
    pub logs: Vec<(String, LogRecord)>,
}

/// List filters; unset fields match everything.
#[derive(Clone, Debug, Default)]
pub struct TaskFilter {
    pub state: Option<LifecycleState>,
    pub user: Option<String>,
    /// Substring of the instance name.
    pub name: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &TaskInstance) -> bool {
        if let Some(state) = &self.state {
            if &task.state != state {
                return false;
            }
        }
        if let Some(user) = &self.user {
            if task.user.as_deref() != Some(user.as_str()) {
                return false;
            }
        }
        if let Some(name) = &self.name {
            match &task.name {
                Some(task_name) if task_name.contains(name.as_str()) => {}
                _ => return false,
            }
        }
        true
    }
}

pub struct TaskStore {
    path: Option<PathBuf>,
    tasks: RwLock<TaskMap>,
}

impl TaskStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Builds a store persisting to `path`, seeded from it when it exists.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let store = Self::new(Some(path.clone()));
        if path.exists() {
            let items = Self::load_from_disk(&path)?;
            let mut map = store.write()?;
            for item in items {
                map.insert(item.instance.uuid.clone(), item);
            }
            drop(map);
        }
        Ok(store)
    }

    /// Registers a new instance in `created` state under a fresh uuid.
    pub fn create(&self, draft: NewTaskInstance) -> Result<TaskInstance, StoreError> {
        let instance = TaskInstance {
            uuid: uuid::Uuid::new_v4().to_string(),
            name: draft.name.filter(|value| !value.trim().is_empty()),
            state: LifecycleState::Created,
            user: draft.user,
            task_class: draft.task_class,
            task_type: draft.task_type,
            task_queue: draft.task_queue,
            datetime_created: Utc::now(),
            datetime_finished: None,
            arguments: draft.arguments,
        };
        self.insert(instance.clone())?;
        Ok(instance)
    }

    pub fn insert(&self, instance: TaskInstance) -> Result<(), StoreError> {
        self.insert_with_logs(instance, Vec::new())
    }

    pub fn insert_with_logs(
        &self,
        instance: TaskInstance,
        logs: Vec<(String, LogRecord)>,
    ) -> Result<(), StoreError> {
        let mut map = self.write()?;
        if map.contains_key(&instance.uuid) {
            return Err(StoreError::Duplicate(instance.uuid));
        }
        map.insert(instance.uuid.clone(), StoredInstance { instance, logs });
        self.persist(&map);
        Ok(())
    }

    pub fn get(&self, uuid: &str) -> Option<TaskInstance> {
        let map = self.tasks.read().ok()?;
        map.get(uuid).map(|item| item.instance.clone())
    }

    pub fn logs(&self, uuid: &str) -> Option<Vec<(String, LogRecord)>> {
        let map = self.tasks.read().ok()?;
        map.get(uuid).map(|item| item.logs.clone())
    }

    pub fn list(&self, limit: usize, filter: &TaskFilter) -> Vec<TaskInstance> {
        let map = match self.tasks.read() {
            Ok(lock) => lock,
            Err(_) => return vec![],
        };
        let mut items: Vec<TaskInstance> = map
            .values()
            .filter(|item| filter.matches(&item.instance))
            .map(|item| item.instance.clone())
            .collect();
        items.sort_by(|a, b| b.datetime_created.cmp(&a.datetime_created));
        items.truncate(limit);
        items
    }

    pub fn rename(&self, uuid: &str, name: Option<String>) -> Result<TaskInstance, StoreError> {
        let name = name.filter(|value| !value.trim().is_empty());
        self.modify(uuid, |task| {
            task.name = name;
            Ok(())
        })
    }

    /// Overrides the state; entering a terminal state stamps the finish time,
    /// leaving one clears it.
    pub fn override_state(&self, uuid: &str, state: LifecycleState) -> Result<TaskInstance, StoreError> {
        self.modify(uuid, |task| {
            if classifier::is_terminal(&state) {
                if !classifier::is_terminal(&task.state) || task.datetime_finished.is_none() {
                    task.datetime_finished = Some(Utc::now());
                }
            } else {
                task.datetime_finished = None;
            }
            task.state = state;
            Ok(())
        })
    }

    pub fn terminate(&self, uuid: &str) -> Result<TaskInstance, StoreError> {
        self.modify(uuid, |task| {
            if !classifier::can_terminate(&task.state) {
                return Err(StoreError::AlreadyFinished(task.uuid.clone()));
            }
            task.state = LifecycleState::Terminated;
            task.datetime_finished = Some(Utc::now());
            Ok(())
        })
    }

    /// Copies an instance under a fresh uuid, ready to be scheduled again.
    pub fn clone_instance(&self, uuid: &str) -> Result<TaskInstance, StoreError> {
        let mut map = self.write()?;
        let source = map
            .get(uuid)
            .ok_or_else(|| StoreError::NotFound(uuid.to_string()))?;
        let copy = TaskInstance {
            uuid: uuid::Uuid::new_v4().to_string(),
            state: LifecycleState::Created,
            datetime_created: Utc::now(),
            datetime_finished: None,
            ..source.instance.clone()
        };
        map.insert(
            copy.uuid.clone(),
            StoredInstance {
                instance: copy.clone(),
                logs: Vec::new(),
            },
        );
        self.persist(&map);
        Ok(copy)
    }

    pub fn delete(&self, uuid: &str) -> Result<TaskInstance, StoreError> {
        let mut map = self.write()?;
        let removed = map
            .remove(uuid)
            .ok_or_else(|| StoreError::NotFound(uuid.to_string()))?;
        self.persist(&map);
        Ok(removed.instance)
    }

    /// Appends output to a log source, creating the source on first write.
    pub fn append_log(&self, uuid: &str, source: &str, text: &str) -> Result<LogRecord, StoreError> {
        let mut map = self.write()?;
        let item = map
            .get_mut(uuid)
            .ok_or_else(|| StoreError::NotFound(uuid.to_string()))?;
        let idx = match item.logs.iter().position(|(name, _)| name == source) {
            Some(idx) => idx,
            None => {
                item.logs.push((source.to_string(), LogRecord::default()));
                item.logs.len() - 1
            }
        };
        let record = &mut item.logs[idx].1;
        record.text.get_or_insert_with(String::new).push_str(text);
        record.last_modified = Some(Utc::now());
        let record = record.clone();
        self.persist(&map);
        Ok(record)
    }

    pub fn load_from_disk(path: &Path) -> Result<Vec<StoredInstance>, StoreError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str::<Vec<StoredInstance>>(&data)?)
    }

    fn modify<F>(&self, uuid: &str, apply: F) -> Result<TaskInstance, StoreError>
    where
        F: FnOnce(&mut TaskInstance) -> Result<(), StoreError>,
    {
        let mut map = self.write()?;
        let item = map
            .get_mut(uuid)
            .ok_or_else(|| StoreError::NotFound(uuid.to_string()))?;
        apply(&mut item.instance)?;
        let updated = item.instance.clone();
        self.persist(&map);
        Ok(updated)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, TaskMap>, StoreError> {
        self.tasks.write().map_err(|_| StoreError::Lock)
    }

    /// Must be called with the write lock held.
    fn persist(&self, map: &TaskMap) {
        let path = match &self.path {
            Some(path) => path,
            None => return,
        };
        if let Err(err) = save(path, map) {
            tracing::error!("persist task store to {}: {err}", path.display());
        }
    }
}

/// Replaces the file atomically through a sibling temp file.
fn save(path: &Path, map: &TaskMap) -> Result<(), StoreError> {
    let mut list: Vec<&StoredInstance> = map.values().collect();
    list.sort_by(|a, b| a.instance.datetime_created.cmp(&b.instance.datetime_created));
    let serialized = serde_json::to_string_pretty(&list)?;
    let tmp = temp_path(path);
    fs::write(&tmp, serialized)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::task::types::{EntityRef, NewTaskInstance, TaskClass};

    fn instance(uuid: &str, state: LifecycleState) -> TaskInstance {
        TaskInstance {
            uuid: uuid.to_string(),
            name: Some("nightly build".to_string()),
            state,
            user: Some("admin".to_string()),
            task_class: TaskClass::Executable,
            task_type: EntityRef { id: 3, name: "compile".to_string() },
            task_queue: EntityRef { id: 1, name: "default".to_string() },
            datetime_created: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            datetime_finished: None,
            arguments: Some(json!({"target": "release"})),
        }
    }

    #[test]
    fn insert_rejects_duplicate_uuid() {
        let store = TaskStore::new(None);
        store.insert(instance("a", LifecycleState::Running)).unwrap();
        let err = store.insert(instance("a", LifecycleState::Running)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(uuid) if uuid == "a"));
    }

    #[test]
    fn list_is_newest_first_and_limited() {
        let store = TaskStore::new(None);
        for (idx, uuid) in ["a", "b", "c"].iter().enumerate() {
            let mut task = instance(uuid, LifecycleState::Created);
            task.datetime_created = Utc.with_ymd_and_hms(2024, 5, 1 + idx as u32, 0, 0, 0).unwrap();
            store.insert(task).unwrap();
        }
        let uuids: Vec<String> = store.list(2, &TaskFilter::default()).into_iter().map(|task| task.uuid).collect();
        assert_eq!(uuids, vec!["c".to_string(), "b".to_string()]);
    }

    #[test]
    fn list_applies_filters() {
        let store = TaskStore::new(None);
        store.insert(instance("a", LifecycleState::Running)).unwrap();
        let mut other = instance("b", LifecycleState::Failed);
        other.name = Some("weekly export".to_string());
        other.user = Some("bob".to_string());
        store.insert(other).unwrap();

        let by_state = TaskFilter {
            state: Some(LifecycleState::Failed),
            ..TaskFilter::default()
        };
        let uuids: Vec<String> = store.list(10, &by_state).into_iter().map(|task| task.uuid).collect();
        assert_eq!(uuids, vec!["b".to_string()]);

        let by_user = TaskFilter {
            user: Some("admin".to_string()),
            ..TaskFilter::default()
        };
        assert_eq!(store.list(10, &by_user)[0].uuid, "a");

        let by_name = TaskFilter {
            name: Some("export".to_string()),
            ..TaskFilter::default()
        };
        assert_eq!(store.list(10, &by_name)[0].uuid, "b");

        let nothing = TaskFilter {
            name: Some("export".to_string()),
            user: Some("admin".to_string()),
            ..TaskFilter::default()
        };
        assert!(store.list(10, &nothing).is_empty());
    }

    #[test]
    fn create_assigns_identity_and_initial_state() {
        let store = TaskStore::new(None);
        let task = store
            .create(NewTaskInstance {
                name: Some(" ".to_string()),
                user: Some("admin".to_string()),
                task_class: TaskClass::Container,
                task_type: EntityRef { id: 2, name: "transcode".to_string() },
                task_queue: EntityRef { id: 1, name: "default".to_string() },
                arguments: Some(json!({"codec": "av1"})),
            })
            .unwrap();
        assert!(uuid::Uuid::parse_str(&task.uuid).is_ok());
        assert_eq!(task.state, LifecycleState::Created);
        assert_eq!(task.name, None);
        assert_eq!(task.datetime_finished, None);
        assert_eq!(store.get(&task.uuid), Some(task));
    }

    #[test]
    fn rename_clears_blank_names() {
        let store = TaskStore::new(None);
        store.insert(instance("a", LifecycleState::Running)).unwrap();
        assert_eq!(store.rename("a", Some("deploy".into())).unwrap().name.as_deref(), Some("deploy"));
        assert_eq!(store.rename("a", Some("   ".into())).unwrap().name, None);
    }

    #[test]
    fn terminate_refuses_finished_instances() {
        let store = TaskStore::new(None);
        store.insert(instance("a", LifecycleState::Running)).unwrap();
        store.insert(instance("b", LifecycleState::Successful)).unwrap();

        let terminated = store.terminate("a").unwrap();
        assert_eq!(terminated.state, LifecycleState::Terminated);
        assert!(terminated.datetime_finished.is_some());

        assert!(matches!(store.terminate("b"), Err(StoreError::AlreadyFinished(_))));
        assert!(matches!(store.terminate("missing"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn terminate_allows_unknown_states() {
        let store = TaskStore::new(None);
        store.insert(instance("a", LifecycleState::parse("stuck"))).unwrap();
        assert_eq!(store.terminate("a").unwrap().state, LifecycleState::Terminated);
    }

    #[test]
    fn override_state_tracks_finish_time() {
        let store = TaskStore::new(None);
        store.insert(instance("a", LifecycleState::Running)).unwrap();

        let failed = store.override_state("a", LifecycleState::Failed).unwrap();
        assert!(failed.datetime_finished.is_some());

        let rerun = store.override_state("a", LifecycleState::Published).unwrap();
        assert_eq!(rerun.state, LifecycleState::Published);
        assert!(rerun.datetime_finished.is_none());
    }

    #[test]
    fn clone_copies_definition_but_not_progress() {
        let store = TaskStore::new(None);
        let mut source = instance("a", LifecycleState::Failed);
        source.datetime_finished = Some(Utc::now());
        store
            .insert_with_logs(source.clone(), vec![("stdout".to_string(), LogRecord::default())])
            .unwrap();

        let copy = store.clone_instance("a").unwrap();
        assert_ne!(copy.uuid, source.uuid);
        assert_eq!(copy.state, LifecycleState::Created);
        assert_eq!(copy.datetime_finished, None);
        assert_eq!(copy.arguments, source.arguments);
        assert_eq!(copy.task_type, source.task_type);
        assert_eq!(store.logs(&copy.uuid), Some(vec![]));
    }

    #[test]
    fn delete_removes_instance() {
        let store = TaskStore::new(None);
        store.insert(instance("a", LifecycleState::Running)).unwrap();
        assert_eq!(store.delete("a").unwrap().uuid, "a");
        assert!(store.get("a").is_none());
        assert!(matches!(store.delete("a"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn append_log_preserves_source_order() {
        let store = TaskStore::new(None);
        store.insert(instance("a", LifecycleState::Running)).unwrap();
        store.append_log("a", "stdout", "hello ").unwrap();
        store.append_log("a", "stderr", "warn").unwrap();
        let record = store.append_log("a", "stdout", "world").unwrap();
        assert_eq!(record.text.as_deref(), Some("hello world"));
        assert!(record.last_modified.is_some());

        let names: Vec<String> = store.logs("a").unwrap().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["stdout".to_string(), "stderr".to_string()]);
    }

    #[test]
    fn persists_and_reloads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");

        let store = TaskStore::open(path.clone()).unwrap();
        store.insert(instance("a", LifecycleState::Running)).unwrap();
        store.append_log("a", "stdout", "line").unwrap();
        drop(store);

        let reopened = TaskStore::open(path).unwrap();
        let task = reopened.get("a").unwrap();
        assert_eq!(task.state, LifecycleState::Running);
        let logs = reopened.logs("a").unwrap();
        assert_eq!(logs[0].1.text.as_deref(), Some("line"));
    }

    #[test]
    fn concurrent_writes_leave_latest_snapshot_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let store = std::sync::Arc::new(TaskStore::open(path.clone()).unwrap());
        store.insert(instance("a", LifecycleState::Running)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for line in 0..20 {
                        store
                            .append_log("a", &format!("worker-{worker}"), &format!("{line}\n"))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let reopened = TaskStore::open(path.clone()).unwrap();
        assert_eq!(reopened.logs("a"), store.logs("a"));
        assert!(!temp_path(&path).exists());
    }
}
