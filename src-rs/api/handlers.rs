use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::ApiErr;
use crate::task::{LifecycleState, LogRecord, NewTaskInstance, TaskFilter, TaskInstance, TaskStore};
use crate::view::{classifier, detail, ViewModel};

const DEFAULT_LIST_LIMIT: usize = 25;

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub state: Option<String>,
    pub user: Option<String>,
    pub name: Option<String>,
}

impl ListQuery {
    fn filter(&self) -> TaskFilter {
        let present = |value: &Option<String>| value.clone().filter(|raw| !raw.trim().is_empty());
        TaskFilter {
            state: present(&self.state).map(|raw| LifecycleState::parse(&raw)),
            user: present(&self.user),
            name: present(&self.name),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskSummary {
    pub uuid: String,
    pub display_name: String,
    pub state: String,
    pub task_type: String,
    pub datetime_created: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StateRequest {
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct LogRequest {
    pub text: String,
}

pub async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

pub async fn handle_list(
    State(store): State<Arc<TaskStore>>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<TaskSummary>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let items = store
        .list(limit, &query.filter())
        .iter()
        .map(|task| TaskSummary {
            uuid: task.uuid.clone(),
            display_name: detail::display_name(task),
            state: task.state.to_string(),
            task_type: task.task_type.name.clone(),
            datetime_created: task.datetime_created,
        })
        .collect();
    Json(items)
}

pub async fn handle_create(
    State(store): State<Arc<TaskStore>>,
    Json(req): Json<NewTaskInstance>,
) -> Result<(StatusCode, Json<TaskInstance>), ApiErr> {
    let task = store.create(req)?;
    tracing::info!(uuid = %task.uuid, task_type = %task.task_type.name, "created task instance");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn handle_detail(
    State(store): State<Arc<TaskStore>>,
    Path(uuid): Path<String>,
) -> Result<Json<ViewModel>, ApiErr> {
    let task = store
        .get(&uuid)
        .ok_or_else(|| ApiErr::not_found(format!("no task instance with UUID {uuid} found")))?;
    let logs = store.logs(&uuid).unwrap_or_default();
    Ok(Json(ViewModel::build(&task, logs)))
}

pub async fn handle_rename(
    State(store): State<Arc<TaskStore>>,
    Path(uuid): Path<String>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<TaskInstance>, ApiErr> {
    let task = store.rename(&uuid, req.name)?;
    tracing::info!(uuid = %uuid, "renamed task instance");
    Ok(Json(task))
}

pub async fn handle_clone(
    State(store): State<Arc<TaskStore>>,
    Path(uuid): Path<String>,
) -> Result<(StatusCode, Json<TaskInstance>), ApiErr> {
    let task = store.clone_instance(&uuid)?;
    tracing::info!(source = %uuid, uuid = %task.uuid, "cloned task instance");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn handle_state(
    State(store): State<Arc<TaskStore>>,
    Path(uuid): Path<String>,
    Json(req): Json<StateRequest>,
) -> Result<Json<TaskInstance>, ApiErr> {
    if req.state.trim().is_empty() {
        return Err(ApiErr::bad_request("state required"));
    }
    let state = LifecycleState::parse(&req.state);
    if !classifier::is_known(&state) {
        return Err(ApiErr::bad_request(format!("unknown state: {}", req.state.trim())));
    }
    let task = store.override_state(&uuid, state)?;
    tracing::info!(uuid = %uuid, state = %task.state, "overrode task instance state");
    Ok(Json(task))
}

pub async fn handle_terminate(
    State(store): State<Arc<TaskStore>>,
    Path(uuid): Path<String>,
) -> Result<(StatusCode, Json<TaskInstance>), ApiErr> {
    let task = store.terminate(&uuid)?;
    tracing::info!(uuid = %uuid, "terminated task instance");
    Ok((StatusCode::ACCEPTED, Json(task)))
}

pub async fn handle_delete(
    State(store): State<Arc<TaskStore>>,
    Path(uuid): Path<String>,
) -> Result<Json<serde_json::Value>, ApiErr> {
    store.delete(&uuid)?;
    tracing::info!(uuid = %uuid, "deleted task instance");
    Ok(Json(json!({"deleted": uuid})))
}

pub async fn handle_append_log(
    State(store): State<Arc<TaskStore>>,
    Path((uuid, source)): Path<(String, String)>,
    Json(req): Json<LogRequest>,
) -> Result<Json<LogRecord>, ApiErr> {
    Ok(Json(store.append_log(&uuid, &source, &req.text)?))
}
