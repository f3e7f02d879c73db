use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::api::handlers::{
    handle_append_log, handle_clone, handle_create, handle_delete, handle_detail, handle_health,
    handle_list, handle_rename, handle_state, handle_terminate,
};
use crate::task::TaskStore;

pub struct DetailServer {
    pub port: u16,
    pub store: Arc<TaskStore>,
}

impl DetailServer {
    pub fn new(port: u16, store: Option<Arc<TaskStore>>) -> Self {
        let store = store.unwrap_or_else(|| Arc::new(TaskStore::new(None)));
        Self { port, store }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handle_health))
            .route("/taskinstances", get(handle_list).post(handle_create))
            .route("/taskinstances/:uuid", get(handle_detail))
            .route("/taskinstances/:uuid/rename", patch(handle_rename))
            .route("/taskinstances/:uuid/clone", post(handle_clone))
            .route("/taskinstances/:uuid/state", patch(handle_state))
            .route("/taskinstances/:uuid/terminate", post(handle_terminate))
            .route("/taskinstances/:uuid/delete", post(handle_delete))
            .route("/taskinstances/:uuid/logs/:source", post(handle_append_log))
            .with_state(self.store.clone())
    }

    pub async fn start(&self) -> Result<(), String> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        tracing::info!("task detail service listening on {addr}");
        axum::Server::bind(&addr)
            .serve(self.router().into_make_service())
            .await
            .map_err(|err| err.to_string())
    }
}
