use std::sync::Arc;

use task_detail_rs::api::server::DetailServer;
use task_detail_rs::config::ServerConfig;
use task_detail_rs::task::TaskStore;

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    let store = match &config.data_file {
        Some(path) => match TaskStore::open(path.clone()) {
            Ok(store) => {
                tracing::info!("task store backed by {}", path.display());
                store
            }
            Err(err) => {
                tracing::error!("failed to load {}: {err}", path.display());
                return;
            }
        },
        None => {
            tracing::warn!("TASK_DETAIL_DATA_FILE not set, task store is in-memory only");
            TaskStore::new(None)
        }
    };

    let server = DetailServer::new(config.port, Some(Arc::new(store)));
    if let Err(err) = server.start().await {
        tracing::error!("server error: {err}");
    }
}
