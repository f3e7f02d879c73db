use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub data_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            data_file: None,
            log_filter: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = env_opt("TASK_DETAIL_PORT")
            .or_else(|| env_opt("PORT"))
            .and_then(|raw| raw.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        Self {
            port,
            data_file: env_opt("TASK_DETAIL_DATA_FILE").map(PathBuf::from),
            log_filter: env_opt("TASK_DETAIL_LOG").unwrap_or(defaults.log_filter),
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}
