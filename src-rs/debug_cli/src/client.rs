use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::models::{DetailPage, TaskInfo, TaskSummary};

pub struct HTTPClient {
    pub base_url: String,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn list(&self, limit: usize) -> Result<Vec<TaskSummary>, String> {
        let url = format!("{}/taskinstances?limit={}", self.base_url, limit);
        send(self.client.get(url))
    }

    pub fn detail(&self, uuid: &str) -> Result<DetailPage, String> {
        send(self.client.get(self.instance_url(uuid, "")))
    }

    pub fn rename(&self, uuid: &str, name: Option<&str>) -> Result<TaskInfo, String> {
        send(
            self.client
                .patch(self.instance_url(uuid, "/rename"))
                .json(&json!({ "name": name })),
        )
    }

    pub fn clone_instance(&self, uuid: &str) -> Result<TaskInfo, String> {
        send(self.client.post(self.instance_url(uuid, "/clone")))
    }

    pub fn override_state(&self, uuid: &str, state: &str) -> Result<TaskInfo, String> {
        send(
            self.client
                .patch(self.instance_url(uuid, "/state"))
                .json(&json!({ "state": state })),
        )
    }

    pub fn terminate(&self, uuid: &str) -> Result<TaskInfo, String> {
        send(self.client.post(self.instance_url(uuid, "/terminate")))
    }

    pub fn delete(&self, uuid: &str) -> Result<serde_json::Value, String> {
        send(self.client.post(self.instance_url(uuid, "/delete")))
    }

    fn instance_url(&self, uuid: &str, suffix: &str) -> String {
        format!("{}/taskinstances/{}{}", self.base_url, uuid, suffix)
    }
}

fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, String> {
    let resp = req.send().map_err(|err| err.to_string())?;
    if resp.status().is_success() {
        resp.json::<T>().map_err(|err| err.to_string())
    } else {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("error").and_then(|v| v.as_str()).map(str::to_string))
            .unwrap_or(body);
        Err(format!("http {}: {}", status.as_u16(), message))
    }
}
