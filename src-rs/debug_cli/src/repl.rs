use std::io;

use crate::client::HTTPClient;
use crate::models::CLIConfig;
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub client: HTTPClient,
}

impl REPL {
    pub fn new(config: CLIConfig, client: HTTPClient) -> Self {
        Self { config, client }
    }

    pub fn run(&mut self) {
        render::banner(&self.config);
        loop {
            render::prompt();
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if !line.starts_with('/') {
                render::info("commands start with /, type /help");
                continue;
            }
            if self.handle_command(&line) {
                break;
            }
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        let mut args = rest.splitn(2, ' ');
        let uuid = args.next().unwrap_or("").trim();
        let arg = args.next().map(str::trim).filter(|value| !value.is_empty());

        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "list" => {
                let limit = rest.parse::<usize>().unwrap_or(25);
                match self.client.list(limit) {
                    Ok(items) => render::list(&items),
                    Err(err) => render::error(&err),
                }
            }
            "show" | "rename" | "clone" | "state" | "terminate" | "delete" if uuid.is_empty() => {
                render::error("uuid required");
            }
            "show" => self.show(uuid),
            "rename" => match self.client.rename(uuid, arg) {
                Ok(task) => render::task(&task),
                Err(err) => render::error(&err),
            },
            "clone" => match self.client.clone_instance(uuid) {
                Ok(task) => {
                    render::info("cloned as:");
                    render::task(&task);
                }
                Err(err) => render::error(&err),
            },
            "state" => match arg {
                Some(state) => match self.client.override_state(uuid, state) {
                    Ok(task) => render::task(&task),
                    Err(err) => render::error(&err),
                },
                None => render::error("state required"),
            },
            "terminate" => match self.client.terminate(uuid) {
                Ok(task) => render::task(&task),
                Err(err) => render::error(&err),
            },
            "delete" => match self.client.delete(uuid) {
                Ok(_) => render::info("deleted"),
                Err(err) => render::error(&err),
            },
            "config" => render::config(&self.config),
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else {
                    match HTTPClient::new(rest) {
                        Ok(client) => {
                            self.config.base_url = rest.to_string();
                            self.client = client;
                            render::info("base url updated");
                        }
                        Err(err) => render::error(&err),
                    }
                }
            }
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn show(&self, uuid: &str) {
        match self.client.detail(uuid) {
            Ok(page) => render::page(&page),
            Err(err) => render::error(&err),
        }
    }
}
