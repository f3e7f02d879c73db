use std::io::{self, Write};

use colored::{ColoredString, Colorize};

use crate::models::{ArgumentsPanel, CLIConfig, DetailPage, TaskInfo, TaskSummary};

pub fn banner(cfg: &CLIConfig) {
    println!("Task Detail Inspector");
    println!("API: {}", cfg.base_url);
    println!("Type /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                   Show commands");
    println!("  /exit | /quit           Exit");
    println!("  /list [limit]           List task instances");
    println!("  /show <uuid>            Show the detail page");
    println!("  /rename <uuid> [name]   Rename (no name clears it)");
    println!("  /clone <uuid>           Clone an instance");
    println!("  /state <uuid> <state>   Override the state");
    println!("  /terminate <uuid>       Terminate a running instance");
    println!("  /delete <uuid>          Delete an instance");
    println!("  /config                 Show current config");
    println!("  /base <url>             Update base URL");
}

pub fn list(items: &[TaskSummary]) {
    if items.is_empty() {
        println!("no task instances");
        return;
    }
    for item in items {
        println!(
            "{} {}  {}  ({}, created {})",
            badge(&item.state),
            item.display_name,
            item.uuid.dimmed(),
            item.task_type,
            item.datetime_created
        );
    }
}

pub fn page(page: &DetailPage) {
    print!("{}", format_page(page));
}

pub fn task(task: &TaskInfo) {
    let name = task.name.clone().unwrap_or_default();
    println!("{} {} {}", badge(&task.state), task.uuid, name);
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  color: {}", cfg.color);
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn format_page(page: &DetailPage) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}  {}\n", page.display_name.bold(), badge(&page.state)));
    out.push_str(&format!("{} task instance {}\n\n", page.task_class, page.uuid.dimmed()));

    let actions: Vec<String> = page
        .actions
        .iter()
        .map(|link| format!("[{}] {}", link.label, link.target.dimmed()))
        .collect();
    out.push_str(&format!("Actions: {}\n\n", actions.join("  ")));

    let width = page.details.iter().map(|row| row.key.len()).max().unwrap_or(0);
    for row in &page.details {
        let value = if row.key == "State" {
            badge(&row.value).to_string()
        } else {
            row.value.clone()
        };
        out.push_str(&format!("  {:width$}  {}", row.key, value, width = width));
        if let Some(link) = &row.link {
            out.push_str(&format!("  {}", link.dimmed()));
        }
        out.push('\n');
    }

    out.push_str(&format!("\n{}\n", "Arguments".underline()));
    match &page.arguments {
        ArgumentsPanel::Empty => out.push_str("  no arguments\n"),
        ArgumentsPanel::Pretty { text } => {
            for line in text.lines() {
                out.push_str(&format!("  {}\n", highlight_json_line(line)));
            }
        }
        ArgumentsPanel::Error { message } => {
            out.push_str(&format!("  {}\n", message.red()));
        }
    }

    out.push_str(&format!("\n{}\n", "Logs".underline()));
    if page.logs.is_empty() {
        out.push_str("  no logs\n");
    }
    for entry in &page.logs {
        let modified = entry.last_modified.as_deref().unwrap_or("never");
        out.push_str(&format!("  {} (last modified {})\n", entry.name.bold(), modified));
        for line in entry.text.lines() {
            out.push_str(&format!("    {}\n", line));
        }
        if entry.text.is_empty() {
            out.push_str("    \n");
        }
    }
    out
}

/// State badge, coloured by outcome.
pub fn badge(state: &str) -> ColoredString {
    let label = format!("[{}]", state);
    match state {
        "successful" => label.green().bold(),
        "failed" => label.red().bold(),
        "terminated" => label.magenta().bold(),
        "running" => label.blue().bold(),
        "created" | "published" => label.cyan(),
        _ => label.yellow(),
    }
}

/// Colours the key of a `"key": value` line of pretty JSON.
fn highlight_json_line(line: &str) -> String {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    if let Some(rest) = trimmed.strip_prefix('"') {
        if let Some(end) = rest.find("\": ") {
            let key = &trimmed[..end + 2];
            let value = &trimmed[end + 2..];
            return format!("{}{}{}", indent, key.cyan(), value);
        }
    }
    line.to_string()
}
