use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;

use crate::error::{BackupError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Robot,
}

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    Error { code: String, message: String },
    Partial { completed: usize, failed: usize },
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
        warnings: Vec::new(),
    }
}

pub fn robot_partial<T: Serialize>(data: T, completed: usize, failed: usize) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Partial { completed, failed },
        ..robot_ok(data)
    }
}

pub fn robot_error(
    code: impl Into<String>,
    message: impl Into<String>,
) -> RobotResponse<serde_json::Value> {
    RobotResponse {
        status: RobotStatus::Error {
            code: code.into(),
            message: message.into(),
        },
        ..robot_ok(serde_json::Value::Null)
    }
}

pub fn emit_robot<T: Serialize>(response: &RobotResponse<T>) -> Result<()> {
    emit_json(response)
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

/// Print `err` once, in the shape the output mode expects.
pub fn emit_error(mode: OutputMode, err: &BackupError) {
    match mode {
        OutputMode::Robot => {
            let response = robot_error(err.code(), err.to_string());
            let payload = serde_json::to_string(&response).unwrap_or_default();
            println!("{payload}");
        }
        OutputMode::Human => eprintln!("{} {err}", style("Error:").red().bold()),
    }
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 12,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let padded = format!("{key:width$}", width = self.key_width);
        self.lines.push(format!("{} {value}", style(padded).dim()));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robot_partial_serializes_counts() {
        let response = robot_partial(serde_json::json!({"deleted": ["a"]}), 1, 2);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"]["partial"]["completed"], 1);
        assert_eq!(value["status"]["partial"]["failed"], 2);
        assert_eq!(value["data"]["deleted"][0], "a");
        assert!(value.get("warnings").is_none());
    }

    #[test]
    fn robot_error_carries_code() {
        let value = serde_json::to_value(robot_error("missing_config", "nope")).unwrap();
        assert_eq!(value["status"]["error"]["code"], "missing_config");
        assert_eq!(value["data"], serde_json::Value::Null);
    }

    #[test]
    fn human_layout_collects_lines() {
        let mut layout = HumanLayout::new();
        layout.kv("repository", "nightly").bullet("snapshot-20240101");
        let text = layout.build();
        assert!(text.contains("nightly"));
        assert!(text.ends_with("- snapshot-20240101"));
    }

    #[test]
    fn human_layout_pads_keys_by_visible_width() {
        console::set_colors_enabled(true);
        let mut layout = HumanLayout::new();
        layout.kv("name", "snapshot-20240101").kv("repository", "nightly");
        let text = layout.build();
        assert!(text.contains('\x1b'), "expected styled keys: {text:?}");

        let plain = console::strip_ansi_codes(&text).into_owned();
        let lines: Vec<&str> = plain.lines().collect();
        assert_eq!(lines[0], "name         snapshot-20240101");
        assert_eq!(lines[1], "repository   nightly");
    }
}
