use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{BoardError, StoreError};
use crate::models::BoardState;

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("team-todo-backup-{}.json", date.format("%Y-%m-%d"))
}

pub fn export_json(state: &BoardState) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Parses an exported document. The three entity collections must be
/// present; comments and settings are optional.
pub fn parse_import(body: &str) -> Result<BoardState, BoardError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| BoardError::InvalidImport(format!("Error reading file: {}", e)))?;

    let missing: Vec<&str> = ["sections", "todos", "teamMembers"]
        .into_iter()
        .filter(|key| !value.get(*key).is_some_and(Value::is_array))
        .collect();
    if !missing.is_empty() {
        return Err(BoardError::InvalidImport(format!(
            "Invalid file format, missing {}",
            missing.join(", ")
        )));
    }

    serde_json::from_value(value).map_err(|e| BoardError::InvalidImport(e.to_string()))
}
