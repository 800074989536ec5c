//! Task-definition discovery and merge
//!
//! Task files are structured data files (YAML or JSON family) anywhere in a
//! module source tree. Each contributes its tasks in file order; files are
//! processed in sorted relative-path order so the merged sequence is
//! platform-independent.

use crate::error::BuildError;
use crate::walker::FileEntry;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Outcome of merging every task-definition file in a source tree.
#[derive(Debug, Default)]
pub struct MergedTasks {
    /// Concatenated task records, file by file
    pub tasks: Vec<Value>,
    /// Last `name` seen across task files, if any (last file wins)
    pub name: Option<String>,
}

/// True when the extension marks a structured task-definition file.
pub fn is_task_source(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("yaml") | Some("yml") | Some("json")
    )
}

/// Merge task files into one canonical task collection.
///
/// A parse failure on any file is a hard failure: a build produces a
/// complete, valid crate or no crate at all. Every task must carry an `id`
/// (string or number), unique across the whole merged collection.
pub fn merge_task_files(files: &[FileEntry]) -> Result<MergedTasks, BuildError> {
    let mut merged = MergedTasks::default();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for entry in files {
        let value = parse_task_file(&entry.path)?;

        if let Value::Object(map) = &value {
            if let Some(Value::String(name)) = map.get("name") {
                merged.name = Some(name.clone());
            }
        }

        let tasks = extract_tasks(value, &entry.path)?;
        for task in &tasks {
            let id = task_id(task)
                .ok_or_else(|| BuildError::TaskMissingId(entry.path.clone()))?;
            if !seen_ids.insert(id.clone()) {
                return Err(BuildError::DuplicateTaskId {
                    id,
                    path: entry.path.clone(),
                });
            }
        }

        debug!(file = %entry.rel_path, count = tasks.len(), "Merged task file");
        merged.tasks.extend(tasks);
    }

    Ok(merged)
}

/// Parse one task file into a generic structured value.
fn parse_task_file(path: &Path) -> Result<Value, BuildError> {
    let text = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        serde_json::from_str(&text).map_err(|e| BuildError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    } else {
        serde_yaml::from_str(&text).map_err(|e| BuildError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Extract the task list from one parsed value.
///
/// A mapping with a `tasks` key contributes that array; a bare sequence
/// contributes itself; any other value is wrapped as a single task.
fn extract_tasks(value: Value, path: &Path) -> Result<Vec<Value>, BuildError> {
    match value {
        Value::Object(mut map) => match map.remove("tasks") {
            Some(Value::Array(list)) => Ok(list),
            Some(_) => Err(BuildError::Parse {
                path: path.to_path_buf(),
                message: "'tasks' key must hold a sequence".to_string(),
            }),
            None => Ok(vec![Value::Object(map)]),
        },
        Value::Array(list) => Ok(list),
        other => Ok(vec![other]),
    }
}

/// Task `id` as a lookup key. Strings and numbers are accepted.
fn task_id(task: &Value) -> Option<String> {
    match task.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
