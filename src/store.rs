//! JSON snapshot persistence for the task map.
//!
//! The collection is saved wholesale after every mutation, mirroring the
//! copy-on-write contract of the ops layer: the file always holds exactly
//! one complete, consistent forest.

use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::TaskMap;

/// Load the task map from `path`. A missing or empty file is an empty map,
/// not an error.
pub fn load(path: &str) -> Result<TaskMap> {
    if !Path::new(path).exists() {
        return Ok(TaskMap::new());
    }
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read store file {path}"))?;
    if data.trim().is_empty() {
        return Ok(TaskMap::new());
    }
    serde_json::from_str(&data).with_context(|| format!("store file {path} is not valid JSON"))
}

/// Atomically replace the snapshot: write a temp file next to the target,
/// then rename over it, so watchers and concurrent readers never see a
/// half-written store.
pub fn save(path: &str, tasks: &TaskMap) -> Result<()> {
    let target = Path::new(path);
    let dir = target.parent().filter(|p| !p.as_os_str().is_empty());

    let mut tmp = tempfile::Builder::new()
        .prefix(".tempo-")
        .suffix(".json")
        .tempfile_in(dir.unwrap_or_else(|| Path::new(".")))
        .context("failed to create temp file for store")?;

    serde_json::to_writer_pretty(&mut tmp, tasks).context("failed to serialize task map")?;
    tmp.write_all(b"\n")?;
    tmp.flush()?;

    tmp.persist(target)
        .with_context(|| format!("failed to replace store file {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let tasks = load(path.to_str().unwrap()).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let path = path.to_str().unwrap();

        let (tasks, root) = ops::add_root(&TaskMap::new());
        let (tasks, _) = ops::add_child(&tasks, &root).unwrap();

        save(path, &tasks).unwrap();
        let loaded = load(path).unwrap();
        assert_eq!(loaded, tasks);
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let path = path.to_str().unwrap();

        let (first, root) = ops::add_root(&TaskMap::new());
        save(path, &first).unwrap();

        let second = ops::delete_task(&first, &root);
        save(path, &second).unwrap();

        let loaded = load(path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load(path.to_str().unwrap()).is_err());
    }
}
