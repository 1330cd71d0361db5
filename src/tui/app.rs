use std::collections::HashSet;

use anyhow::Result;

use crate::debug_log;
use crate::model::{root_ids, TaskMap};
use crate::ops::{self, TaskUpdate};
use crate::progress;
use crate::store;

/// A flattened tree row for display.
#[derive(Debug, Clone)]
pub struct TreeRow {
    pub id: String,
    pub title: String,
    pub minutes: u32,
    pub done_minutes: u32,
    pub completed: bool,
    pub progress: f64,
    /// Unassigned remainder; `None` for leaves.
    pub free: Option<u32>,
    pub depth: usize,
    pub has_children: bool,
    pub is_last_at_depth: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Help,
    ConfirmDelete(String),
}

pub struct App {
    pub tasks: TaskMap,
    pub rows: Vec<TreeRow>,
    pub cursor: usize,
    pub collapsed: HashSet<String>,
    pub mode: Mode,
    pub error: Option<String>,
}

impl App {
    pub fn new(tasks: TaskMap, root: Option<&str>) -> Self {
        let mut app = App {
            tasks,
            rows: Vec::new(),
            cursor: 0,
            collapsed: HashSet::new(),
            mode: Mode::Normal,
            error: None,
        };
        app.rebuild(root);
        app
    }

    pub fn rebuild(&mut self, root: Option<&str>) {
        self.rows = flatten_tree(&self.tasks, &self.collapsed, root);
        // Clamp cursor
        if !self.rows.is_empty() {
            if self.cursor >= self.rows.len() {
                self.cursor = self.rows.len() - 1;
            }
        } else {
            self.cursor = 0;
        }
    }

    pub fn reload(&mut self, store_path: &str, root: Option<&str>) -> Result<()> {
        self.tasks = store::load(store_path)?;
        self.rebuild(root);
        Ok(())
    }

    /// Persist a freshly derived map and swap it in.
    fn apply(&mut self, next: TaskMap, store_path: &str, root: Option<&str>) -> Result<()> {
        store::save(store_path, &next)?;
        self.tasks = next;
        self.rebuild(root);
        Ok(())
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if !self.rows.is_empty() && self.cursor < self.rows.len() - 1 {
            self.cursor += 1;
        }
    }

    pub fn toggle_collapse(&mut self) {
        if let Some(row) = self.rows.get(self.cursor) {
            if row.has_children {
                let id = row.id.clone();
                if !self.collapsed.remove(&id) {
                    self.collapsed.insert(id);
                }
            }
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.rows.get(self.cursor).map(|r| r.id.as_str())
    }

    pub fn add_child(&mut self, store_path: &str, root: Option<&str>) -> Result<()> {
        let Some(id) = self.selected_id().map(|s| s.to_string()) else {
            return Ok(());
        };
        self.error = None;
        match ops::add_child(&self.tasks, &id) {
            Ok((next, Some(added))) => {
                debug_log::log(&format!("added '{added}' under '{id}'"));
                self.collapsed.remove(&id);
                self.apply(next, store_path, root)?;
            }
            Ok((_, None)) => {
                self.error = Some(format!("task '{id}' not found"));
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
        Ok(())
    }

    pub fn add_root(&mut self, store_path: &str, root: Option<&str>) -> Result<()> {
        self.error = None;
        let (next, added) = ops::add_root(&self.tasks);
        debug_log::log(&format!("added root '{added}'"));
        self.apply(next, store_path, root)
    }

    pub fn toggle_done(&mut self, store_path: &str, root: Option<&str>) -> Result<()> {
        let Some(row) = self.rows.get(self.cursor) else {
            return Ok(());
        };
        self.error = None;
        let id = row.id.clone();
        let next = ops::update_task(
            &self.tasks,
            &id,
            &TaskUpdate {
                completed: Some(!row.completed),
                ..Default::default()
            },
        );
        self.apply(next, store_path, root)
    }

    pub fn adjust_minutes(
        &mut self,
        delta: i32,
        store_path: &str,
        root: Option<&str>,
    ) -> Result<()> {
        let Some(row) = self.rows.get(self.cursor) else {
            return Ok(());
        };
        self.error = None;
        let id = row.id.clone();
        let requested = (i64::from(row.minutes) + i64::from(delta)).max(0) as u32;
        let next = ops::update_task(
            &self.tasks,
            &id,
            &TaskUpdate {
                estimated_minutes: Some(requested),
                ..Default::default()
            },
        );
        if next
            .get(&id)
            .is_some_and(|t| t.estimated_minutes != requested)
        {
            self.error = Some(format!(
                "budget clamped to {} minutes",
                next[&id].estimated_minutes
            ));
        }
        self.apply(next, store_path, root)
    }

    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected_id() {
            self.mode = Mode::ConfirmDelete(id.to_string());
        }
    }

    pub fn delete_confirmed(&mut self, store_path: &str, root: Option<&str>) -> Result<()> {
        let Mode::ConfirmDelete(id) = std::mem::replace(&mut self.mode, Mode::Normal) else {
            return Ok(());
        };
        self.error = None;
        debug_log::log(&format!("deleting subtree '{id}'"));
        let next = ops::delete_task(&self.tasks, &id);
        self.apply(next, store_path, root)
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            Mode::Help => Mode::Normal,
            _ => Mode::Help,
        };
    }
}

fn flatten_tree(tasks: &TaskMap, collapsed: &HashSet<String>, root: Option<&str>) -> Vec<TreeRow> {
    let roots: Vec<String> = match root {
        Some(id) if tasks.contains_key(id) => vec![id.to_string()],
        Some(_) => Vec::new(),
        None => root_ids(tasks),
    };

    let mut rows = Vec::new();
    for (i, id) in roots.iter().enumerate() {
        let is_last = i == roots.len() - 1;
        flatten_node(&mut rows, tasks, id, collapsed, 0, &mut vec![is_last]);
    }
    rows
}

fn flatten_node(
    rows: &mut Vec<TreeRow>,
    tasks: &TaskMap,
    id: &str,
    collapsed: &HashSet<String>,
    depth: usize,
    is_last_at_depth: &mut Vec<bool>,
) {
    let Some(task) = tasks.get(id) else { return };

    let children: Vec<&str> = task
        .children
        .iter()
        .map(String::as_str)
        .filter(|cid| tasks.contains_key(*cid))
        .collect();
    let has_children = !children.is_empty();

    rows.push(TreeRow {
        id: task.id.clone(),
        title: task.title.clone(),
        minutes: task.estimated_minutes,
        done_minutes: progress::completed_minutes(id, tasks),
        completed: task.completed,
        progress: progress::progress(id, tasks),
        free: has_children.then(|| task.unassigned_minutes(tasks)),
        depth,
        has_children,
        is_last_at_depth: is_last_at_depth.clone(),
    });

    if has_children && !collapsed.contains(&task.id) {
        for (i, child) in children.iter().enumerate() {
            let child_is_last = i == children.len() - 1;
            is_last_at_depth.push(child_is_last);
            flatten_node(rows, tasks, child, collapsed, depth + 1, is_last_at_depth);
            is_last_at_depth.pop();
        }
    }
}
