use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Smallest budget a child task may hold, in minutes. Bounds how many
/// children a parent's budget can be split across.
pub const MIN_CHILD_MINUTES: u32 = 5;

/// Budget given to a newly created root task, in minutes.
pub const DEFAULT_ROOT_MINUTES: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub estimated_minutes: u32,
    /// For a task with children this marks only the unassigned remainder
    /// as complete, not the children.
    pub completed: bool,
    /// Child ids in insertion order; the order decides who receives the
    /// extra minute when a budget doesn't divide evenly.
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
}

/// The whole forest, keyed by task id. Mutation ops never touch the map
/// they are given; they return a fresh one and the caller swaps wholesale.
pub type TaskMap = HashMap<String, Task>;

impl Task {
    pub fn new(id: &str, title: &str, estimated_minutes: u32, parent: Option<&str>) -> Self {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            estimated_minutes,
            completed: false,
            children: Vec::new(),
            parent: parent.map(|p| p.to_string()),
        }
    }

    /// Sum of the budgets this task has delegated to its children.
    /// A child id missing from the map contributes nothing.
    pub fn children_minutes(&self, tasks: &TaskMap) -> u32 {
        self.children
            .iter()
            .filter_map(|cid| tasks.get(cid))
            .map(|c| c.estimated_minutes)
            .sum()
    }

    /// Budget not yet delegated to any child. Saturates at zero when the
    /// children overshoot the parent.
    pub fn unassigned_minutes(&self, tasks: &TaskMap) -> u32 {
        self.estimated_minutes
            .saturating_sub(self.children_minutes(tasks))
    }

    /// Returns display icon: x=completed, .=open
    pub fn icon(&self) -> &'static str {
        if self.completed {
            "x"
        } else {
            "."
        }
    }
}

/// Allocate the next task id. Ids are `t{N}`; the next one is one past the
/// highest numeric suffix in the map, so ids never collide and never get
/// reused within a store. This function is the single source of truth for
/// the encoding.
pub fn next_id(tasks: &TaskMap) -> String {
    let max = tasks
        .keys()
        .filter_map(|id| id.strip_prefix('t'))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("t{}", max + 1)
}

/// Root ids in a stable order: numeric suffix where the id follows the
/// `t{N}` scheme, lexicographic otherwise.
pub fn root_ids(tasks: &TaskMap) -> Vec<String> {
    let mut roots: Vec<&Task> = tasks.values().filter(|t| t.parent.is_none()).collect();
    roots.sort_by(|a, b| id_key(&a.id).cmp(&id_key(&b.id)));
    roots.iter().map(|t| t.id.clone()).collect()
}

fn id_key(id: &str) -> (u64, &str) {
    let n = id
        .strip_prefix('t')
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or(u64::MAX);
    (n, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(tasks: &mut TaskMap, task: Task) {
        tasks.insert(task.id.clone(), task);
    }

    #[test]
    fn next_id_starts_at_one() {
        assert_eq!(next_id(&TaskMap::new()), "t1");
    }

    #[test]
    fn next_id_skips_past_highest() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t1", "a", 60, None));
        insert(&mut tasks, Task::new("t7", "b", 60, None));
        assert_eq!(next_id(&tasks), "t8");
    }

    #[test]
    fn next_id_ignores_foreign_ids() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("imported-task", "a", 60, None));
        assert_eq!(next_id(&tasks), "t1");
    }

    #[test]
    fn children_minutes_ignores_missing_children() {
        let mut tasks = TaskMap::new();
        let mut parent = Task::new("t1", "p", 60, None);
        parent.children = vec!["t2".into(), "ghost".into()];
        insert(&mut tasks, parent);
        insert(&mut tasks, Task::new("t2", "c", 25, Some("t1")));
        let parent = &tasks["t1"];
        assert_eq!(parent.children_minutes(&tasks), 25);
        assert_eq!(parent.unassigned_minutes(&tasks), 35);
    }

    #[test]
    fn unassigned_saturates_when_overcommitted() {
        let mut tasks = TaskMap::new();
        let mut parent = Task::new("t1", "p", 10, None);
        parent.children = vec!["t2".into()];
        insert(&mut tasks, parent);
        insert(&mut tasks, Task::new("t2", "c", 25, Some("t1")));
        assert_eq!(tasks["t1"].unassigned_minutes(&tasks), 0);
    }

    #[test]
    fn roots_in_stable_order() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t10", "b", 60, None));
        insert(&mut tasks, Task::new("t2", "a", 60, None));
        insert(&mut tasks, Task::new("t3", "c", 60, Some("t2")));
        assert_eq!(root_ids(&tasks), vec!["t2".to_string(), "t10".to_string()]);
    }
}
