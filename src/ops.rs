//! Tree-mutation engine. Every operation takes the current map and returns
//! a fresh one; the caller's map is never mutated. Unknown ids are silent
//! no-ops (the returned map is an unchanged copy) except where noted.

use std::fmt;

use crate::model::{next_id, Task, TaskMap, DEFAULT_ROOT_MINUTES, MIN_CHILD_MINUTES};

const ROOT_TITLE: &str = "Root task";
const CHILD_TITLE: &str = "Child task";

/// Rejection from [`add_child`]: the parent's budget cannot give every
/// child at least [`MIN_CHILD_MINUTES`]. Carries what the caller needs to
/// build a message; the collection is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityError {
    pub budget: u32,
    pub max_children: u32,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "each task needs at least {MIN_CHILD_MINUTES} minutes; \
             a {}-minute task can hold at most {} subtasks",
            self.budget, self.max_children
        )
    }
}

impl std::error::Error for CapacityError {}

/// Partial update for [`update_task`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub estimated_minutes: Option<u32>,
    pub completed: Option<bool>,
}

/// Add a root task with the default budget. Returns the new map and the
/// new task's id.
pub fn add_root(tasks: &TaskMap) -> (TaskMap, String) {
    let mut next = tasks.clone();
    let id = next_id(&next);
    next.insert(
        id.clone(),
        Task::new(&id, ROOT_TITLE, DEFAULT_ROOT_MINUTES, None),
    );
    (next, id)
}

/// Add a child under `parent_id` and re-split the parent's whole budget
/// across ALL of its children, oldest first.
///
/// Returns the new map and the created id, or `(unchanged, None)` when the
/// parent is unknown. Rejects with [`CapacityError`] when the budget can't
/// cover one more child at the per-child minimum.
pub fn add_child(
    tasks: &TaskMap,
    parent_id: &str,
) -> Result<(TaskMap, Option<String>), CapacityError> {
    let Some(parent) = tasks.get(parent_id) else {
        return Ok((tasks.clone(), None));
    };

    let count = parent.children.len() as u32 + 1;
    if parent.estimated_minutes < count * MIN_CHILD_MINUTES {
        return Err(CapacityError {
            budget: parent.estimated_minutes,
            max_children: parent.estimated_minutes / MIN_CHILD_MINUTES,
        });
    }

    // Integer split of the full budget; earlier children soak up the
    // remainder, one extra minute each.
    let base = parent.estimated_minutes / count;
    let remainder = parent.estimated_minutes % count;

    let mut next = tasks.clone();
    let id = next_id(&next);
    next.insert(id.clone(), Task::new(&id, CHILD_TITLE, 0, Some(parent_id)));

    let mut child_ids = parent.children.clone();
    child_ids.push(id.clone());

    for (index, cid) in child_ids.iter().enumerate() {
        let committed = match next.get(cid) {
            Some(child) => child.children_minutes(&next),
            None => continue,
        };
        let share = base + u32::from((index as u32) < remainder);
        // Never shrink a child below what its own subtree already claims,
        // even when that overshoots the parent's budget. The overshoot is
        // left standing; nothing rebalances it.
        let assigned = share.max(committed);
        if let Some(child) = next.get_mut(cid) {
            child.estimated_minutes = assigned;
        }
    }

    if let Some(parent) = next.get_mut(parent_id) {
        parent.children = child_ids;
    }

    Ok((next, Some(id)))
}

/// Apply a partial update to one task. Title and completion are applied
/// verbatim; a requested budget is clamped between the children-sum floor
/// and the parent-budget ceiling. Nothing cascades to children or parent.
pub fn update_task(tasks: &TaskMap, id: &str, update: &TaskUpdate) -> TaskMap {
    let Some(task) = tasks.get(id) else {
        return tasks.clone();
    };

    let mut minutes = None;
    if let Some(requested) = update.estimated_minutes {
        let floor = task.children_minutes(tasks);
        let mut value = requested.max(floor);

        if let Some(parent) = task.parent.as_ref().and_then(|pid| tasks.get(pid)) {
            let siblings: u32 = parent
                .children
                .iter()
                .filter(|cid| cid.as_str() != id)
                .filter_map(|cid| tasks.get(cid))
                .map(|c| c.estimated_minutes)
                .sum();
            if value + siblings > parent.estimated_minutes {
                value = parent.estimated_minutes.saturating_sub(siblings);
            }
        }

        // When the ceiling lands below the children-sum floor, the floor
        // wins and the parent ends up overcommitted.
        minutes = Some(value.max(floor));
    }

    let mut next = tasks.clone();
    if let Some(task) = next.get_mut(id) {
        if let Some(title) = &update.title {
            task.title = title.clone();
        }
        if let Some(completed) = update.completed {
            task.completed = completed;
        }
        if let Some(m) = minutes {
            task.estimated_minutes = m;
        }
    }
    next
}

/// Remove a task and its whole subtree, unlinking it from its parent.
/// Surviving siblings keep their allocations.
pub fn delete_task(tasks: &TaskMap, id: &str) -> TaskMap {
    let Some(task) = tasks.get(id) else {
        return tasks.clone();
    };

    let mut next = tasks.clone();
    if let Some(parent) = task.parent.as_ref().and_then(|pid| next.get_mut(pid)) {
        parent.children.retain(|cid| cid != id);
    }
    remove_subtree(&mut next, id);
    next
}

fn remove_subtree(tasks: &mut TaskMap, id: &str) {
    let Some(task) = tasks.remove(id) else {
        return;
    };
    for cid in task.children {
        remove_subtree(tasks, &cid);
    }
}
