//! Aggregation over the task tree: completed minutes and progress ratios.
//!
//! Everything here is a pure function of the map. A parent's `completed`
//! flag covers only its unassigned remainder; children carry their own
//! completion, so totals add up bottom-up.

use crate::model::{root_ids, TaskMap};

/// Recursive sum of completed minutes for the subtree rooted at `id`.
///
/// An unknown id aggregates to 0 rather than failing. A leaf contributes
/// its full budget when completed. An interior task contributes its
/// completed unassigned remainder plus whatever its children contribute.
pub fn completed_minutes(id: &str, tasks: &TaskMap) -> u32 {
    let Some(task) = tasks.get(id) else {
        return 0;
    };

    if task.children.is_empty() {
        return if task.completed {
            task.estimated_minutes
        } else {
            0
        };
    }

    let own = if task.completed {
        task.unassigned_minutes(tasks)
    } else {
        0
    };

    own + task
        .children
        .iter()
        .map(|cid| completed_minutes(cid, tasks))
        .sum::<u32>()
}

/// Progress ratio for `id`. Unknown ids and zero-budget tasks report 0.
///
/// Not clamped: under the tree invariants the ratio never exceeds 1, and
/// an overshoot signals an overcommitted subtree rather than a bug here.
/// Display code clamps before rendering.
pub fn progress(id: &str, tasks: &TaskMap) -> f64 {
    let Some(task) = tasks.get(id) else {
        return 0.0;
    };
    if task.estimated_minutes == 0 {
        return 0.0;
    }
    f64::from(completed_minutes(id, tasks)) / f64::from(task.estimated_minutes)
}

/// Totals across every root: `(completed, estimated)` minutes.
pub fn overall(tasks: &TaskMap) -> (u32, u32) {
    let mut completed = 0;
    let mut estimated = 0;
    for id in root_ids(tasks) {
        completed += completed_minutes(&id, tasks);
        if let Some(root) = tasks.get(&id) {
            estimated += root.estimated_minutes;
        }
    }
    (completed, estimated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;

    fn insert(tasks: &mut TaskMap, task: Task) {
        tasks.insert(task.id.clone(), task);
    }

    fn link(tasks: &mut TaskMap, parent: &str, child: &str) {
        tasks.get_mut(parent).unwrap().children.push(child.into());
    }

    #[test]
    fn unknown_id_aggregates_to_zero() {
        let tasks = TaskMap::new();
        assert_eq!(completed_minutes("nope", &tasks), 0);
        assert_eq!(progress("nope", &tasks), 0.0);
    }

    #[test]
    fn completed_leaf_contributes_full_budget() {
        let mut tasks = TaskMap::new();
        let mut leaf = Task::new("t1", "leaf", 30, None);
        leaf.completed = true;
        insert(&mut tasks, leaf);
        assert_eq!(completed_minutes("t1", &tasks), 30);
        assert_eq!(progress("t1", &tasks), 1.0);
    }

    #[test]
    fn open_leaf_contributes_nothing() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t1", "leaf", 30, None));
        assert_eq!(completed_minutes("t1", &tasks), 0);
        assert_eq!(progress("t1", &tasks), 0.0);
    }

    #[test]
    fn parent_flag_covers_only_the_remainder() {
        // Parent 50 with one completed 30-minute child; marking the parent
        // completed adds the 20-minute remainder for a total of 50.
        let mut tasks = TaskMap::new();
        let mut parent = Task::new("t1", "p", 50, None);
        parent.completed = true;
        insert(&mut tasks, parent);
        let mut child = Task::new("t2", "c", 30, Some("t1"));
        child.completed = true;
        insert(&mut tasks, child);
        link(&mut tasks, "t1", "t2");

        assert_eq!(completed_minutes("t1", &tasks), 50);
        assert_eq!(progress("t1", &tasks), 1.0);
    }

    #[test]
    fn open_parent_counts_children_only() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t1", "p", 50, None));
        let mut child = Task::new("t2", "c", 30, Some("t1"));
        child.completed = true;
        insert(&mut tasks, child);
        link(&mut tasks, "t1", "t2");

        assert_eq!(completed_minutes("t1", &tasks), 30);
        assert_eq!(progress("t1", &tasks), 0.6);
    }

    #[test]
    fn missing_child_contributes_nothing() {
        let mut tasks = TaskMap::new();
        let mut parent = Task::new("t1", "p", 40, None);
        parent.completed = true;
        parent.children = vec!["ghost".into()];
        insert(&mut tasks, parent);
        // The whole budget is unassigned since the child is gone.
        assert_eq!(completed_minutes("t1", &tasks), 40);
    }

    #[test]
    fn zero_budget_progress_is_zero() {
        let mut tasks = TaskMap::new();
        let mut t = Task::new("t1", "empty", 0, None);
        t.completed = true;
        insert(&mut tasks, t);
        assert_eq!(progress("t1", &tasks), 0.0);
    }

    #[test]
    fn aggregation_is_pure() {
        let mut tasks = TaskMap::new();
        let mut leaf = Task::new("t1", "leaf", 30, None);
        leaf.completed = true;
        insert(&mut tasks, leaf);
        let before = tasks.clone();
        let first = completed_minutes("t1", &tasks);
        let second = completed_minutes("t1", &tasks);
        assert_eq!(first, second);
        assert_eq!(tasks, before);
    }

    #[test]
    fn progress_is_unclamped_when_overcommitted() {
        // A child allocated past its parent's budget pushes the ratio
        // over 1; the core reports it as-is.
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t1", "p", 10, None));
        let mut child = Task::new("t2", "c", 25, Some("t1"));
        child.completed = true;
        insert(&mut tasks, child);
        link(&mut tasks, "t1", "t2");

        assert_eq!(completed_minutes("t1", &tasks), 25);
        assert!(progress("t1", &tasks) > 1.0);
    }

    #[test]
    fn overall_sums_roots() {
        let mut tasks = TaskMap::new();
        let mut a = Task::new("t1", "a", 60, None);
        a.completed = true;
        insert(&mut tasks, a);
        insert(&mut tasks, Task::new("t2", "b", 40, None));
        assert_eq!(overall(&tasks), (60, 100));
    }
}
