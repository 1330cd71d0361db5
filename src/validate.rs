use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};

use crate::model::TaskMap;

/// Check the structural invariants of a task map: parent/child links agree
/// both ways, every referenced id exists, no task sits in two `children`
/// lists, and no parent chain loops back on itself.
///
/// Budget overcommit is NOT an error here; see [`overcommitted`].
pub fn check_links(tasks: &TaskMap) -> Result<()> {
    // Each task may be claimed as a child by at most one parent.
    let mut claimed_by: HashMap<&str, &str> = HashMap::new();
    for task in tasks.values() {
        let mut seen = HashSet::new();
        for cid in &task.children {
            if !seen.insert(cid.as_str()) {
                bail!("task '{}' lists child '{cid}' twice", task.id);
            }
            let Some(child) = tasks.get(cid) else {
                bail!("task '{}' lists unknown child '{cid}'", task.id);
            };
            if child.parent.as_deref() != Some(task.id.as_str()) {
                bail!(
                    "task '{cid}' is a child of '{}' but points at parent {:?}",
                    task.id,
                    child.parent
                );
            }
            if let Some(other) = claimed_by.insert(cid, &task.id) {
                bail!("task '{cid}' is claimed by both '{other}' and '{}'", task.id);
            }
        }
    }

    for task in tasks.values() {
        if let Some(pid) = &task.parent {
            let Some(parent) = tasks.get(pid) else {
                bail!("task '{}' points at unknown parent '{pid}'", task.id);
            };
            if !parent.children.iter().any(|cid| cid == &task.id) {
                bail!(
                    "task '{}' points at parent '{pid}' which does not list it",
                    task.id
                );
            }
        }
    }

    // Walk up from every task; revisiting a node means the parent chain
    // loops.
    for task in tasks.values() {
        let mut visited = HashSet::new();
        visited.insert(task.id.as_str());
        let mut current = task.parent.as_deref();
        while let Some(id) = current {
            if !visited.insert(id) {
                bail!("parent chain of task '{}' contains a cycle", task.id);
            }
            current = tasks.get(id).and_then(|t| t.parent.as_deref());
        }
    }

    Ok(())
}

/// Ids whose children claim more minutes than the task's own budget, in a
/// stable order. These states are reachable through normal operations
/// (the add-child floor raise, the update floor-vs-ceiling conflict), so
/// they are reported as warnings, never as hard errors.
pub fn overcommitted(tasks: &TaskMap) -> Vec<String> {
    let mut ids: Vec<String> = tasks
        .values()
        .filter(|t| t.children_minutes(tasks) > t.estimated_minutes)
        .map(|t| t.id.clone())
        .collect();
    ids.sort();
    ids
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
    fn valid_tree_passes() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t1", "p", 60, None));
        insert(&mut tasks, Task::new("t2", "c", 30, Some("t1")));
        link(&mut tasks, "t1", "t2");
        check_links(&tasks).unwrap();
        assert!(overcommitted(&tasks).is_empty());
    }

    #[test]
    fn unknown_child_fails() {
        let mut tasks = TaskMap::new();
        let mut p = Task::new("t1", "p", 60, None);
        p.children = vec!["ghost".into()];
        insert(&mut tasks, p);
        assert!(check_links(&tasks).is_err());
    }

    #[test]
    fn unknown_parent_fails() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t2", "c", 30, Some("ghost")));
        assert!(check_links(&tasks).is_err());
    }

    #[test]
    fn one_sided_parent_link_fails() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t1", "p", 60, None));
        insert(&mut tasks, Task::new("t2", "c", 30, Some("t1")));
        // t1 never lists t2
        assert!(check_links(&tasks).is_err());
    }

    #[test]
    fn doubly_claimed_child_fails() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t1", "p", 60, None));
        insert(&mut tasks, Task::new("t2", "q", 60, None));
        insert(&mut tasks, Task::new("t3", "c", 30, Some("t1")));
        link(&mut tasks, "t1", "t3");
        link(&mut tasks, "t2", "t3");
        assert!(check_links(&tasks).is_err());
    }

    #[test]
    fn parent_cycle_fails() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t1", "a", 60, Some("t2")));
        insert(&mut tasks, Task::new("t2", "b", 60, Some("t1")));
        link(&mut tasks, "t1", "t2");
        link(&mut tasks, "t2", "t1");
        assert!(check_links(&tasks).is_err());
    }

    #[test]
    fn overcommitted_reports_the_offender() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t1", "p", 10, None));
        insert(&mut tasks, Task::new("t2", "c", 25, Some("t1")));
        link(&mut tasks, "t1", "t2");
        assert_eq!(overcommitted(&tasks), vec!["t1".to_string()]);
    }
}
