use crate::model::{root_ids, Task, TaskMap};
use crate::progress;

/// Render a ratio for display. Clamped here, not in the core.
pub fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio.clamp(0.0, 1.0) * 100.0)
}

/// Ids of the forest (or of one subtree) in depth-first display order,
/// children in insertion order.
pub fn tree_order(tasks: &TaskMap, root: Option<&str>) -> Vec<String> {
    let mut ids = Vec::new();
    match root {
        Some(id) if tasks.contains_key(id) => collect(tasks, id, &mut ids),
        Some(_) => {}
        None => {
            for id in root_ids(tasks) {
                collect(tasks, &id, &mut ids);
            }
        }
    }
    ids
}

fn collect(tasks: &TaskMap, id: &str, ids: &mut Vec<String>) {
    ids.push(id.to_string());
    if let Some(task) = tasks.get(id) {
        for cid in &task.children {
            if tasks.contains_key(cid) {
                collect(tasks, cid, ids);
            }
        }
    }
}

pub fn format_task_detail(task: &Task, tasks: &TaskMap) -> String {
    let mut out = String::new();
    out.push_str(&format!("Id:          {}\n", task.id));
    out.push_str(&format!("Title:       {}\n", task.title));
    out.push_str(&format!("Minutes:     {}\n", task.estimated_minutes));
    out.push_str(&format!(
        "Completed:   {}\n",
        if task.completed { "yes" } else { "no" }
    ));
    if let Some(ref p) = task.parent {
        out.push_str(&format!("Parent:      {}\n", p));
    }
    if !task.children.is_empty() {
        out.push_str(&format!("Children:    {}\n", task.children.len()));
        out.push_str(&format!(
            "Unassigned:  {} min\n",
            task.unassigned_minutes(tasks)
        ));
    }
    let done = progress::completed_minutes(&task.id, tasks);
    let ratio = progress::progress(&task.id, tasks);
    out.push_str(&format!(
        "Progress:    {done} / {} min ({})\n",
        task.estimated_minutes,
        percent(ratio)
    ));
    out
}

pub fn format_task_list(tasks: &TaskMap, ids: &[String]) -> String {
    let mut out = String::new();
    for id in ids {
        let Some(task) = tasks.get(id) else { continue };
        out.push_str(&format!(
            "{} {}  {}  {}m {}\n",
            task.icon(),
            task.id,
            task.title,
            task.estimated_minutes,
            percent(progress::progress(id, tasks))
        ));
    }
    out
}

pub fn format_task_tree(tasks: &TaskMap, root: Option<&str>) -> String {
    let mut out = String::new();
    match root {
        Some(id) if tasks.contains_key(id) => write_tree(&mut out, tasks, id, "", ""),
        Some(_) => {}
        None => {
            for id in root_ids(tasks) {
                write_tree(&mut out, tasks, &id, "", "");
            }
        }
    }
    out
}

/// Write a task line and recurse into children.
/// `line_prefix` is what goes before the icon on this task's line.
/// `child_prefix` is the base prefix for this task's children's connectors.
fn write_tree(out: &mut String, tasks: &TaskMap, id: &str, line_prefix: &str, child_prefix: &str) {
    let Some(task) = tasks.get(id) else { return };

    let done = progress::completed_minutes(id, tasks);
    let budget = if task.children.is_empty() {
        String::new()
    } else {
        let free = task.unassigned_minutes(tasks);
        if free > 0 {
            format!("  (free: {free}m)")
        } else {
            "  (full)".to_string()
        }
    };

    out.push_str(&format!(
        "{}{} {}  {}  {done}/{}m ({}){}\n",
        line_prefix,
        task.icon(),
        task.id,
        task.title,
        task.estimated_minutes,
        percent(progress::progress(id, tasks)),
        budget
    ));

    let children: Vec<&str> = task
        .children
        .iter()
        .map(|cid| cid.as_str())
        .filter(|cid| tasks.contains_key(*cid))
        .collect();

    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let (connector, extension) = if is_last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        write_tree(
            out,
            tasks,
            child,
            &format!("{child_prefix}{connector}"),
            &format!("{child_prefix}{extension}"),
        );
    }
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

    fn sample() -> TaskMap {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t1", "Root task", 60, None));
        insert(&mut tasks, Task::new("t2", "First", 30, Some("t1")));
        let mut second = Task::new("t3", "Second", 30, Some("t1"));
        second.completed = true;
        insert(&mut tasks, second);
        link(&mut tasks, "t1", "t2");
        link(&mut tasks, "t1", "t3");
        tasks
    }

    #[test]
    fn tree_single_root() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t1", "Root task", 60, None));
        let out = format_task_tree(&tasks, None);
        assert_eq!(out, ". t1  Root task  0/60m (0%)\n");
    }

    #[test]
    fn tree_with_children_uses_connectors() {
        let out = format_task_tree(&sample(), None);
        assert!(out.contains("├── . t2  First"));
        assert!(out.contains("└── x t3  Second"));
        assert!(out.starts_with(". t1  Root task  30/60m (50%)  (full)\n"));
    }

    #[test]
    fn tree_marks_free_budget() {
        let mut tasks = TaskMap::new();
        insert(&mut tasks, Task::new("t1", "Root task", 60, None));
        insert(&mut tasks, Task::new("t2", "Child", 20, Some("t1")));
        link(&mut tasks, "t1", "t2");
        let out = format_task_tree(&tasks, None);
        assert!(out.contains("(free: 40m)"));
    }

    #[test]
    fn flat_list() {
        let tasks = sample();
        let ids = tree_order(&tasks, None);
        let out = format_task_list(&tasks, &ids);
        assert!(out.contains(". t1  Root task  60m 50%"));
        assert!(out.contains("x t3  Second  30m 100%"));
    }

    #[test]
    fn tree_order_is_depth_first() {
        let mut tasks = sample();
        insert(&mut tasks, Task::new("t4", "Nested", 10, Some("t2")));
        link(&mut tasks, "t2", "t4");
        assert_eq!(tree_order(&tasks, None), vec!["t1", "t2", "t4", "t3"]);
        assert_eq!(tree_order(&tasks, Some("t2")), vec!["t2", "t4"]);
        assert!(tree_order(&tasks, Some("ghost")).is_empty());
    }

    #[test]
    fn detail_shows_remainder() {
        let tasks = sample();
        let out = format_task_detail(&tasks["t1"], &tasks);
        assert!(out.contains("Children:    2"));
        assert!(out.contains("Unassigned:  0 min"));
        assert!(out.contains("Progress:    30 / 60 min (50%)"));
    }
}
