mod cli;
mod debug_log;
mod model;
mod ops;
mod output;
mod progress;
mod store;
mod tui;
mod validate;
mod watch;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use model::TaskMap;
use ops::TaskUpdate;

fn default_store_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".tempo").join("tasks.json"))
}

fn resolve_store_path(cli_file: Option<String>) -> Result<String> {
    match cli_file {
        Some(p) => Ok(p),
        None => {
            let path = default_store_path()?;
            Ok(path
                .to_str()
                .context("default store path is not valid UTF-8")?
                .to_string())
        }
    }
}

fn ensure_store_dir(store_path: &str) -> Result<()> {
    if let Some(parent) = std::path::Path::new(store_path).parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

fn require_task(tasks: &TaskMap, id: &str) -> Result<()> {
    if !tasks.contains_key(id) {
        bail!("task '{id}' not found");
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let store_path = resolve_store_path(cli.file)?;
    ensure_store_dir(&store_path)?;

    match cli.command {
        Command::Add { parent, title } => {
            let tasks = store::load(&store_path)?;
            let (mut next, id) = match parent {
                Some(ref pid) => {
                    require_task(&tasks, pid)?;
                    let (next, added) = ops::add_child(&tasks, pid)?;
                    let Some(id) = added else {
                        bail!("task '{pid}' not found");
                    };
                    (next, id)
                }
                None => ops::add_root(&tasks),
            };
            if let Some(title) = title {
                next = ops::update_task(
                    &next,
                    &id,
                    &TaskUpdate {
                        title: Some(title),
                        ..Default::default()
                    },
                );
            }
            store::save(&store_path, &next)?;
            match parent {
                Some(pid) => eprintln!("Added task '{id}' under '{pid}'"),
                None => eprintln!("Added root task '{id}'"),
            }
        }

        Command::Edit { id, title, minutes } => {
            if title.is_none() && minutes.is_none() {
                bail!("nothing to change: pass --title and/or --minutes");
            }
            let tasks = store::load(&store_path)?;
            require_task(&tasks, &id)?;
            let next = ops::update_task(
                &tasks,
                &id,
                &TaskUpdate {
                    title,
                    estimated_minutes: minutes,
                    completed: None,
                },
            );
            store::save(&store_path, &next)?;
            eprintln!("Updated task '{id}'");
            if let Some(requested) = minutes {
                let actual = next[&id].estimated_minutes;
                if actual != requested {
                    eprintln!("Budget clamped to {actual} minutes (requested {requested})");
                }
            }
        }

        Command::Done { id } => {
            let tasks = store::load(&store_path)?;
            require_task(&tasks, &id)?;
            let next = ops::update_task(
                &tasks,
                &id,
                &TaskUpdate {
                    completed: Some(true),
                    ..Default::default()
                },
            );
            store::save(&store_path, &next)?;
            eprintln!("Marked '{id}' complete");
        }

        Command::Reopen { id } => {
            let tasks = store::load(&store_path)?;
            require_task(&tasks, &id)?;
            let next = ops::update_task(
                &tasks,
                &id,
                &TaskUpdate {
                    completed: Some(false),
                    ..Default::default()
                },
            );
            store::save(&store_path, &next)?;
            eprintln!("Reopened '{id}'");
        }

        Command::Rm { id } => {
            let tasks = store::load(&store_path)?;
            require_task(&tasks, &id)?;
            let next = ops::delete_task(&tasks, &id);
            store::save(&store_path, &next)?;
            eprintln!("Removed task '{id}'");
        }

        Command::Show { id } => {
            let tasks = store::load(&store_path)?;
            require_task(&tasks, &id)?;
            print!("{}", output::format_task_detail(&tasks[&id], &tasks));
        }

        Command::List { tree, root, json } => {
            let tasks = store::load(&store_path)?;
            if let Some(ref r) = root {
                require_task(&tasks, r)?;
            }
            if json {
                let ids = output::tree_order(&tasks, root.as_deref());
                let ordered: Vec<&model::Task> =
                    ids.iter().filter_map(|id| tasks.get(id)).collect();
                println!("{}", serde_json::to_string_pretty(&ordered)?);
            } else if tree {
                print!("{}", output::format_task_tree(&tasks, root.as_deref()));
            } else {
                let ids = output::tree_order(&tasks, root.as_deref());
                print!("{}", output::format_task_list(&tasks, &ids));
            }
        }

        Command::Progress { id } => {
            let tasks = store::load(&store_path)?;
            let (done, total) = match id {
                Some(ref id) => {
                    require_task(&tasks, id)?;
                    (
                        progress::completed_minutes(id, &tasks),
                        tasks[id].estimated_minutes,
                    )
                }
                None => progress::overall(&tasks),
            };
            let ratio = if total > 0 {
                f64::from(done) / f64::from(total)
            } else {
                0.0
            };
            println!("{done} / {total} min ({})", output::percent(ratio));
        }

        Command::Check => {
            let tasks = store::load(&store_path)?;
            validate::check_links(&tasks)?;
            let over = validate::overcommitted(&tasks);
            for id in &over {
                let task = &tasks[id];
                eprintln!(
                    "warning: task '{id}' is overcommitted (children {}m > {}m)",
                    task.children_minutes(&tasks),
                    task.estimated_minutes
                );
            }
            if over.is_empty() {
                println!("ok ({} tasks)", tasks.len());
            } else {
                println!("ok with {} warning(s) ({} tasks)", over.len(), tasks.len());
            }
        }

        Command::Tree {
            root,
            poll_interval,
        } => {
            tui::run(&store_path, root.as_deref(), poll_interval)?;
        }

        Command::Wait => {
            let (_watcher, rx) = watch::watch_store(&store_path)?;
            // Block until a change event
            watch::wait_for_change(&rx, std::time::Duration::MAX);
        }
    }

    Ok(())
}
