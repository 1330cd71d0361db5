use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tempo", about = "Time-budgeted task tree tracker")]
pub struct Cli {
    /// Path to the task store [default: ~/.tempo/tasks.json]
    #[arg(long, env = "TEMPO_FILE", global = true)]
    pub file: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a task: a 60-minute root, or a child of --parent
    Add {
        /// Parent task id; its budget is re-split across all its children
        #[arg(short, long)]
        parent: Option<String>,
        /// Title for the new task
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Edit a task's title or time budget
    Edit {
        /// Task id to edit
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New budget in minutes (clamped against children and parent)
        #[arg(short, long)]
        minutes: Option<u32>,
    },

    /// Mark a task complete
    Done {
        /// Task id
        id: String,
    },

    /// Mark a task incomplete again
    Reopen {
        /// Task id
        id: String,
    },

    /// Remove a task and its whole subtree
    Rm {
        /// Task id to remove
        id: String,
    },

    /// Show task details
    Show {
        /// Task id
        id: String,
    },

    /// List tasks
    List {
        /// Display as tree
        #[arg(long)]
        tree: bool,
        /// Root task for subtree
        #[arg(long)]
        root: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show completed vs estimated minutes
    Progress {
        /// Task id (omit for totals across all roots)
        id: Option<String>,
    },

    /// Check the store's structural invariants
    Check,

    /// Launch interactive TUI
    Tree {
        /// Root task for subtree
        #[arg(long)]
        root: Option<String>,
        /// Poll interval in milliseconds
        #[arg(long, default_value = "1000")]
        poll_interval: u64,
    },

    /// Block until the store file changes
    Wait,
}
