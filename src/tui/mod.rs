mod app;
mod event;
mod tree;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self as ct_event, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;

use crate::store;
use crate::watch;
use app::App;
use event::KeyAction;

pub fn run(store_path: &str, root: Option<&str>, poll_interval: u64) -> Result<()> {
    let tasks = store::load(store_path)?;
    let mut app = App::new(tasks, root);

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, store_path, root, poll_interval);

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store_path: &str,
    root: Option<&str>,
    poll_interval: u64,
) -> Result<()> {
    let poll_duration = Duration::from_millis(poll_interval);

    // Set up file watcher so external edits show up without a keypress
    let (_watcher, rx) = watch::watch_store(store_path)?;

    loop {
        terminal.draw(|frame| tree::render(frame, app))?;

        if ct_event::poll(poll_duration)? {
            if let Event::Key(key) = ct_event::read()? {
                if key.kind == KeyEventKind::Press {
                    match event::handle_key(app, key) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::AddChild => app.add_child(store_path, root)?,
                        KeyAction::AddRoot => app.add_root(store_path, root)?,
                        KeyAction::ToggleDone => app.toggle_done(store_path, root)?,
                        KeyAction::Adjust(delta) => {
                            app.adjust_minutes(delta, store_path, root)?;
                        }
                        KeyAction::ConfirmDelete => app.delete_confirmed(store_path, root)?,
                        KeyAction::Refresh => app.reload(store_path, root)?,
                        KeyAction::Continue => {}
                    }
                }
            }
        }

        // Check for store changes (non-blocking)
        if watch::wait_for_change(&rx, Duration::ZERO) {
            watch::drain_events(&rx);
            app.reload(store_path, root)?;
        }
    }
}
