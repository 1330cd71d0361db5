use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Creates a watcher for the store file and returns a receiver for change
/// events. The watcher must be kept alive for events to be received.
///
/// We watch the parent directory (saves go through a temp file that is
/// renamed over the store), but filter events to those touching the store
/// file itself.
pub fn watch_store(store_path: &str) -> Result<(RecommendedWatcher, Receiver<()>)> {
    let (tx, rx) = mpsc::channel();

    let store_filename = Path::new(store_path)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            // Ignore access events (open/close/read) — these fire from any
            // process reading the store and can cause cascading wakes.
            if matches!(event.kind, EventKind::Access(_)) {
                return;
            }

            // Watching the parent directory means we see events for every
            // file in it; only react to the store file.
            let relevant = event.paths.iter().any(|p| {
                p.file_name()
                    .map(|f| f.to_string_lossy() == store_filename)
                    .unwrap_or(false)
            });
            if relevant {
                let _ = tx.send(());
            }
        }
    })
    .context("failed to create file watcher")?;

    let path = Path::new(store_path);
    let watch_path = path.parent().unwrap_or(path);
    watcher
        .watch(watch_path, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", watch_path.display()))?;

    Ok((watcher, rx))
}

/// Waits for a store change event with timeout.
/// Returns true if an event was received, false on timeout.
pub fn wait_for_change(rx: &Receiver<()>, timeout: Duration) -> bool {
    rx.recv_timeout(timeout).is_ok()
}

/// Drains any pending events from the receiver.
pub fn drain_events(rx: &Receiver<()>) {
    while rx.try_recv().is_ok() {}
}
